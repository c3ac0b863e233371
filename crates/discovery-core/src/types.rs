//! Domain types shared by the mixer, the catalog and the applications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

pub type ProductId = String;

/// A product as produced by a search provider or a discovery pool.
///
/// Products are never mutated once created; provenance and session
/// attribution travel next to the product, not inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_index: Option<usize>,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            price,
            image: String::new(),
            categories: Vec::new(),
            brand: None,
            url: None,
            source_index: None,
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self { description: Some(description.into()), ..self }
    }

    pub fn with_image(self, image: impl Into<String>) -> Self {
        Self { image: image.into(), ..self }
    }

    pub fn with_categories<I, S>(self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { categories: categories.into_iter().map(Into::into).collect(), ..self }
    }

    pub fn with_brand(self, brand: impl Into<String>) -> Self {
        Self { brand: Some(brand.into()), ..self }
    }

    pub fn with_url(self, url: impl Into<String>) -> Self {
        Self { url: Some(url.into()), ..self }
    }

    pub fn with_source_index(self, index: usize) -> Self {
        Self { source_index: Some(index), ..self }
    }
}

/// Share of a result list given over to discovery items.
///
/// Closed set: 0%, 5% or 10%. Persisted as the bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DiscoveryPercentage {
    Off,
    #[default]
    Five,
    Ten,
}

impl DiscoveryPercentage {
    pub const ALL: [Self; 3] = [Self::Off, Self::Five, Self::Ten];

    pub fn percent(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Five => 5,
            Self::Ten => 10,
        }
    }

    pub fn is_off(self) -> bool {
        self == Self::Off
    }

    /// `floor(total * pct / 100)`; never exceeds `total`.
    pub fn outlier_count(self, total: usize) -> usize {
        total * usize::from(self.percent()) / 100
    }
}

impl TryFrom<u8> for DiscoveryPercentage {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Off),
            5 => Ok(Self::Five),
            10 => Ok(Self::Ten),
            other => Err(Error::InvalidPercentage(other.to_string())),
        }
    }
}

impl From<DiscoveryPercentage> for u8 {
    fn from(pct: DiscoveryPercentage) -> Self {
        pct.percent()
    }
}

impl FromStr for DiscoveryPercentage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().trim_end_matches('%');
        let value: u8 = raw.parse().map_err(|_| Error::InvalidPercentage(s.to_string()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for DiscoveryPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayType {
    Personalized,
    Inspiration,
}

/// Why an inspiration item was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspirationReason {
    Trending,
    DifferentStyle,
    VisualAppeal,
}

impl InspirationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::DifferentStyle => "different_style",
            Self::VisualAppeal => "visual_appeal",
        }
    }

    /// Short badge text for result lists.
    pub fn label(self) -> &'static str {
        match self {
            Self::Trending => "Trending now",
            Self::DifferentStyle => "Try a different style",
            Self::VisualAppeal => "Eye-catching pick",
        }
    }
}

impl fmt::Display for InspirationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance tag of a mixed item. Decided once, when the item is built.
///
/// Serializes as `{"displayType": ..., "inspirationReason": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "displayType", rename_all = "snake_case")]
pub enum Provenance {
    Personalized,
    Inspiration {
        #[serde(rename = "inspirationReason")]
        reason: InspirationReason,
    },
}

impl Provenance {
    pub fn display_type(self) -> DisplayType {
        match self {
            Self::Personalized => DisplayType::Personalized,
            Self::Inspiration { .. } => DisplayType::Inspiration,
        }
    }

    pub fn inspiration_reason(self) -> Option<InspirationReason> {
        match self {
            Self::Personalized => None,
            Self::Inspiration { reason } => Some(reason),
        }
    }
}

/// A product together with the reason it appears in a result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWithContext {
    product: Product,
    #[serde(flatten)]
    provenance: Provenance,
}

impl ProductWithContext {
    pub fn personalized(product: Product) -> Self {
        Self { product, provenance: Provenance::Personalized }
    }

    pub fn inspiration(product: Product, reason: InspirationReason) -> Self {
        Self { product, provenance: Provenance::Inspiration { reason } }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn id(&self) -> &str {
        &self.product.id
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn display_type(&self) -> DisplayType {
        self.provenance.display_type()
    }

    pub fn inspiration_reason(&self) -> Option<InspirationReason> {
        self.provenance.inspiration_reason()
    }

    pub fn is_inspiration(&self) -> bool {
        matches!(self.provenance, Provenance::Inspiration { .. })
    }

    pub fn into_product(self) -> Product {
        self.product
    }
}

/// Item produced by an upstream search that already split discovery
/// results from personalized ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreflaggedProduct {
    #[serde(flatten)]
    pub product: Product,
    #[serde(rename = "isDiscovery", default)]
    pub is_discovery: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Text,
    Image,
    Mixed,
}

impl SearchType {
    pub fn infer(has_text: bool, has_image: bool) -> Self {
        match (has_text, has_image) {
            (true, true) => Self::Mixed,
            (false, true) => Self::Image,
            _ => Self::Text,
        }
    }
}

/// A user query: free text, image-derived keywords, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_keywords: Vec<String>,
}

impl SearchQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), image_keywords: Vec::new() }
    }

    pub fn image<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { text: None, image_keywords: keywords.into_iter().map(Into::into).collect() }
    }

    pub fn with_image_keywords<I, S>(self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { image_keywords: keywords.into_iter().map(Into::into).collect(), ..self }
    }

    fn trimmed_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn search_type(&self) -> SearchType {
        SearchType::infer(self.trimmed_text().is_some(), !self.image_keywords.is_empty())
    }

    /// Text handed to discovery pools and the classifier: the typed query,
    /// otherwise the image keywords joined by spaces.
    pub fn context(&self) -> Option<String> {
        match self.trimmed_text() {
            Some(text) => Some(text.to_string()),
            None if !self.image_keywords.is_empty() => Some(self.image_keywords.join(" ")),
            None => None,
        }
    }

    /// Every token the query carries, text and image keywords alike.
    pub fn tokens(&self) -> Vec<String> {
        self.text
            .iter()
            .flat_map(|t| t.split_whitespace())
            .chain(self.image_keywords.iter().flat_map(|k| k.split_whitespace()))
            .map(str::to_lowercase)
            .collect()
    }
}

/// Result of a search provider call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_keywords: Option<Vec<String>>,
}

impl SearchResponse {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products, image_keywords: None }
    }
}

/// One query/response unit. Identity and timestamp only; no behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSession {
    pub session_id: Uuid,
    pub search_query: String,
    pub search_type: SearchType,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_analysis_keywords: Option<Vec<String>>,
    pub result_count: usize,
}

impl SearchSession {
    pub fn with_image_keywords(self, keywords: Vec<String>) -> Self {
        let keywords = Some(keywords).filter(|k| !k.is_empty());
        Self { image_analysis_keywords: keywords, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    View,
    Click,
}

/// Telemetry channel. Only `Personalized` events may feed model training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSource {
    Personalized,
    Discovery,
}

impl From<Provenance> for InteractionSource {
    fn from(provenance: Provenance) -> Self {
        match provenance {
            Provenance::Personalized => Self::Personalized,
            Provenance::Inspiration { .. } => Self::Discovery,
        }
    }
}

/// A view or click on a displayed item.
///
/// The channel is derived from the item's provenance; callers cannot pick it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionEvent {
    product_id: ProductId,
    kind: InteractionKind,
    source: InteractionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<InspirationReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_id: Option<Uuid>,
    timestamp: DateTime<Utc>,
}

impl InteractionEvent {
    pub fn for_item(item: &ProductWithContext, kind: InteractionKind, session_id: Option<Uuid>) -> Self {
        Self {
            product_id: item.id().to_string(),
            kind,
            source: InteractionSource::from(item.provenance()),
            reason: item.inspiration_reason(),
            session_id,
            timestamp: Utc::now(),
        }
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn kind(&self) -> InteractionKind {
        self.kind
    }

    pub fn source(&self) -> InteractionSource {
        self.source
    }

    pub fn reason(&self) -> Option<InspirationReason> {
        self.reason
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Why a mix returned fewer discovery items than asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degradation {
    PoolUnavailable,
    PoolTimeout,
    InsufficientCandidates,
}

/// Counts per display type for one mixing call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixComposition {
    pub personalized: usize,
    pub inspiration: usize,
    pub requested_outliers: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degradation: Option<Degradation>,
}

impl MixComposition {
    pub fn total(&self) -> usize {
        self.personalized + self.inspiration
    }
}

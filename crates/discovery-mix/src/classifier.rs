//! Reasons attached to inspiration items.

use std::collections::HashSet;

use discovery_core::types::{InspirationReason, Product};

/// Items priced above this are shown for their looks.
pub const VISUAL_APPEAL_PRICE: f64 = 500.0;

/// Stateless handle over [`classify`], for injection next to the mixer.
#[derive(Debug, Clone, Copy, Default)]
pub struct InspirationClassifier;

impl InspirationClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, product: &Product, query: Option<&str>) -> InspirationReason {
        classify(product, query)
    }
}

/// First matching rule wins:
/// 1. price above [`VISUAL_APPEAL_PRICE`] → `VisualAppeal`
/// 2. a query with at least one token shares no token with the name → `DifferentStyle`
/// 3. otherwise → `Trending`
pub fn classify(product: &Product, query: Option<&str>) -> InspirationReason {
    if product.price > VISUAL_APPEAL_PRICE {
        return InspirationReason::VisualAppeal;
    }
    if let Some(query_tokens) = query.map(tokens).filter(|t| !t.is_empty()) {
        if tokens(&product.name).is_disjoint(&query_tokens) {
            return InspirationReason::DifferentStyle;
        }
    }
    InspirationReason::Trending
}

fn tokens(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

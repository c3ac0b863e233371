use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use discovery_core::traits::SearchProvider;
use discovery_core::types::{Product, SearchQuery, SearchResponse};

/// Keyword search over an in-memory catalog.
///
/// Each query word scores 2 when the product name contains it as a whole word
/// and 1 when only description, brand or categories do. Products with no
/// matching token are left out.
pub struct CatalogSearch {
    products: Arc<Vec<Product>>,
    limit: usize,
}

impl CatalogSearch {
    pub fn new(products: Arc<Vec<Product>>, limit: usize) -> Self {
        Self { products, limit }
    }

    /// Best matches first, ties in catalog order; `source_index` is the rank.
    pub fn rank(&self, query: &SearchQuery) -> Vec<Product> {
        let tokens: Vec<String> = query.tokens().iter().flat_map(|t| terms(t)).collect();
        if tokens.is_empty() {
            return vec![];
        }
        let mut scored: Vec<(usize, &Product)> = self
            .products
            .iter()
            .map(|p| (score(p, &tokens), p))
            .filter(|(s, _)| *s > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(self.limit)
            .enumerate()
            .map(|(rank, (_, p))| p.clone().with_source_index(rank))
            .collect()
    }
}

fn score(product: &Product, tokens: &[String]) -> usize {
    let name = terms(&product.name);
    let mut rest = terms(product.description.as_deref().unwrap_or_default());
    rest.extend(product.brand.iter().flat_map(|b| terms(b)));
    rest.extend(product.categories.iter().flat_map(|c| terms(c)));
    tokens
        .iter()
        .map(|t| if name.contains(t) { 2 } else if rest.contains(t) { 1 } else { 0 })
        .sum()
}

/// Lowercase alphanumeric words; `home/lighting` yields `home` and `lighting`.
fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).map(str::to_lowercase).collect()
}

#[async_trait]
impl SearchProvider for CatalogSearch {
    async fn search(&self, query: &SearchQuery) -> anyhow::Result<SearchResponse> {
        let image_keywords = Some(query.image_keywords.clone()).filter(|k| !k.is_empty());
        Ok(SearchResponse { products: self.rank(query), image_keywords })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Arc<Vec<Product>> {
        Arc::new(vec![
            Product::new("1", "Oak Desk Lamp", 40.0).with_categories(["lighting"]),
            Product::new("2", "Red Running Shoes", 90.0).with_description("light and red"),
            Product::new("3", "Linen Shirt", 30.0).with_brand("Lamplight"),
            Product::new("4", "Red Lamp", 25.0),
        ])
    }

    #[test]
    fn name_matches_outrank_other_fields() {
        let search = CatalogSearch::new(catalog(), 10);
        let ids: Vec<String> = search.rank(&SearchQuery::text("red lamp")).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["4", "1", "2"], "Lamplight is not a lamp");
    }

    #[test]
    fn matches_whole_words_only() {
        let products = Arc::new(vec![
            Product::new("1", "Bored Panda Mug", 12.0),
            Product::new("2", "Red Mug", 12.0).with_categories(["home/kitchen"]),
        ]);
        let search = CatalogSearch::new(products, 10);
        let ids: Vec<String> = search.rank(&SearchQuery::text("red")).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["2"]);
        let ids: Vec<String> = search.rank(&SearchQuery::text("Kitchen,")).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn ranks_are_recorded_and_limited() {
        let search = CatalogSearch::new(catalog(), 2);
        let ranked = search.rank(&SearchQuery::text("lamp"));
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].source_index, Some(0));
        assert_eq!(ranked[1].source_index, Some(1));
    }

    #[test]
    fn blank_query_finds_nothing() {
        let search = CatalogSearch::new(catalog(), 10);
        assert!(search.rank(&SearchQuery::text("  ")).is_empty());
    }
}

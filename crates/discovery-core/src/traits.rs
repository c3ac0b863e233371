use async_trait::async_trait;
use std::collections::HashSet;

use crate::types::{InteractionEvent, MixComposition, Product, ProductId, SearchQuery, SearchResponse};

/// Ranked, personalized search. Failures here are the only ones users see.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> anyhow::Result<SearchResponse>;
}

/// Source of non-personalized inspiration candidates.
///
/// Best effort: returning fewer than `count` products, or an error, is an
/// ordinary outcome callers must tolerate.
#[async_trait]
pub trait DiscoveryPool: Send + Sync {
    async fn fetch(
        &self,
        count: usize,
        exclude_ids: &HashSet<ProductId>,
        context_query: Option<&str>,
    ) -> anyhow::Result<Vec<Product>>;
}

/// Fire-and-forget telemetry sink. Implementations must not block for long
/// and must swallow their own failures.
pub trait InteractionTracker: Send + Sync {
    fn record(&self, event: InteractionEvent);

    fn record_composition(&self, _composition: &MixComposition) {}
}

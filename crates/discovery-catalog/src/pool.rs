use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use discovery_core::traits::DiscoveryPool;
use discovery_core::types::{Product, ProductId};

/// Random sample of catalog products outside the exclusion set.
pub struct CatalogPool {
    products: Arc<Vec<Product>>,
    seed: Option<u64>,
    fetches: AtomicU64,
}

impl CatalogPool {
    pub fn new(products: Arc<Vec<Product>>) -> Self {
        Self { products, seed: None, fetches: AtomicU64::new(0) }
    }

    /// Reproducible sampling: fetch `n` draws from `seed + n`.
    pub fn with_seed(self, seed: u64) -> Self {
        Self { seed: Some(seed), ..self }
    }
}

#[async_trait]
impl DiscoveryPool for CatalogPool {
    async fn fetch(
        &self,
        count: usize,
        exclude_ids: &HashSet<ProductId>,
        context_query: Option<&str>,
    ) -> anyhow::Result<Vec<Product>> {
        let fetch_no = self.fetches.fetch_add(1, Ordering::Relaxed);
        let candidates: Vec<&Product> = self.products.iter().filter(|p| !exclude_ids.contains(&p.id)).collect();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(fetch_no)),
            None => StdRng::from_entropy(),
        };
        let picked: Vec<Product> = candidates.choose_multiple(&mut rng, count).map(|p| (*p).clone()).collect();
        debug!(count, available = candidates.len(), returned = picked.len(), context = ?context_query, "discovery pool fetch");
        Ok(picked)
    }
}

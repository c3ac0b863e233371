//! Blends non-personalized inspiration items into a personalized result list.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use discovery_core::config::DiscoverySettings;
use discovery_core::error::{Error, Result};
use discovery_core::traits::{DiscoveryPool, InteractionTracker};
use discovery_core::types::{
    DiscoveryPercentage, MixComposition, PreflaggedProduct, Product, ProductId, ProductWithContext,
};
use futures::FutureExt;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::classifier::InspirationClassifier;
use crate::interleave::interleave;
use crate::tracking::dispatch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixerOptions {
    /// Upper bound on a discovery pool fetch.
    pub pool_timeout: Duration,
    /// Candidates requested per outlier slot.
    pub overfetch_factor: usize,
    /// Fixed shuffle seed; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for MixerOptions {
    fn default() -> Self {
        Self { pool_timeout: Duration::from_secs(3), overfetch_factor: 2, seed: None }
    }
}

impl From<&DiscoverySettings> for MixerOptions {
    fn from(settings: &DiscoverySettings) -> Self {
        Self {
            pool_timeout: settings.pool_timeout(),
            overfetch_factor: settings.overfetch_factor.max(1),
            seed: settings.seed,
        }
    }
}

/// Items of one mix plus what went into them.
#[derive(Debug, Clone, PartialEq)]
pub struct MixOutcome {
    pub items: Vec<ProductWithContext>,
    pub composition: MixComposition,
}

pub struct DiscoveryMixer<P>
where
    P: DiscoveryPool,
{
    pool: P,
    classifier: InspirationClassifier,
    tracker: Option<Arc<dyn InteractionTracker>>,
    options: MixerOptions,
}

impl<P> DiscoveryMixer<P>
where
    P: DiscoveryPool,
{
    pub fn new(pool: P) -> Self {
        Self { pool, classifier: InspirationClassifier::new(), tracker: None, options: MixerOptions::default() }
    }

    pub fn with_options(self, options: MixerOptions) -> Self {
        Self { options, ..self }
    }

    /// Receives the composition of every mix that asked the pool for items.
    pub fn with_tracker(self, tracker: Arc<dyn InteractionTracker>) -> Self {
        Self { tracker: Some(tracker), ..self }
    }

    pub fn options(&self) -> &MixerOptions {
        &self.options
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Mix with a shuffle seeded from the options, or from entropy.
    pub async fn mix(
        &self,
        personalized: Vec<Product>,
        pct: DiscoveryPercentage,
        query: Option<&str>,
    ) -> Vec<ProductWithContext> {
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.mix_with_rng(personalized, pct, query, &mut rng).await
    }

    pub async fn mix_with_rng<R>(
        &self,
        personalized: Vec<Product>,
        pct: DiscoveryPercentage,
        query: Option<&str>,
        rng: &mut R,
    ) -> Vec<ProductWithContext>
    where
        R: Rng + Send,
    {
        self.mix_outcome(personalized, pct, query, rng).await.items
    }

    /// Never fails: pool errors, timeouts and short answers only reduce the
    /// number of inspiration items, down to none.
    pub async fn mix_outcome<R>(
        &self,
        personalized: Vec<Product>,
        pct: DiscoveryPercentage,
        query: Option<&str>,
        rng: &mut R,
    ) -> MixOutcome
    where
        R: Rng + Send,
    {
        let total = personalized.len();
        let outlier_count = pct.outlier_count(total);
        if outlier_count == 0 {
            let items = personalized.into_iter().map(ProductWithContext::personalized).collect();
            let composition = MixComposition { personalized: total, ..MixComposition::default() };
            return MixOutcome { items, composition };
        }

        let exclude: HashSet<ProductId> = personalized.iter().map(|p| p.id.clone()).collect();
        let requested = outlier_count * self.options.overfetch_factor.max(1);
        let (outliers, degradation) = match self.fetch_candidates(requested, &exclude, query).await {
            Ok(candidates) => {
                let mut usable = usable_candidates(candidates, &exclude);
                usable.shuffle(rng);
                usable.truncate(outlier_count);
                let degradation = if usable.len() < outlier_count {
                    let err = Error::InsufficientCandidates { requested: outlier_count, received: usable.len() };
                    debug!(error = %err, "discovery pool under-delivered");
                    err.degradation()
                } else {
                    None
                };
                (usable, degradation)
            }
            Err(err) => {
                warn!(error = %err, "discovery pool failed, returning personalized results only");
                (Vec::new(), err.degradation())
            }
        };

        // Slots the pool could not fill go back to personalized items.
        let mut main = personalized;
        main.truncate(total - outliers.len());

        let composition = MixComposition {
            personalized: main.len(),
            inspiration: outliers.len(),
            requested_outliers: outlier_count,
            degradation,
        };
        debug!(
            total,
            outlier_count,
            inspiration = composition.inspiration,
            pct = pct.percent(),
            "mixed discovery items"
        );

        let main: Vec<ProductWithContext> = main.into_iter().map(ProductWithContext::personalized).collect();
        let outliers: Vec<ProductWithContext> = outliers
            .into_iter()
            .map(|product| {
                let reason = self.classifier.classify(&product, query);
                ProductWithContext::inspiration(product, reason)
            })
            .collect();
        let items = interleave(main, outliers);

        self.notify(&composition);
        MixOutcome { items, composition }
    }

    /// Tag results whose upstream search already split off discovery items.
    pub fn mix_preflagged(&self, items: Vec<PreflaggedProduct>, query: Option<&str>) -> Vec<ProductWithContext> {
        tag_preflagged(&self.classifier, items, query)
    }

    /// Bounded by `pool_timeout` when a tokio runtime is present; without
    /// one the fetch runs to completion. A panicking pool counts as
    /// unavailable.
    async fn fetch_candidates(
        &self,
        count: usize,
        exclude: &HashSet<ProductId>,
        query: Option<&str>,
    ) -> Result<Vec<Product>> {
        let timeout = self.options.pool_timeout;
        let fetch = AssertUnwindSafe(self.pool.fetch(count, exclude, query)).catch_unwind();
        let outcome = if Handle::try_current().is_ok() {
            tokio::time::timeout(timeout, fetch).await.map_err(|_| Error::PoolTimeout(timeout))?
        } else {
            debug!("no tokio runtime, discovery fetch runs without a deadline");
            fetch.await
        };
        match outcome {
            Ok(Ok(products)) => Ok(products),
            Ok(Err(e)) => Err(Error::PoolUnavailable(format!("{e:#}"))),
            Err(_) => Err(Error::PoolUnavailable("discovery pool panicked".to_string())),
        }
    }

    fn notify(&self, composition: &MixComposition) {
        if let Some(tracker) = &self.tracker {
            let composition = composition.clone();
            let _ = dispatch(Arc::clone(tracker), move |t| t.record_composition(&composition));
        }
    }
}

/// Drop candidates that collide with the personalized set or with each other.
fn usable_candidates(candidates: Vec<Product>, exclude: &HashSet<ProductId>) -> Vec<Product> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|p| !exclude.contains(&p.id) && seen.insert(p.id.clone()))
        .collect()
}

/// Keeps order; later duplicates of an id are dropped.
pub fn tag_preflagged(
    classifier: &InspirationClassifier,
    items: Vec<PreflaggedProduct>,
    query: Option<&str>,
) -> Vec<ProductWithContext> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.product.id.clone()))
        .map(|item| {
            if item.is_discovery {
                let reason = classifier.classify(&item.product, query);
                ProductWithContext::inspiration(item.product, reason)
            } else {
                ProductWithContext::personalized(item.product)
            }
        })
        .collect()
}

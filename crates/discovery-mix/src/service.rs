use std::time::Instant;

use discovery_core::error::{Error, Result};
use discovery_core::traits::{DiscoveryPool, SearchProvider};
use discovery_core::types::{DiscoveryPercentage, SearchQuery};
use tracing::info;

use crate::mixer::DiscoveryMixer;
use crate::session::{SessionTracker, StampedResults};

/// Composition root: search, then mix, then stamp the session.
///
/// Collaborators are handed in by the caller, which owns their lifecycle.
pub struct DiscoveryService<S, P>
where
    S: SearchProvider,
    P: DiscoveryPool,
{
    search: S,
    mixer: DiscoveryMixer<P>,
    sessions: SessionTracker,
}

impl<S, P> DiscoveryService<S, P>
where
    S: SearchProvider,
    P: DiscoveryPool,
{
    pub fn new(search: S, mixer: DiscoveryMixer<P>) -> Self {
        Self { search, mixer, sessions: SessionTracker::new() }
    }

    pub fn mixer(&self) -> &DiscoveryMixer<P> {
        &self.mixer
    }

    /// Only a search provider failure is returned as an error; mixing
    /// problems reduce the number of discovery items instead.
    pub async fn search(&self, query: &SearchQuery, pct: DiscoveryPercentage) -> Result<StampedResults> {
        let started = Instant::now();
        let response = self
            .search
            .search(query)
            .await
            .map_err(|e| Error::Search(format!("{e:#}")))?;

        let mut session = self.sessions.session_for(query);
        if let Some(keywords) = response.image_keywords {
            session = session.with_image_keywords(keywords);
        }

        let context = query.context();
        let found = response.products.len();
        let mixed = self.mixer.mix(response.products, pct, context.as_deref()).await;
        let stamped = self.sessions.stamp(session, mixed);

        info!(
            session_id = %stamped.session().session_id,
            search_type = ?stamped.session().search_type,
            found,
            shown = stamped.len(),
            discovery = stamped.items().iter().filter(|s| s.item().is_inspiration()).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search complete"
        );
        Ok(stamped)
    }
}

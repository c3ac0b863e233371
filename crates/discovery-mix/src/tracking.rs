//! Interaction reporting. The event channel comes from the item's provenance,
//! so discovery interactions never reach personalization training data.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use discovery_core::traits::InteractionTracker;
use discovery_core::types::{InteractionEvent, InteractionKind, InteractionSource, ProductWithContext};
use futures::future::join_all;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::session::StampedItem;

/// Core-side adapter in front of an external [`InteractionTracker`].
#[derive(Clone)]
pub struct InteractionRecorder {
    tracker: Arc<dyn InteractionTracker>,
}

impl InteractionRecorder {
    pub fn new(tracker: Arc<dyn InteractionTracker>) -> Self {
        Self { tracker }
    }

    pub fn record(&self, item: &StampedItem, kind: InteractionKind) {
        self.record_item(item.item(), kind, Some(item.session().session_id));
    }

    pub fn record_item(&self, item: &ProductWithContext, kind: InteractionKind, session_id: Option<Uuid>) {
        self.send(item, kind, session_id);
    }

    /// Record every item, then wait until the tracker has seen them. For
    /// callers about to shut their runtime down.
    pub async fn record_all(&self, items: &[StampedItem], kind: InteractionKind) {
        let handles: Vec<JoinHandle<()>> = items
            .iter()
            .filter_map(|s| self.send(s.item(), kind, Some(s.session().session_id)))
            .collect();
        let failed = join_all(handles).await.into_iter().filter(Result::is_err).count();
        if failed > 0 {
            warn!(failed, "interaction tracker tasks failed");
        }
    }

    fn send(&self, item: &ProductWithContext, kind: InteractionKind, session_id: Option<Uuid>) -> Option<JoinHandle<()>> {
        let event = InteractionEvent::for_item(item, kind, session_id);
        debug!(
            product_id = event.product_id(),
            kind = ?event.kind(),
            discovery = event.source() == InteractionSource::Discovery,
            "recording interaction"
        );
        dispatch(Arc::clone(&self.tracker), move |tracker| tracker.record(event))
    }
}

/// Tracker that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracker;

impl InteractionTracker for NoopTracker {
    fn record(&self, _event: InteractionEvent) {}
}

/// Run `f` against the tracker without making the caller wait: on the
/// runtime's blocking pool when there is a tokio runtime, since trackers are
/// synchronous and may do file I/O, inline otherwise. A panicking tracker
/// never reaches the caller.
pub(crate) fn dispatch<F>(tracker: Arc<dyn InteractionTracker>, f: F) -> Option<JoinHandle<()>>
where
    F: FnOnce(&dyn InteractionTracker) + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => Some(handle.spawn_blocking(move || f(tracker.as_ref()))),
        Err(_) => {
            if panic::catch_unwind(AssertUnwindSafe(|| f(tracker.as_ref()))).is_err() {
                warn!("interaction tracker panicked");
            }
            None
        }
    }
}

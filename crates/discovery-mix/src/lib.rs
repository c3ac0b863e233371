//! discovery-mix
//!
//! Blends inspiration items into personalized search results, tags every item
//! with its provenance and keeps discovery interactions on their own channel.
//! See `mixer` for the pipeline and `service` for the composition root.

pub mod classifier;
pub mod interleave;
pub mod mixer;
pub mod service;
pub mod session;
pub mod tracking;

pub use classifier::{classify, InspirationClassifier};
pub use mixer::{DiscoveryMixer, MixOutcome, MixerOptions};
pub use service::DiscoveryService;
pub use session::{SessionTracker, StampedItem, StampedResults};
pub use tracking::{InteractionRecorder, NoopTracker};

//! discovery-catalog
//!
//! File-backed collaborators for the mixer: product catalog loading, keyword
//! search, a random discovery pool and a JSON-lines interaction log.

pub mod interaction_log;
pub mod loader;
pub mod pool;
pub mod sample;
pub mod search;

pub use interaction_log::{read_log, InteractionLog};
pub use loader::{load_products, write_products};
pub use pool::CatalogPool;
pub use search::CatalogSearch;

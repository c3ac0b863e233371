use std::time::Duration;
use thiserror::Error;

use crate::types::Degradation;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid discovery percentage '{0}': expected 0, 5 or 10")]
    InvalidPercentage(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Discovery pool unavailable: {0}")]
    PoolUnavailable(String),

    #[error("Discovery pool did not answer within {0:?}")]
    PoolTimeout(Duration),

    #[error("Discovery pool returned {received} usable candidates, {requested} needed")]
    InsufficientCandidates { requested: usize, received: usize },
}

impl Error {
    /// Mixer-level degradation this error maps to, if it is a pool failure.
    pub fn degradation(&self) -> Option<Degradation> {
        match self {
            Self::PoolUnavailable(_) => Some(Degradation::PoolUnavailable),
            Self::PoolTimeout(_) => Some(Degradation::PoolTimeout),
            Self::InsufficientCandidates { .. } => Some(Degradation::InsufficientCandidates),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the recommendation engine

use thiserror::Error;

/// Errors raised while producing a recommendation
#[derive(Debug, Error)]
pub enum HpoError {
    /// The engine was built with a trial count of zero, so no best
    /// configuration can ever be selected.
    #[error("no trials configured")]
    NoTrials,
}

impl HpoError {
    /// Stable machine-readable code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            HpoError::NoTrials => "no_trials",
        }
    }
}

pub type Result<T> = std::result::Result<T, HpoError>;

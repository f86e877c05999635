//! Error types for the crate

use thiserror::Error;

use crate::job::JobId;

/// Main error type for the crate
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The maze or job configuration cannot be turned into a working model
    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("unknown algorithm '{0}' (expected one of: q_learning, monte_carlo, sarsa)")]
    UnknownAlgorithm(String),

    #[error("job {0} not found")]
    JobNotFound(JobId),

    #[error("invalid decay schedule: {message}")]
    InvalidSchedule { message: String },

    /// A training worker panicked; the panic was contained at the job boundary
    #[error("training worker panicked: {message}")]
    WorkerPanicked { message: String },
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Tabular control agents
pub mod algo;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Data structures
pub mod ds;

/// Environment
pub mod env;

/// Single-episode bookkeeping
pub mod episode;

/// Error types
pub mod error;

/// Exploration policies
pub mod exploration;

/// Background training jobs
pub mod job;

/// Grid maze model
pub mod maze;

/// Training histories and summaries
pub mod metrics;

/// Terminal dashboard
#[cfg(feature = "viz")]
pub mod viz;

mod util;

pub use error::{Error, Result};

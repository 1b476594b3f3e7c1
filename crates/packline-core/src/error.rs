//! Error types for the simulation.
//!
//! Expected rejections (no space, blocked removal, collisions) are not errors;
//! they come back as `Option`/hand-back values from the operations themselves.

use thiserror::Error;

/// Simulation-wide error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Rejected configuration supplied at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal invariant no longer holds
    #[error("Internal consistency violation: {0}")]
    Inconsistent(String),

    /// Lane index does not exist in the conveyor
    #[error("Unknown lane: {0}")]
    UnknownLane(usize),

    /// Container index does not exist
    #[error("Unknown container: {0}")]
    UnknownContainer(usize),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

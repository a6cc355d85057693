//! Error types for belief table operations.

use thiserror::Error;

use crate::engine::flock::Argument;

/// Errors that can occur while building, updating or querying belief tables.
///
/// All of them are contract violations raised at the point of failure; none
/// is transient. Validation always happens before any table is written, so a
/// rejected call leaves its target untouched.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BeliefError {
    /// Variable count exceeds the model addressing ceiling.
    #[error("overflow: {variables} variables exceed the limit of {limit}")]
    Overflow { variables: usize, limit: usize },

    /// Operation applied to an argument or table it does not accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Argument not conditioned by any flock of the distribution.
    #[error("argument {0} not found")]
    NotFound(Argument),

    /// Flock index outside the distribution.
    #[error("flock {0} not found")]
    UnknownFlock(usize),

    /// Dependency discovery ran into a cycle.
    #[error("dependency cycle detected through argument {0}")]
    CycleDetected(Argument),

    /// Rejected configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

//! # Credence Core
//!
//! Factored probabilistic model over binary arguments. A [`Distribution`]
//! owns a set of disjoint [`Flock`]s, each a dense joint table over the
//! arguments it conditions plus the arguments it depends on. Evidence is
//! injected with `refine`; beliefs are read back with `query`, combining
//! flocks along dependency chains when needed.

pub mod engine;

// Re-export commonly used types
pub use engine::config::DistributionConfig;
pub use engine::distribution::Distribution;
pub use engine::errors::BeliefError;
pub use engine::flock::{Argument, Flock};
pub use engine::model::{Model, MAX_VARIABLES, MODEL_WIDTH};
pub use engine::parallel::ExecutionPolicy;

//! Per-distribution configuration.

use crate::engine::errors::BeliefError;
use crate::engine::parallel::{ExecutionPolicy, DEFAULT_MIN_PARALLEL_MODELS};

/// Configuration carried by a [`Distribution`](crate::Distribution).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistributionConfig {
    /// Run refine/marginalize/combine loops on the worker pool.
    pub parallel: bool,
    /// Smallest table, in models, worth dispatching to the pool.
    pub min_parallel_models: usize,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            min_parallel_models: DEFAULT_MIN_PARALLEL_MODELS,
        }
    }
}

impl DistributionConfig {
    /// Default configuration with parallel execution switched on.
    pub fn parallel() -> Self {
        Self {
            parallel: true,
            ..Self::default()
        }
    }

    pub(crate) fn validate(self) -> Result<Self, BeliefError> {
        if self.min_parallel_models == 0 {
            return Err(BeliefError::InvalidConfig(
                "min_parallel_models must be > 0".into(),
            ));
        }
        Ok(self)
    }

    /// Execution policy handed to the table algebra.
    pub fn policy(&self) -> ExecutionPolicy {
        if self.parallel {
            ExecutionPolicy::Parallel {
                min_models: self.min_parallel_models,
            }
        } else {
            ExecutionPolicy::Sequential
        }
    }
}

//! Range-partitioned execution of per-model kernels.
//!
//! Every O(2^size) loop in the table algebra is expressed as "compute cell
//! `k` of the output from model `k`". This module runs such kernels either
//! sequentially or split into contiguous model-index ranges on the rayon
//! worker pool. The caller blocks until every range is filled.
//!
//! ## Determinism
//!
//! Each cell is computed by the same closure in both paths, so parallel and
//! sequential results are bit-identical.
//!
//! ## Feature gating
//!
//! The worker pool is behind the `parallel` feature flag. When disabled,
//! [`ExecutionPolicy::Parallel`] is accepted but kernels run sequentially.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::engine::model::Model;

/// Default minimum table length before kernels are dispatched to the pool.
pub const DEFAULT_MIN_PARALLEL_MODELS: usize = 1 << 14;

/// Models per partition handed to a worker.
#[cfg(feature = "parallel")]
const MODEL_CHUNK: usize = 1 << 12;

/// How the per-model loops of an operation are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    /// Always run on the calling thread.
    #[default]
    Sequential,
    /// Partition across the worker pool once a table reaches `min_models` cells.
    Parallel { min_models: usize },
}

impl ExecutionPolicy {
    /// Whether a kernel over `models` cells is dispatched to the worker pool.
    pub fn dispatches(self, models: usize) -> bool {
        match self {
            ExecutionPolicy::Sequential => false,
            ExecutionPolicy::Parallel { min_models } => {
                cfg!(feature = "parallel") && models >= min_models
            }
        }
    }
}

/// Fills `out[k] = cell(Model::from_index(k))` for every `k`.
pub(crate) fn fill_models<F>(policy: ExecutionPolicy, out: &mut [f64], cell: F)
where
    F: Fn(Model) -> f64 + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if policy.dispatches(out.len()) {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                "Dispatching kernel over {} models in chunks of {}",
                out.len(),
                MODEL_CHUNK
            );
            out.par_chunks_mut(MODEL_CHUNK)
                .enumerate()
                .for_each(|(chunk, cells)| {
                    let start = chunk * MODEL_CHUNK;
                    for (offset, value) in cells.iter_mut().enumerate() {
                        *value = cell(Model::from_index(start + offset));
                    }
                });
            return;
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = policy;

    for (index, value) in out.iter_mut().enumerate() {
        *value = cell(Model::from_index(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kernel(model: Model) -> f64 {
        let index = model.index() as f64;
        (index * 0.37).sin() * 1e-3 + index
    }

    #[test]
    fn sequential_policy_never_dispatches() {
        assert!(!ExecutionPolicy::Sequential.dispatches(usize::MAX));
        assert!(!ExecutionPolicy::default().dispatches(1 << 20));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_policy_respects_threshold() {
        let policy = ExecutionPolicy::Parallel { min_models: 64 };
        assert!(!policy.dispatches(63));
        assert!(policy.dispatches(64));
    }

    #[test]
    fn parallel_fill_matches_sequential_fill() {
        let len = (1 << 14) + 17;
        let mut sequential = vec![0.0; len];
        let mut parallel = vec![0.0; len];

        fill_models(ExecutionPolicy::Sequential, &mut sequential, kernel);
        fill_models(
            ExecutionPolicy::Parallel { min_models: 1 },
            &mut parallel,
            kernel,
        );

        assert_eq!(sequential, parallel);
        assert_eq!(sequential[5], kernel(Model::from_index(5)));
    }
}

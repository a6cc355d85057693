//! # Distributions
//!
//! A distribution owns a set of flocks that partition the conditioned
//! arguments: every argument is defined by at most one flock. Flocks may
//! depend on arguments defined elsewhere, so answering a query can require
//! joining several flocks along a dependency chain.
//!
//! ## Query resolution
//!
//! 1. Cached beliefs are returned directly.
//! 2. Otherwise the dependency closure of the request is discovered
//!    ([`dependency::discover`]), the needed flocks are combined pairwise in
//!    ascending index order, and the joint is projected onto the request.
//! 3. Before each pairwise step, if the two operands together exceed
//!    [`MAX_VARIABLES`], both are first marginalized down to the requested
//!    arguments plus the dependency arguments.
//!
//! ## Cache
//!
//! Refining an argument invalidates that argument only; replacing a flock's
//! table invalidates every argument the flock conditions. Dependents in other
//! flocks are not invalidated, and computed beliefs are not written back.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::engine::cache::BeliefCache;
use crate::engine::config::DistributionConfig;
use crate::engine::dependency;
use crate::engine::errors::BeliefError;
use crate::engine::flock::{Argument, Flock};
use crate::engine::model::MAX_VARIABLES;

/// Registry of disjoint flocks forming one joint model.
#[derive(Debug, Clone)]
pub struct Distribution {
    flocks: Vec<Flock>,
    owners: FxHashMap<Argument, usize>,
    cache: BeliefCache,
    config: DistributionConfig,
}

impl Distribution {
    /// Builds a sequential distribution over `flocks`.
    pub fn new(flocks: Vec<Flock>) -> Result<Self, BeliefError> {
        Self::with_config(flocks, DistributionConfig::default())
    }

    /// Builds a distribution over `flocks` with an explicit configuration.
    ///
    /// Fails with [`BeliefError::InvalidArgument`] when two flocks condition
    /// the same argument.
    pub fn with_config(
        flocks: Vec<Flock>,
        config: DistributionConfig,
    ) -> Result<Self, BeliefError> {
        let config = config.validate()?;

        let mut owners = FxHashMap::default();
        let mut cache = BeliefCache::default();
        for (index, flock) in flocks.iter().enumerate() {
            for &arg in flock.conditioned() {
                if let Some(previous) = owners.insert(arg, index) {
                    return Err(BeliefError::InvalidArgument(format!(
                        "argument {} is conditioned by flocks {} and {}",
                        arg, previous, index
                    )));
                }
                cache.seed(arg);
            }
        }

        Ok(Self {
            flocks,
            owners,
            cache,
            config,
        })
    }

    pub fn config(&self) -> DistributionConfig {
        self.config
    }

    /// Enables or disables parallel execution of the table algebra.
    pub fn set_parallel(&mut self, enabled: bool) {
        self.config.parallel = enabled;
    }

    pub fn flocks(&self) -> &[Flock] {
        &self.flocks
    }

    pub fn flock(&self, index: usize) -> Result<&Flock, BeliefError> {
        self.flocks
            .get(index)
            .ok_or(BeliefError::UnknownFlock(index))
    }

    /// Index of the flock conditioning `argument`.
    pub fn owner(&self, argument: Argument) -> Result<usize, BeliefError> {
        self.owners
            .get(&argument)
            .copied()
            .ok_or(BeliefError::NotFound(argument))
    }

    /// Whether `argument` currently has a valid cached belief.
    pub fn is_cached(&self, argument: Argument) -> bool {
        self.cache.is_valid(argument)
    }

    /// Refines `argument` in its owning flock and invalidates its belief.
    pub fn refine(
        &mut self,
        argument: Argument,
        positive: bool,
        coefficient: f64,
    ) -> Result<(), BeliefError> {
        let owner = self.owner(argument)?;
        let policy = self.config.policy();
        self.flocks[owner].refine_with(policy, argument, positive, coefficient)?;
        self.cache.invalidate(argument);
        Ok(())
    }

    /// Replaces a flock's table and invalidates every argument it conditions.
    pub fn set_probabilities(
        &mut self,
        flock_index: usize,
        table: Vec<f64>,
    ) -> Result<(), BeliefError> {
        let flock = self
            .flocks
            .get_mut(flock_index)
            .ok_or(BeliefError::UnknownFlock(flock_index))?;
        flock.set_probabilities(table)?;
        self.cache
            .invalidate_all(flock.conditioned().iter().copied());
        Ok(())
    }

    /// Standalone projection of one flock onto `keep`.
    pub fn marginalize(&self, flock_index: usize, keep: &[Argument]) -> Result<Flock, BeliefError> {
        let policy = self.config.policy();
        Ok(self.flock(flock_index)?.marginalize_with(policy, keep))
    }

    /// Marginal belief that each requested argument is true.
    ///
    /// Valid cached beliefs are returned as is. All stale arguments share one
    /// joint computed by [`find_and_combine`](Self::find_and_combine) over the
    /// whole request.
    pub fn query(&self, arguments: &[Argument]) -> Result<HashMap<Argument, f64>, BeliefError> {
        let mut beliefs = HashMap::with_capacity(arguments.len());
        let mut stale = Vec::new();
        for &arg in arguments {
            self.owner(arg)?;
            match self.cache.get(arg) {
                Some(belief) => {
                    beliefs.insert(arg, belief);
                }
                None => stale.push(arg),
            }
        }
        if stale.is_empty() {
            return Ok(beliefs);
        }

        let policy = self.config.policy();
        let joint = self.find_and_combine(arguments)?;
        for arg in stale {
            let marginal = joint.marginalize_with(policy, &[arg]);
            let belief = marginal
                .table()
                .get(1)
                .copied()
                .ok_or(BeliefError::NotFound(arg))?;
            beliefs.insert(arg, belief);
        }
        Ok(beliefs)
    }

    /// Joint flock over exactly `arguments`, built from their dependency closure.
    pub fn find_and_combine(&self, arguments: &[Argument]) -> Result<Flock, BeliefError> {
        let closure = dependency::discover(arguments, &self.flocks, &self.owners)?;
        let policy = self.config.policy();

        let mut needed = closure.flocks.iter().map(|&index| &self.flocks[index]);
        let first = needed.next().ok_or_else(|| {
            BeliefError::InvalidArgument("find_and_combine needs at least one argument".into())
        })?;
        let retained: Vec<Argument> = arguments
            .iter()
            .chain(&closure.dependencies)
            .copied()
            .collect();

        let mut combined = Cow::Borrowed(first);
        for next in needed {
            let joined = if combined.size() + next.size() > MAX_VARIABLES {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "Shrinking operands of {} and {} variables to {} retained arguments",
                    combined.size(),
                    next.size(),
                    retained.len()
                );
                let left = combined.marginalize_with(policy, &retained);
                let right = next.marginalize_with(policy, &retained);
                left.combine_with(policy, &right)?
            } else {
                combined.combine_with(policy, next)?
            };
            combined = Cow::Owned(joined);
        }

        Ok(combined.marginalize_with(policy, arguments))
    }
}

/// Debug form: every flock's table, in order, space-separated.
impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, flock) in self.flocks.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", flock)?;
        }
        Ok(())
    }
}

//! Per-argument belief cache.
//!
//! Every owned argument starts with a valid belief of 0.5. An entry goes stale
//! when the table of the flock owning it changes, and stale entries are never
//! refreshed here: query results are recomputed rather than written back.

use rustc_hash::FxHashMap;

use crate::engine::flock::Argument;

/// Belief assigned to every owned argument before any evidence.
pub const INITIAL_BELIEF: f64 = 0.5;

/// One cached belief and whether it still reflects its flock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedBelief {
    pub value: f64,
    pub valid: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BeliefCache {
    entries: FxHashMap<Argument, CachedBelief>,
}

impl BeliefCache {
    /// Registers `argument` with the initial belief.
    pub fn seed(&mut self, argument: Argument) {
        self.entries.insert(
            argument,
            CachedBelief {
                value: INITIAL_BELIEF,
                valid: true,
            },
        );
    }

    /// Cached belief, if present and still valid.
    pub fn get(&self, argument: Argument) -> Option<f64> {
        self.entries
            .get(&argument)
            .filter(|entry| entry.valid)
            .map(|entry| entry.value)
    }

    pub fn is_valid(&self, argument: Argument) -> bool {
        self.get(argument).is_some()
    }

    pub fn invalidate(&mut self, argument: Argument) {
        if let Some(entry) = self.entries.get_mut(&argument) {
            entry.valid = false;
        }
    }

    pub fn invalidate_all<I>(&mut self, arguments: I)
    where
        I: IntoIterator<Item = Argument>,
    {
        for argument in arguments {
            self.invalidate(argument);
        }
    }
}

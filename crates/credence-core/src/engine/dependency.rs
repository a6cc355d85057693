//! Transitive dependency discovery over the flock graph.
//!
//! A flock depends on the owner of each of its conditioning arguments. The
//! closure of a request is every flock reachable from the owners of the
//! requested arguments, together with every conditioning argument crossed on
//! the way. The traversal is an explicit depth-first worklist with a
//! three-state visit map, so a back edge is reported as
//! [`BeliefError::CycleDetected`] instead of recursing without bound.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::engine::errors::BeliefError;
use crate::engine::flock::{Argument, Flock};

/// Flocks and dependency arguments needed to answer a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyClosure {
    /// Conditioning arguments reachable from the request.
    pub dependencies: BTreeSet<Argument>,
    /// Indices of flocks owning a requested argument or a dependency.
    pub flocks: BTreeSet<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Computes the dependency closure of `arguments`.
///
/// `owners` maps every conditioned argument to the index of its flock in
/// `flocks`. Fails with [`BeliefError::NotFound`] for an argument no flock
/// conditions.
pub fn discover(
    arguments: &[Argument],
    flocks: &[Flock],
    owners: &FxHashMap<Argument, usize>,
) -> Result<DependencyClosure, BeliefError> {
    let owner_of = |arg: Argument| owners.get(&arg).copied().ok_or(BeliefError::NotFound(arg));

    let mut closure = DependencyClosure::default();
    let mut visits: FxHashMap<usize, Visit> = FxHashMap::default();
    // (flock index, position of the next conditioning argument to follow)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for &arg in arguments {
        let root = owner_of(arg)?;
        closure.flocks.insert(root);
        if visits.contains_key(&root) {
            continue;
        }
        visits.insert(root, Visit::InProgress);
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let (flock, position) = *top;
            let Some(&dependency) = flocks[flock].conditioning().get(position) else {
                visits.insert(flock, Visit::Done);
                stack.pop();
                continue;
            };
            top.1 += 1;

            closure.dependencies.insert(dependency);
            let owner = owner_of(dependency)?;
            closure.flocks.insert(owner);
            match visits.get(&owner) {
                None => {
                    visits.insert(owner, Visit::InProgress);
                    stack.push((owner, 0));
                }
                Some(Visit::InProgress) => return Err(BeliefError::CycleDetected(dependency)),
                Some(Visit::Done) => {}
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Dependency closure of {} arguments: {} flocks, {} dependencies",
        arguments.len(),
        closure.flocks.len(),
        closure.dependencies.len()
    );

    Ok(closure)
}

//! # Flocks
//!
//! A flock is a dense joint table over the arguments one ownership block
//! defines (its *conditioned* arguments) and the arguments it depends on but
//! does not own (its *conditioning* arguments).
//!
//! ## Layout
//!
//! Every variable gets a bit index: conditioned arguments first, in their
//! given order, then conditioning arguments. The table holds one cell per
//! [`Model`], so its length is always `2^size`.
//!
//! ## Algebra
//!
//! - **refine**: shifts mass between the two outcomes of a conditioned argument
//! - **marginalize**: sums out variables (projection)
//! - **combine**: pointwise product over the joined variable set (join), with
//!   dependencies satisfied by the other side removed from the conditioning set
//!
//! `refine` mutates in place; `marginalize` and `combine` return fresh,
//! independent flocks.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::engine::errors::BeliefError;
use crate::engine::model::{model_count, Model, Projection};
use crate::engine::parallel::{fill_models, ExecutionPolicy};

/// Identifier of one binary proposition.
///
/// Argument implements Ord/PartialOrd for stable, deterministic iteration.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Argument(pub u32);

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Argument {
    fn from(id: u32) -> Self {
        Argument(id)
    }
}

/// Dense joint table over one block's conditioned and conditioning arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Flock {
    conditioned: Vec<Argument>,
    conditioning: Vec<Argument>,
    table: Vec<f64>,
    layout: FxHashMap<Argument, usize>,
}

impl Flock {
    /// Creates a flock with a uniform table (every cell `1 / 2^size`).
    pub fn new(
        conditioned: Vec<Argument>,
        conditioning: Vec<Argument>,
    ) -> Result<Self, BeliefError> {
        Self::with_table(conditioned, conditioning, Vec::new())
    }

    /// Creates a flock over an explicit table.
    ///
    /// An empty table falls back to the uniform prior. Total mass is not
    /// checked; a non-empty table must have exactly `2^size` cells.
    pub fn with_table(
        conditioned: Vec<Argument>,
        conditioning: Vec<Argument>,
        table: Vec<f64>,
    ) -> Result<Self, BeliefError> {
        let models = model_count(conditioned.len() + conditioning.len())?;
        let layout = build_layout(&conditioned, &conditioning)?;

        let table = if table.is_empty() {
            vec![1.0 / models as f64; models]
        } else if table.len() != models {
            return Err(BeliefError::InvalidArgument(format!(
                "table has {} cells, expected {}",
                table.len(),
                models
            )));
        } else {
            table
        };

        Ok(Self {
            conditioned,
            conditioning,
            table,
            layout,
        })
    }

    /// Builds a flock from parts already known to be consistent.
    fn assemble(conditioned: Vec<Argument>, conditioning: Vec<Argument>, table: Vec<f64>) -> Self {
        let layout: FxHashMap<Argument, usize> = conditioned
            .iter()
            .chain(&conditioning)
            .enumerate()
            .map(|(bit, &arg)| (arg, bit))
            .collect();
        debug_assert_eq!(layout.len(), conditioned.len() + conditioning.len());
        debug_assert_eq!(table.len(), 1 << layout.len());
        Self {
            conditioned,
            conditioning,
            table,
            layout,
        }
    }

    /// Number of variables (conditioned plus conditioning).
    pub fn size(&self) -> usize {
        self.conditioned.len() + self.conditioning.len()
    }

    pub fn conditioned(&self) -> &[Argument] {
        &self.conditioned
    }

    pub fn conditioning(&self) -> &[Argument] {
        &self.conditioning
    }

    pub fn table(&self) -> &[f64] {
        &self.table
    }

    /// Bit index of `argument` in this flock's models, if present.
    pub fn bit_of(&self, argument: Argument) -> Option<usize> {
        self.layout.get(&argument).copied()
    }

    pub fn is_conditioned(&self, argument: Argument) -> bool {
        self.bit_of(argument)
            .is_some_and(|bit| bit < self.conditioned.len())
    }

    /// Sum of every cell.
    pub fn total_mass(&self) -> f64 {
        self.table.iter().sum()
    }

    /// Replaces the whole table. Only the length is checked.
    pub fn set_probabilities(&mut self, table: Vec<f64>) -> Result<(), BeliefError> {
        if table.len() != self.table.len() {
            return Err(BeliefError::InvalidArgument(format!(
                "table has {} cells, expected {}",
                table.len(),
                self.table.len()
            )));
        }
        self.table = table;
        Ok(())
    }

    /// Shifts mass toward `positive` outcomes of a conditioned argument.
    pub fn refine(
        &mut self,
        argument: Argument,
        positive: bool,
        coefficient: f64,
    ) -> Result<(), BeliefError> {
        self.refine_with(ExecutionPolicy::Sequential, argument, positive, coefficient)
    }

    /// Shifts mass toward `positive` outcomes of a conditioned argument.
    ///
    /// Each model whose argument bit matches `positive` takes
    /// `coefficient` times the mass of its opposite (the same model with that
    /// bit flipped), and the opposite keeps the remainder. Total mass is
    /// invariant; `0.0` is a no-op and `1.0` empties every disagreeing model.
    pub fn refine_with(
        &mut self,
        policy: ExecutionPolicy,
        argument: Argument,
        positive: bool,
        coefficient: f64,
    ) -> Result<(), BeliefError> {
        let bit = match self.bit_of(argument) {
            Some(bit) if bit < self.conditioned.len() => bit,
            _ => {
                return Err(BeliefError::InvalidArgument(format!(
                    "only conditioned arguments can be refined, {} is not conditioned here",
                    argument
                )))
            }
        };
        if !(0.0..=1.0).contains(&coefficient) {
            return Err(BeliefError::InvalidArgument(format!(
                "refine coefficient must be in [0, 1], got {}",
                coefficient
            )));
        }

        if policy.dispatches(self.table.len()) {
            let previous = self.table.clone();
            fill_models(policy, &mut self.table, |model| {
                let own = previous[model.index()];
                if model.test(bit) == positive {
                    own + coefficient * previous[model.flip(bit).index()]
                } else {
                    own * (1.0 - coefficient)
                }
            });
            return Ok(());
        }

        // Each pair is visited once, from its matching side.
        for index in 0..self.table.len() {
            let model = Model::from_index(index);
            if model.test(bit) == positive {
                let opposite = model.flip(bit).index();
                let moved = self.table[opposite];
                self.table[opposite] = moved * (1.0 - coefficient);
                self.table[index] += coefficient * moved;
            }
        }
        Ok(())
    }

    /// Projects onto `keep`, summing out every other conditioned argument.
    pub fn marginalize(&self, keep: &[Argument]) -> Flock {
        self.marginalize_with(ExecutionPolicy::Sequential, keep)
    }

    /// Projects onto `keep`, summing out every other conditioned argument.
    ///
    /// The result conditions the entries of `keep` this flock conditions, in
    /// `keep` order; unknown entries are ignored. Conditioning arguments are
    /// always retained and stay after the conditioned ones.
    pub fn marginalize_with(&self, policy: ExecutionPolicy, keep: &[Argument]) -> Flock {
        if keep == self.conditioned.as_slice() {
            return self.clone();
        }

        let mut conditioned = Vec::with_capacity(keep.len());
        for &arg in keep {
            if self.is_conditioned(arg) && !conditioned.contains(&arg) {
                conditioned.push(arg);
            }
        }

        let table = self.projected_table(policy, &conditioned);
        Flock::assemble(conditioned, self.conditioning.clone(), table)
    }

    /// In-place form of [`marginalize`](Self::marginalize).
    pub fn marginalize_self(&mut self, keep: &[Argument]) {
        self.marginalize_self_with(ExecutionPolicy::Sequential, keep);
    }

    pub fn marginalize_self_with(&mut self, policy: ExecutionPolicy, keep: &[Argument]) {
        *self = self.marginalize_with(policy, keep);
    }

    /// Table over `conditioned ++ self.conditioning`, summing dropped bits.
    fn projected_table(&self, policy: ExecutionPolicy, conditioned: &[Argument]) -> Vec<f64> {
        let mut kept = vec![false; self.size()];
        let mut gather = Projection::new();
        for (dest, arg) in conditioned.iter().chain(&self.conditioning).enumerate() {
            let src = self.layout[arg];
            gather.push(dest, src);
            kept[src] = true;
        }

        let mut spread = Projection::new();
        for (slot, src) in (0..self.size()).filter(|&bit| !kept[bit]).enumerate() {
            spread.push(slot, src);
        }

        // Dropped combinations are visited in increasing source index order.
        let dropped_models = 1usize << spread.len();
        let mut table = vec![0.0; 1 << gather.len()];
        fill_models(policy, &mut table, |dest| {
            let base = gather.apply(dest);
            (0..dropped_models)
                .map(|combo| self.table[(base | spread.apply(Model::from_index(combo))).index()])
                .sum()
        });
        table
    }

    /// Joins two flocks into one table over their combined variables.
    pub fn combine(&self, other: &Flock) -> Result<Flock, BeliefError> {
        self.combine_with(ExecutionPolicy::Sequential, other)
    }

    /// Joins two flocks into one table over their combined variables.
    ///
    /// The result conditions `self.conditioned ++ other.conditioned`. Its
    /// conditioning set drops every dependency the other side conditions
    /// (Bayes' rule) and lists shared dependencies once. Each cell is the
    /// product of the two input cells its model projects onto.
    pub fn combine_with(
        &self,
        policy: ExecutionPolicy,
        other: &Flock,
    ) -> Result<Flock, BeliefError> {
        if let Some(shared) = self
            .conditioned
            .iter()
            .find(|&&arg| other.is_conditioned(arg))
        {
            return Err(BeliefError::InvalidArgument(format!(
                "argument {} is conditioned by both flocks",
                shared
            )));
        }

        let conditioned: Vec<Argument> = self
            .conditioned
            .iter()
            .chain(&other.conditioned)
            .copied()
            .collect();
        let mut conditioning: Vec<Argument> = Vec::new();
        let open_self = self
            .conditioning
            .iter()
            .filter(|&&arg| !other.is_conditioned(arg));
        let open_other = other
            .conditioning
            .iter()
            .filter(|&&arg| !self.is_conditioned(arg));
        for &arg in open_self.chain(open_other) {
            if !conditioning.contains(&arg) {
                conditioning.push(arg);
            }
        }

        let models = model_count(conditioned.len() + conditioning.len())?;

        let mut to_self = Projection::new();
        let mut to_other = Projection::new();
        for (bit, arg) in conditioned.iter().chain(&conditioning).enumerate() {
            if let Some(src) = self.bit_of(*arg) {
                to_self.push(bit, src);
            }
            if let Some(src) = other.bit_of(*arg) {
                to_other.push(bit, src);
            }
        }

        let mut table = vec![0.0; models];
        fill_models(policy, &mut table, |model| {
            self.table[to_self.apply(model).index()] * other.table[to_other.apply(model).index()]
        });
        Ok(Flock::assemble(conditioned, conditioning, table))
    }
}

/// Debug form of the table: space-separated cell values.
impl fmt::Display for Flock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, value) in self.table.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

fn build_layout(
    conditioned: &[Argument],
    conditioning: &[Argument],
) -> Result<FxHashMap<Argument, usize>, BeliefError> {
    let mut layout = FxHashMap::default();
    for (bit, &arg) in conditioned.iter().chain(conditioning).enumerate() {
        if layout.insert(arg, bit).is_some() {
            return Err(BeliefError::InvalidArgument(format!(
                "argument {} appears more than once in a flock",
                arg
            )));
        }
    }
    Ok(layout)
}

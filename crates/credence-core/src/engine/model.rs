//! Fixed-width model addressing.
//!
//! A model is one joint boolean assignment to a flock's variables, stored as
//! the bits of an integer: bit `k` holds the value of the variable laid out at
//! index `k`. The addressing width is fixed at [`MODEL_WIDTH`] bits and two of
//! them are reserved as headroom, so a flock may hold at most
//! [`MAX_VARIABLES`] variables. Every table length in the crate goes through
//! [`model_count`], which is the single place that ceiling is enforced.

use std::ops::BitOr;

use smallvec::SmallVec;

use crate::engine::errors::BeliefError;

/// Native addressing width of a model, in bits.
pub const MODEL_WIDTH: usize = u32::BITS as usize;

/// Largest number of variables a single table may address.
pub const MAX_VARIABLES: usize = MODEL_WIDTH - 2;

/// One joint boolean assignment, addressed by its bits.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default)]
pub struct Model(u32);

impl Model {
    /// The assignment with every variable false.
    pub const EMPTY: Model = Model(0);

    /// Model addressed by a table index.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        debug_assert!(index >> MAX_VARIABLES == 0, "model index {index} out of range");
        Model(index as u32)
    }

    /// Model with only `bit` set.
    #[inline]
    pub fn single(bit: usize) -> Self {
        Model::EMPTY.set(bit, true)
    }

    /// Table index of this model.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn test(self, bit: usize) -> bool {
        debug_assert!(bit < MAX_VARIABLES);
        (self.0 >> bit) & 1 == 1
    }

    #[inline]
    pub fn set(self, bit: usize, value: bool) -> Self {
        debug_assert!(bit < MAX_VARIABLES);
        if value {
            Model(self.0 | (1 << bit))
        } else {
            Model(self.0 & !(1 << bit))
        }
    }

    #[inline]
    pub fn flip(self, bit: usize) -> Self {
        debug_assert!(bit < MAX_VARIABLES);
        Model(self.0 ^ (1 << bit))
    }
}

impl BitOr for Model {
    type Output = Model;

    #[inline]
    fn bitor(self, rhs: Model) -> Model {
        Model(self.0 | rhs.0)
    }
}

/// Number of models over `variables` binary variables.
///
/// Fails with [`BeliefError::Overflow`] above [`MAX_VARIABLES`].
pub fn model_count(variables: usize) -> Result<usize, BeliefError> {
    if variables > MAX_VARIABLES {
        return Err(BeliefError::Overflow {
            variables,
            limit: MAX_VARIABLES,
        });
    }
    Ok(1usize << variables)
}

/// Re-addresses models from one variable layout into another.
///
/// Each move copies the bit at a source index to a destination index. Bits
/// without a move are dropped; destination bits without a move stay false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    moves: SmallVec<[(u8, u8); 16]>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, from: usize, to: usize) {
        debug_assert!(from < MAX_VARIABLES && to < MAX_VARIABLES);
        self.moves.push((from as u8, to as u8));
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    #[inline]
    pub fn apply(&self, model: Model) -> Model {
        self.moves.iter().fold(Model::EMPTY, |acc, &(from, to)| {
            acc.set(to as usize, model.test(from as usize))
        })
    }
}

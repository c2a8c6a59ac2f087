//! # Component Records
//!
//! A component is a store bound to a world. Binding assigns the store a
//! `(generation, bitflag)` slot in the world's bitmask rows:
//!
//! ```text
//! generation 0: bit 0 .. bit 30   <- 31 components
//! generation 1: bit 0 .. bit 30   <- row appended when bit 31 is reached
//! ```
//!
//! Bit 31 is never assigned, so every mask stays within 31 bits.

use std::collections::BTreeSet;

use super::query::QueryId;

/// Bitflag at which a generation is full and a new row starts.
pub const GENERATION_LIMIT: u32 = 1 << 31;

/// Per-world metadata of a registered component.
#[derive(Clone, Debug)]
pub struct ComponentRecord {
    /// Bitmask row holding this component's presence bit.
    generation_id: usize,
    /// The presence bit within the row.
    bitflag: u32,
    /// Queries that require, exclude or change-track this component.
    pub(crate) queries: BTreeSet<QueryId>,
}

impl ComponentRecord {
    pub(crate) const fn new(generation_id: usize, bitflag: u32, queries: BTreeSet<QueryId>) -> Self {
        Self {
            generation_id,
            bitflag,
            queries,
        }
    }

    /// Bitmask row holding this component's presence bit.
    #[inline]
    #[must_use]
    pub const fn generation_id(&self) -> usize {
        self.generation_id
    }

    /// The presence bit within the row.
    #[inline]
    #[must_use]
    pub const fn bitflag(&self) -> u32 {
        self.bitflag
    }

    /// Queries re-evaluated when this component is added or removed.
    pub fn dependents(&self) -> impl Iterator<Item = QueryId> + '_ {
        self.queries.iter().copied()
    }

    /// Tests this component's bit in `mask`.
    #[inline]
    #[must_use]
    pub const fn is_set_in(&self, mask: u32) -> bool {
        mask & self.bitflag == self.bitflag
    }
}

/// Advances a bitflag cursor.
///
/// Returns the next flag and whether a new generation row must be appended.
#[inline]
#[must_use]
pub const fn next_bitflag(bitflag: u32) -> (u32, bool) {
    let next = bitflag.wrapping_mul(2);
    if next >= GENERATION_LIMIT || next == 0 {
        (1, true)
    } else {
        (next, false)
    }
}

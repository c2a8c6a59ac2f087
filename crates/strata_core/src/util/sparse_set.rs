//! # Sparse Set
//!
//! Dense/sparse array pair used for the existence index and for every
//! per-query index.
//!
//! ```text
//! dense:  [7, 2, 9]          <- contained handles, packed
//! sparse: [_, _, 1, _, _, _, _, 0, _, 2]
//!                ^ handle 2 lives at dense[1]
//! ```
//!
//! Invariant: `dense[sparse[h]] == h` for every contained `h`.

use std::cmp::Ordering;

use crate::ecs::Entity;

/// Set of entity handles with O(1) insert, membership test and removal.
///
/// Removal swaps the last dense element into the vacated slot, so iteration
/// order is not stable across removals.
#[derive(Clone, Debug, Default)]
pub struct SparseSet {
    /// Contained handles, packed.
    dense: Vec<Entity>,
    /// Handle -> position in `dense`. Stale entries are tolerated.
    sparse: Vec<u32>,
}

impl SparseSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
        }
    }

    /// Returns `true` if `entity` is in the set.
    #[inline]
    #[must_use]
    pub fn has(&self, entity: Entity) -> bool {
        self.sparse
            .get(entity as usize)
            .and_then(|&index| self.dense.get(index as usize))
            .is_some_and(|&stored| stored == entity)
    }

    /// Inserts `entity`. Inserting a present handle is a no-op.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn add(&mut self, entity: Entity) {
        if self.has(entity) {
            return;
        }
        let slot = entity as usize;
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, 0);
        }
        // Dense length never exceeds the u32 handle range.
        let index = self.dense.len() as u32;
        self.sparse[slot] = index;
        self.dense.push(entity);
    }

    /// Removes `entity`, returning whether it was present.
    #[inline]
    pub fn remove(&mut self, entity: Entity) -> bool {
        if !self.has(entity) {
            return false;
        }
        let index = self.sparse[entity as usize];
        if let Some(swapped) = self.dense.pop() {
            if swapped != entity {
                self.dense[index as usize] = swapped;
                self.sparse[swapped as usize] = index;
            }
        }
        true
    }

    /// Number of contained handles.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if the set is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// The contained handles in dense order.
    #[inline]
    #[must_use]
    pub fn dense(&self) -> &[Entity] {
        &self.dense
    }

    /// Iterates over the contained handles in dense order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.dense.iter().copied()
    }

    /// Removes every handle.
    pub fn reset(&mut self) {
        self.dense.clear();
        self.sparse.clear();
    }

    /// Empties the set, returning its handles in dense order.
    pub fn take(&mut self) -> Vec<Entity> {
        self.sparse.clear();
        std::mem::take(&mut self.dense)
    }

    /// Sorts the dense array and re-indexes the sparse side to match.
    #[allow(clippy::cast_possible_truncation)]
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Entity, &Entity) -> Ordering,
    {
        self.dense.sort_by(compare);
        for (index, &entity) in self.dense.iter().enumerate() {
            self.sparse[entity as usize] = index as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_has_remove() {
        let mut set = SparseSet::new();
        set.add(5);
        set.add(1);
        set.add(5);
        assert_eq!(set.len(), 2);
        assert!(set.has(5));
        assert!(set.has(1));
        assert!(!set.has(0));
        assert!(!set.has(1_000));

        assert!(set.remove(5));
        assert!(!set.remove(5));
        assert!(!set.has(5));
        assert_eq!(set.dense(), &[1]);
    }

    #[test]
    fn test_swap_remove_keeps_invariant() {
        let mut set = SparseSet::new();
        for entity in 0..10 {
            set.add(entity);
        }
        set.remove(3);
        set.remove(0);
        for &entity in set.dense() {
            assert!(set.has(entity));
        }
        assert_eq!(set.len(), 8);
        // Last element was swapped into the hole left by 3.
        assert_eq!(set.dense()[3], 9);
    }

    #[test]
    fn test_stale_sparse_entry_is_not_membership() {
        let mut set = SparseSet::new();
        set.add(4);
        set.remove(4);
        set.add(7);
        // sparse[4] still points at slot 0, which now holds 7.
        assert!(!set.has(4));
        assert!(set.has(7));
    }

    #[test]
    fn test_sort_reindexes() {
        let mut set = SparseSet::new();
        for entity in [9, 3, 6, 1] {
            set.add(entity);
        }
        set.sort_by(Ord::cmp);
        assert_eq!(set.dense(), &[1, 3, 6, 9]);
        set.remove(3);
        assert_eq!(set.dense(), &[1, 9, 6]);
        assert!(set.has(9));
    }

    #[test]
    fn test_take_empties() {
        let mut set = SparseSet::new();
        set.add(2);
        set.add(8);
        assert_eq!(set.take(), vec![2, 8]);
        assert!(set.is_empty());
        assert!(!set.has(2));
    }
}

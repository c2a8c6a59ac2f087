//! # Entity Management
//!
//! Entities are plain integer handles: an index into every column and every
//! bitmask row of a world. They carry no state of their own.
//!
//! Handles are issued from a cursor and recycled through a FIFO queue:
//! - **Automatic mode**: a removed handle is reused once the queue holds more
//!   than a fraction of the world's capacity
//! - **Manual mode**: removed handles wait in a backlog until explicitly
//!   flushed, then are reused oldest first

use std::collections::VecDeque;

use crate::error::{EcsError, EcsResult};

/// Entity handle, unique among the live entities of one world.
pub type Entity = u32;

/// Issues and recycles the entity handles of one world.
#[derive(Clone, Debug, Default)]
pub struct EntityAllocator {
    /// Next never-issued handle.
    cursor: Entity,
    /// Handles available for reuse, oldest first.
    removed: VecDeque<Entity>,
    /// Manual mode backlog, waiting for a flush.
    recycled: Vec<Entity>,
    /// Whether recycling waits for an explicit flush.
    manual: bool,
}

impl EntityAllocator {
    /// Creates an allocator in automatic mode.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cursor: 0,
            removed: VecDeque::new(),
            recycled: Vec::new(),
            manual: false,
        }
    }

    /// Number of handles ever issued.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Entity {
        self.cursor
    }

    /// Returns `true` once manual recycling is enabled.
    #[inline]
    #[must_use]
    pub const fn is_manual(&self) -> bool {
        self.manual
    }

    /// Switches to manual recycling.
    pub fn enable_manual_recycling(&mut self) {
        self.manual = true;
    }

    /// Issues a handle.
    ///
    /// # Arguments
    ///
    /// * `recycle_after` - Automatic mode reuses a removed handle only when
    ///   more than this many are queued
    /// * `capacity` - Handles at or beyond this value cannot be issued
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] if nothing can be reused and
    /// the cursor has reached `capacity`.
    pub fn allocate(&mut self, recycle_after: usize, capacity: usize) -> EcsResult<Entity> {
        let reuse = if self.manual {
            !self.removed.is_empty()
        } else {
            self.removed.len() > recycle_after
        };
        if reuse {
            if let Some(eid) = self.removed.pop_front() {
                return Ok(eid);
            }
        }

        if self.cursor as usize >= capacity {
            return Err(EcsError::CapacityExceeded { capacity });
        }
        let eid = self.cursor;
        self.cursor += 1;
        Ok(eid)
    }

    /// Queues a removed handle for reuse.
    pub fn release(&mut self, eid: Entity) {
        if self.manual {
            self.recycled.push(eid);
        } else {
            self.removed.push_back(eid);
        }
    }

    /// Makes the whole manual backlog reusable, oldest first.
    pub fn flush(&mut self) {
        self.removed.extend(self.recycled.drain(..));
    }

    /// Every handle waiting for reuse: the manual backlog, then the queue.
    #[must_use]
    pub fn removed(&self) -> Vec<Entity> {
        self.recycled
            .iter()
            .chain(self.removed.iter())
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_issuance() {
        let mut allocator = EntityAllocator::new();
        for expected in 0..10 {
            assert_eq!(allocator.allocate(0, 100).unwrap(), expected);
        }
        assert_eq!(allocator.cursor(), 10);
    }

    #[test]
    fn test_automatic_threshold_is_strict() {
        let mut allocator = EntityAllocator::new();
        for _ in 0..5 {
            allocator.allocate(2, 100).unwrap();
        }
        allocator.release(3);
        allocator.release(1);
        assert_eq!(allocator.allocate(2, 100).unwrap(), 5);

        allocator.release(0);
        assert_eq!(allocator.allocate(2, 100).unwrap(), 3);
        assert_eq!(allocator.removed(), vec![1, 0]);
    }

    #[test]
    fn test_manual_waits_for_flush() {
        let mut allocator = EntityAllocator::new();
        allocator.enable_manual_recycling();
        for _ in 0..3 {
            allocator.allocate(0, 100).unwrap();
        }
        allocator.release(2);
        allocator.release(0);
        assert_eq!(allocator.allocate(0, 100).unwrap(), 3);

        allocator.flush();
        assert_eq!(allocator.allocate(0, 100).unwrap(), 2);
        assert_eq!(allocator.allocate(0, 100).unwrap(), 0);
        assert_eq!(allocator.allocate(0, 100).unwrap(), 4);
    }

    #[test]
    fn test_capacity() {
        let mut allocator = EntityAllocator::new();
        allocator.allocate(0, 1).unwrap();
        assert!(matches!(
            allocator.allocate(0, 1),
            Err(EcsError::CapacityExceeded { capacity: 1 })
        ));
    }
}

//! # Arena Allocator
//!
//! A bump allocator that packs every fixed-length array field of one element
//! type into a single shared buffer.

use super::buffer::Buffer;
use crate::storage::FieldType;

/// Arena capacities are rounded up to a multiple of this many elements.
const CAPACITY_ROUNDING: usize = 4;

/// A span of elements handed out by an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// First element of the span.
    pub offset: usize,
    /// Number of elements in the span.
    pub len: usize,
}

impl Region {
    /// One past the last element of the span.
    #[inline]
    #[must_use]
    pub const fn end(self) -> usize {
        self.offset + self.len
    }
}

/// A bump-pointer arena over one typed [`Buffer`].
///
/// Allocations are fast (just bump a cursor) and never freed individually.
/// [`reset`](Self::reset) rewinds the cursor so regions can be handed out
/// again, which is how a store regenerates its layout after a resize.
///
/// # Example
///
/// ```rust,ignore
/// let mut arena = Arena::new(FieldType::F32, 3 * 100);
/// let velocity = arena.alloc(3 * 100).unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct Arena {
    /// The backing storage.
    buffer: Buffer,
    /// Current allocation offset, in elements.
    cursor: usize,
}

impl Arena {
    /// Creates an arena able to hold `elements` elements of `ty`.
    ///
    /// The capacity is rounded up to a multiple of four elements.
    #[must_use]
    pub fn new(ty: FieldType, elements: usize) -> Self {
        Self {
            buffer: Buffer::new(ty, round_capacity(elements)),
            cursor: 0,
        }
    }

    /// Element type of the arena.
    #[inline]
    #[must_use]
    pub const fn ty(&self) -> FieldType {
        self.buffer.ty()
    }

    /// Total capacity in elements.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Elements handed out since the last reset.
    #[inline]
    #[must_use]
    pub const fn used(&self) -> usize {
        self.cursor
    }

    /// Elements still available.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.capacity() - self.cursor
    }

    /// Hands out the next `len` elements.
    ///
    /// Returns `None` if the arena is out of space.
    pub fn alloc(&mut self, len: usize) -> Option<Region> {
        let end = self.cursor.checked_add(len)?;
        if end > self.capacity() {
            return None;
        }
        let region = Region {
            offset: self.cursor,
            len,
        };
        self.cursor = end;
        Some(region)
    }

    /// Rewinds the cursor. Previously returned regions become invalid.
    #[inline]
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Grows the backing buffer to hold at least `elements` elements.
    ///
    /// Contents are preserved at their current offsets.
    pub fn grow(&mut self, elements: usize) {
        self.buffer.grow(round_capacity(elements));
    }

    /// The backing buffer.
    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// The backing buffer, mutably.
    #[inline]
    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }
}

fn round_capacity(elements: usize) -> usize {
    elements.div_ceil(CAPACITY_ROUNDING) * CAPACITY_ROUNDING
}

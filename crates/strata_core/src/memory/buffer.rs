//! # Typed Buffer
//!
//! Zero-initialised backing memory for one column or one packed array
//! arena. Storage is kept in `u64` words so every element type up to 8 bytes
//! is correctly aligned when viewed through `bytemuck`.

use crate::storage::{Element, FieldType};

/// Contiguous, zeroed, 8-byte aligned element storage.
#[derive(Clone, Debug)]
pub struct Buffer {
    /// Element type stored in this buffer.
    ty: FieldType,
    /// Length in elements.
    len: usize,
    /// Backing words.
    words: Vec<u64>,
}

impl Buffer {
    /// Allocates `len` zeroed elements of type `ty`.
    #[must_use]
    pub fn new(ty: FieldType, len: usize) -> Self {
        Self {
            ty,
            len,
            words: vec![0; words_for(ty, len)],
        }
    }

    /// Element type of this buffer.
    #[inline]
    #[must_use]
    pub const fn ty(&self) -> FieldType {
        self.ty
    }

    /// Length in elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw bytes of the live elements.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.len * self.ty.bytes()]
    }

    /// Mutable raw bytes of the live elements.
    #[inline]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        let end = self.len * self.ty.bytes();
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)[..end]
    }

    /// Views the elements as `T`.
    ///
    /// The caller is responsible for checking that `T` matches [`ty`].
    ///
    /// [`ty`]: Self::ty
    #[inline]
    #[must_use]
    pub fn as_slice<T: Element>(&self) -> &[T] {
        &bytemuck::cast_slice::<u64, T>(&self.words)[..self.len]
    }

    /// Mutably views the elements as `T`.
    #[inline]
    pub fn as_mut_slice<T: Element>(&mut self) -> &mut [T] {
        let len = self.len;
        &mut bytemuck::cast_slice_mut::<u64, T>(&mut self.words)[..len]
    }

    /// Grows to `len` elements, preserving existing contents.
    ///
    /// New elements are zero. Shrinking is ignored.
    pub fn grow(&mut self, len: usize) {
        if len <= self.len {
            return;
        }
        self.words.resize(words_for(self.ty, len), 0);
        self.len = len;
    }

    /// Zeroes every element.
    pub fn zero(&mut self) {
        self.words.fill(0);
    }
}

fn words_for(ty: FieldType, len: usize) -> usize {
    (len * ty.bytes()).div_ceil(8)
}

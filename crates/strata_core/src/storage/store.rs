//! # Component Store
//!
//! World-independent backing columns for one component schema.
//!
//! ## Layout
//!
//! ```text
//! schema { x: f32, y: f32, hp: [i16, 2], ammo: [i16, 3] }, size = 4
//!
//! columns:   x  [x0 x1 x2 x3]
//!            y  [y0 y1 y2 y3]
//! arena i16:    [hp0 hp0 hp1 hp1 hp2 hp2 hp3 hp3 | am0 am0 am0 am1 ... am3]
//!                ^ region(hp)                      ^ region(ammo)
//! ```
//!
//! Scalar fields own one flat column each. Array fields of one element type
//! share a single bump-allocated arena; entity `eid` of a width-`L` field
//! lives at `region.offset + L * eid`. Every leaf is recorded, in schema
//! order, in the flattened leaf list used by resize, reset and diffing.

use std::ops::{Index, IndexMut};

use crate::error::{EcsError, EcsResult};
use crate::memory::{Arena, Buffer, Region};

use super::schema::Schema;
use super::types::{Element, FieldType};

/// Where a leaf's data lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafKind {
    /// A flat column of one value per entity.
    Scalar {
        /// Index into the store's scalar columns.
        column: usize,
    },
    /// A fixed-length array packed into the arena of its element type.
    Array {
        /// Elements per entity.
        length: usize,
        /// Span of the arena owned by this field.
        region: Region,
    },
}

/// One flattened leaf column of a store.
#[derive(Clone, Debug)]
pub struct Leaf {
    path: String,
    ty: FieldType,
    kind: LeafKind,
}

impl Leaf {
    /// Dotted path of the field.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Element type of the field.
    #[must_use]
    pub const fn ty(&self) -> FieldType {
        self.ty
    }

    /// Storage of the field.
    #[must_use]
    pub const fn kind(&self) -> LeafKind {
        self.kind
    }

    /// Elements stored per entity.
    #[must_use]
    pub const fn width(&self) -> usize {
        match self.kind {
            LeafKind::Scalar { .. } => 1,
            LeafKind::Array { length, .. } => length,
        }
    }
}

/// Backing columns for one component, shared by every world that uses it.
#[derive(Clone, Debug)]
pub struct Store {
    /// Entities addressable in every column.
    size: usize,
    /// `true` when the schema has no fields.
    tag: bool,
    /// Flattened leaves in schema order.
    leaves: Vec<Leaf>,
    /// One column per scalar leaf.
    columns: Vec<Buffer>,
    /// One arena per element type used by array leaves.
    arenas: Vec<Option<Arena>>,
    /// Sum of array lengths per element type.
    array_element_counts: [usize; FieldType::ALL.len()],
}

impl Store {
    /// Lays out a store for `schema` with room for `size` entities.
    ///
    /// # Errors
    ///
    /// Returns an error if an array field declares a zero length.
    pub fn new(schema: &Schema, size: usize) -> EcsResult<Self> {
        schema.validate()?;

        let mut store = Self {
            size,
            tag: schema.is_tag(),
            leaves: Vec::new(),
            columns: Vec::new(),
            arenas: FieldType::ALL.iter().map(|_| None).collect(),
            array_element_counts: [0; FieldType::ALL.len()],
        };
        if store.tag {
            return Ok(store);
        }

        collect_array_element_counts(schema, &mut store.array_element_counts);
        for ty in FieldType::ALL {
            let count = store.array_element_counts[ty.index()];
            if count > 0 {
                store.arenas[ty.index()] = Some(Arena::new(ty, count * size));
            }
        }
        store.layout(String::new(), schema)?;
        Ok(store)
    }

    fn layout(&mut self, path: String, schema: &Schema) -> EcsResult<()> {
        match schema {
            Schema::Scalar(ty) => {
                self.leaves.push(Leaf {
                    path,
                    ty: *ty,
                    kind: LeafKind::Scalar {
                        column: self.columns.len(),
                    },
                });
                self.columns.push(Buffer::new(*ty, self.size));
            }
            Schema::Array(ty, length) => {
                let region = self.alloc_region(*ty, *length)?;
                self.leaves.push(Leaf {
                    path,
                    ty: *ty,
                    kind: LeafKind::Array {
                        length: *length,
                        region,
                    },
                });
            }
            Schema::Shape(fields) => {
                for (name, child) in fields {
                    let child_path = if path.is_empty() {
                        name.clone()
                    } else {
                        format!("{path}.{name}")
                    };
                    self.layout(child_path, child)?;
                }
            }
        }
        Ok(())
    }

    fn alloc_region(&mut self, ty: FieldType, length: usize) -> EcsResult<Region> {
        let capacity = self.size;
        self.arenas[ty.index()]
            .as_mut()
            .and_then(|arena| arena.alloc(length * capacity))
            .ok_or(EcsError::CapacityExceeded { capacity })
    }

    /// Entities addressable in every column.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` for a tag store, which has no columns.
    #[inline]
    #[must_use]
    pub const fn is_tag(&self) -> bool {
        self.tag
    }

    /// Flattened leaves, in schema order.
    #[must_use]
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// Dotted paths of every leaf.
    pub fn field_paths(&self) -> impl Iterator<Item = &str> {
        self.leaves.iter().map(Leaf::path)
    }

    /// Element type of the leaf at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownField`] if no leaf has that path.
    pub fn field_type(&self, path: &str) -> EcsResult<FieldType> {
        self.find(path).map(|index| self.leaves[index].ty)
    }

    fn find(&self, path: &str) -> EcsResult<usize> {
        self.leaves
            .iter()
            .position(|leaf| leaf.path == path)
            .ok_or_else(|| EcsError::UnknownField(path.to_owned()))
    }

    /// Resolves `path` to a scalar column index, checking its type.
    fn scalar_column<T: Element>(&self, path: &str) -> EcsResult<usize> {
        let leaf = &self.leaves[self.find(path)?];
        check_type::<T>(leaf)?;
        match leaf.kind {
            LeafKind::Scalar { column } => Ok(column),
            LeafKind::Array { .. } => Err(EcsError::FieldKindMismatch {
                field: path.to_owned(),
                expected: "scalar",
            }),
        }
    }

    /// Resolves `path` to an array leaf, checking its type.
    fn array_leaf<T: Element>(&self, path: &str) -> EcsResult<(FieldType, usize, Region)> {
        let leaf = &self.leaves[self.find(path)?];
        check_type::<T>(leaf)?;
        match leaf.kind {
            LeafKind::Array { length, region } => Ok((leaf.ty, length, region)),
            LeafKind::Scalar { .. } => Err(EcsError::FieldKindMismatch {
                field: path.to_owned(),
                expected: "array",
            }),
        }
    }

    /// The column of the scalar field at `path`, indexed by entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is unknown, names an array field, or
    /// holds another element type.
    pub fn scalar<T: Element>(&self, path: &str) -> EcsResult<&[T]> {
        let column = self.scalar_column::<T>(path)?;
        Ok(self.columns[column].as_slice())
    }

    /// Mutable column of the scalar field at `path`.
    ///
    /// # Errors
    ///
    /// Same as [`scalar`](Self::scalar).
    pub fn scalar_mut<T: Element>(&mut self, path: &str) -> EcsResult<&mut [T]> {
        let column = self.scalar_column::<T>(path)?;
        Ok(self.columns[column].as_mut_slice())
    }

    /// Several scalar columns of one element type at once.
    ///
    /// # Errors
    ///
    /// Same as [`scalar`](Self::scalar).
    pub fn scalars<T: Element, const N: usize>(&self, paths: [&str; N]) -> EcsResult<[&[T]; N]> {
        let mut out: [&[T]; N] = [&[][..]; N];
        for (slot, path) in out.iter_mut().zip(paths) {
            *slot = self.scalar(path)?;
        }
        Ok(out)
    }

    /// Several disjoint mutable scalar columns of one element type.
    ///
    /// ```rust,ignore
    /// let [x, y, z] = position.scalars_mut::<f32, 3>(["x", "y", "z"])?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::AliasedField`] if a path repeats, otherwise the
    /// same errors as [`scalar`](Self::scalar).
    pub fn scalars_mut<T: Element, const N: usize>(
        &mut self,
        paths: [&str; N],
    ) -> EcsResult<[&mut [T]; N]> {
        let mut columns = [0usize; N];
        for (i, path) in paths.iter().enumerate() {
            let column = self.scalar_column::<T>(path)?;
            if columns[..i].contains(&column) {
                return Err(EcsError::AliasedField((*path).to_owned()));
            }
            columns[i] = column;
        }
        let mut slots: Vec<Option<&mut Buffer>> = self.columns.iter_mut().map(Some).collect();
        Ok(std::array::from_fn(|i| {
            slots[columns[i]]
                .take()
                .map(Buffer::as_mut_slice::<T>)
                .unwrap_or_default()
        }))
    }

    /// Per-entity views of the array field at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is unknown, names a scalar field, or
    /// holds another element type.
    pub fn array<T: Element>(&self, path: &str) -> EcsResult<ArrayColumn<'_, T>> {
        let (ty, length, region) = self.array_leaf::<T>(path)?;
        let data = match &self.arenas[ty.index()] {
            Some(arena) => &arena.buffer().as_slice::<T>()[region.offset..region.end()],
            None => Default::default(),
        };
        Ok(ArrayColumn { data, length })
    }

    /// Mutable per-entity views of the array field at `path`.
    ///
    /// # Errors
    ///
    /// Same as [`array`](Self::array).
    pub fn array_mut<T: Element>(&mut self, path: &str) -> EcsResult<ArrayColumnMut<'_, T>> {
        let (ty, length, region) = self.array_leaf::<T>(path)?;
        let data = match &mut self.arenas[ty.index()] {
            Some(arena) => &mut arena.buffer_mut().as_mut_slice::<T>()[region.offset..region.end()],
            None => Default::default(),
        };
        Ok(ArrayColumnMut { data, length })
    }

    /// Raw bytes of leaf `leaf`, plus the byte stride of one entity.
    pub(crate) fn leaf_bytes(&self, leaf: usize) -> Option<(&[u8], usize)> {
        let leaf = self.leaves.get(leaf)?;
        let width = leaf.ty.bytes();
        match leaf.kind {
            LeafKind::Scalar { column } => Some((self.columns[column].bytes(), width)),
            LeafKind::Array { length, region } => {
                let arena = self.arenas[leaf.ty.index()].as_ref()?;
                let bytes = &arena.buffer().bytes()[region.offset * width..region.end() * width];
                Some((bytes, length * width))
            }
        }
    }

    /// Grows every column and arena to `size` entities.
    ///
    /// Each entity keeps its values. Array regions move, so every
    /// per-entity view is regenerated. Shrinking is ignored.
    pub fn resize(&mut self, size: usize) {
        if size <= self.size {
            return;
        }
        let old_size = self.size;
        self.size = size;
        if self.tag {
            return;
        }

        for column in &mut self.columns {
            column.grow(size);
        }

        for ty in FieldType::ALL {
            let Some(arena) = self.arenas[ty.index()].as_mut() else {
                continue;
            };
            arena.grow(self.array_element_counts[ty.index()] * size);
            arena.reset();

            let mut moves = Vec::new();
            for leaf in &mut self.leaves {
                if leaf.ty != ty {
                    continue;
                }
                if let LeafKind::Array { length, region } = &mut leaf.kind {
                    let Some(next) = arena.alloc(*length * size) else {
                        continue;
                    };
                    moves.push((*region, next));
                    *region = next;
                }
            }

            // Regions only move towards the end, so relocate back to front.
            let width = ty.bytes();
            let bytes = arena.buffer_mut().bytes_mut();
            for (old, new) in moves.into_iter().rev() {
                bytes.copy_within(old.offset * width..old.end() * width, new.offset * width);
                bytes[(new.offset + old.len) * width..new.end() * width].fill(0);
            }
        }

        tracing::debug!(from = old_size, to = size, "store resized");
    }

    /// Zeroes every column.
    pub fn reset(&mut self) {
        for column in &mut self.columns {
            column.zero();
        }
        for arena in self.arenas.iter_mut().flatten() {
            arena.buffer_mut().zero();
        }
    }

    /// Zeroes one entity's slice of every leaf.
    pub fn reset_for(&mut self, eid: usize) {
        if eid >= self.size {
            return;
        }
        for leaf in &self.leaves {
            let width = leaf.ty.bytes();
            match leaf.kind {
                LeafKind::Scalar { column } => {
                    self.columns[column].bytes_mut()[eid * width..(eid + 1) * width].fill(0);
                }
                LeafKind::Array { length, region } => {
                    if let Some(arena) = self.arenas[leaf.ty.index()].as_mut() {
                        let start = (region.offset + eid * length) * width;
                        arena.buffer_mut().bytes_mut()[start..start + length * width].fill(0);
                    }
                }
            }
        }
    }
}

fn collect_array_element_counts(schema: &Schema, counts: &mut [usize; FieldType::ALL.len()]) {
    match schema {
        Schema::Scalar(_) => {}
        Schema::Array(ty, length) => counts[ty.index()] += length,
        Schema::Shape(fields) => {
            for (_, child) in fields {
                collect_array_element_counts(child, counts);
            }
        }
    }
}

fn check_type<T: Element>(leaf: &Leaf) -> EcsResult<()> {
    if T::FIELD_TYPES.contains(&leaf.ty) {
        Ok(())
    } else {
        Err(EcsError::TypeMismatch {
            field: leaf.path.clone(),
            actual: leaf.ty,
            requested: T::NAME,
        })
    }
}

/// Read-only per-entity views of one array field.
///
/// Indexing by entity yields that entity's fixed-length slice.
#[derive(Clone, Copy, Debug)]
pub struct ArrayColumn<'a, T> {
    data: &'a [T],
    length: usize,
}

impl<'a, T> ArrayColumn<'a, T> {
    /// Elements per entity.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// The slice of entity `eid`, if it is within the store.
    #[must_use]
    pub fn get(&self, eid: usize) -> Option<&'a [T]> {
        self.data.get(eid * self.length..(eid + 1) * self.length)
    }

    /// The whole region backing this field.
    #[must_use]
    pub const fn parent(&self) -> &'a [T] {
        self.data
    }
}

impl<T> Index<usize> for ArrayColumn<'_, T> {
    type Output = [T];

    fn index(&self, eid: usize) -> &[T] {
        &self.data[eid * self.length..(eid + 1) * self.length]
    }
}

/// Mutable per-entity views of one array field.
#[derive(Debug)]
pub struct ArrayColumnMut<'a, T> {
    data: &'a mut [T],
    length: usize,
}

impl<T> ArrayColumnMut<'_, T> {
    /// Elements per entity.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// The slice of entity `eid`, if it is within the store.
    #[must_use]
    pub fn get(&self, eid: usize) -> Option<&[T]> {
        self.data.get(eid * self.length..(eid + 1) * self.length)
    }

    /// The mutable slice of entity `eid`, if it is within the store.
    pub fn get_mut(&mut self, eid: usize) -> Option<&mut [T]> {
        self.data.get_mut(eid * self.length..(eid + 1) * self.length)
    }

    /// The whole region backing this field.
    pub fn parent_mut(&mut self) -> &mut [T] {
        self.data
    }
}

impl<T> Index<usize> for ArrayColumnMut<'_, T> {
    type Output = [T];

    fn index(&self, eid: usize) -> &[T] {
        &self.data[eid * self.length..(eid + 1) * self.length]
    }
}

impl<T> IndexMut<usize> for ArrayColumnMut<'_, T> {
    fn index_mut(&mut self, eid: usize) -> &mut [T] {
        &mut self.data[eid * self.length..(eid + 1) * self.length]
    }
}

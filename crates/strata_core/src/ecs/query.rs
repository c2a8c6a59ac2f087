//! # Queries
//!
//! A query is compiled, per world, into one `(mask, not_mask)` pair per
//! bitmask generation it touches. An entity matches when, for every such
//! generation, it has none of the excluded bits and all of the required bits.
//!
//! ## Entity states
//!
//! ```text
//! absent ──match──▶ fresh (matches + entered) ──drain──▶ stable (matches)
//!    ▲                                                      │
//!    └──commit── pending (matches + exited + to_remove) ◀───┘ lost match
//! ```
//!
//! Removals are deferred: an entity that stops matching stays in the live
//! index until the next accessor call commits it. Re-matching before that
//! commit cancels the removal.

use std::collections::HashMap;
use std::fmt;

use crate::error::EcsResult;
use crate::storage::{FieldType, StoreId, StoreRegistry};
use crate::util::SparseSet;

use super::component::ComponentRecord;
use super::entity::Entity;

/// Handle to a query defined on an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryId(u32);

impl QueryId {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Slot index in the engine's descriptor table.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query#{}", self.0)
    }
}

/// One term of a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryTerm {
    /// Entity must have the component.
    With(StoreId),
    /// Entity must not have the component.
    Not(StoreId),
    /// Entity must have the component; results are the entities whose
    /// component values changed since the previous call.
    Changed(StoreId),
}

impl QueryTerm {
    /// The component this term refers to.
    #[inline]
    #[must_use]
    pub const fn store(self) -> StoreId {
        match self {
            Self::With(store) | Self::Not(store) | Self::Changed(store) => store,
        }
    }
}

/// World-independent definition of a query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryDescriptor {
    terms: Vec<QueryTerm>,
}

impl QueryDescriptor {
    /// Creates a descriptor from its terms, in order.
    pub fn new(terms: impl IntoIterator<Item = QueryTerm>) -> Self {
        Self {
            terms: terms.into_iter().collect(),
        }
    }

    /// The terms of the query.
    #[must_use]
    pub fn terms(&self) -> &[QueryTerm] {
        &self.terms
    }

    /// Returns `true` for the query with no terms, which yields every
    /// entity of the world.
    #[must_use]
    pub fn is_all_entities(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Required and excluded bits of one generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GenerationMask {
    generation: usize,
    mask: u32,
    not_mask: u32,
}

/// Live state of one query in one world.
#[derive(Clone, Debug)]
pub struct QueryState {
    /// Required components, change-tracked ones included.
    components: Vec<StoreId>,
    /// Excluded components.
    not_components: Vec<StoreId>,
    /// Change-tracked components.
    changed_components: Vec<StoreId>,
    /// Compiled masks, one per generation touched.
    generations: Vec<GenerationMask>,
    /// `(store, leaf, element type)` of every column diffed for change
    /// tracking.
    flat_props: Vec<(StoreId, usize, FieldType)>,
    /// Snapshots of `flat_props`, created on the first diff.
    shadows: Vec<Option<Vec<u8>>>,
    /// Live index of matching entities.
    matches: SparseSet,
    /// Entities whose removal is pending until the next commit.
    to_remove: SparseSet,
    /// Entities that started matching since the last drain.
    entered: SparseSet,
    /// Entities that stopped matching since the last drain.
    exited: SparseSet,
    /// Result of the most recent diff.
    changed: Vec<Entity>,
}

impl QueryState {
    /// Compiles `descriptor` against a world's component records.
    ///
    /// Every component named by the descriptor must already be registered.
    pub(crate) fn compile(
        descriptor: &QueryDescriptor,
        records: &HashMap<StoreId, ComponentRecord>,
        stores: &StoreRegistry,
    ) -> EcsResult<Self> {
        let mut components = Vec::new();
        let mut not_components = Vec::new();
        let mut changed_components = Vec::new();
        for term in descriptor.terms() {
            match *term {
                QueryTerm::With(store) => push_unique(&mut components, store),
                QueryTerm::Not(store) => push_unique(&mut not_components, store),
                QueryTerm::Changed(store) => {
                    push_unique(&mut changed_components, store);
                    push_unique(&mut components, store);
                }
            }
        }

        let mut generations: Vec<GenerationMask> = Vec::new();
        let all = components
            .iter()
            .map(|store| (store, false))
            .chain(not_components.iter().map(|store| (store, true)));
        for (store, excluded) in all {
            let Some(record) = records.get(store) else {
                continue;
            };
            let index = match generations
                .iter()
                .position(|g| g.generation == record.generation_id())
            {
                Some(index) => index,
                None => {
                    generations.push(GenerationMask {
                        generation: record.generation_id(),
                        mask: 0,
                        not_mask: 0,
                    });
                    generations.len() - 1
                }
            };
            if excluded {
                generations[index].not_mask |= record.bitflag();
            } else {
                generations[index].mask |= record.bitflag();
            }
        }

        let mut flat_props = Vec::new();
        for &store in &components {
            let store_ref = stores.get(store)?;
            if store_ref.is_tag() {
                continue;
            }
            flat_props.extend(
                store_ref
                    .leaves()
                    .iter()
                    .enumerate()
                    .map(|(leaf, entry)| (store, leaf, entry.ty())),
            );
        }

        Ok(Self {
            components,
            not_components,
            changed_components,
            generations,
            shadows: vec![None; flat_props.len()],
            flat_props,
            matches: SparseSet::new(),
            to_remove: SparseSet::new(),
            entered: SparseSet::new(),
            exited: SparseSet::new(),
            changed: Vec::new(),
        })
    }

    /// Required components, change-tracked ones included.
    #[must_use]
    pub fn components(&self) -> &[StoreId] {
        &self.components
    }

    /// Excluded components.
    #[must_use]
    pub fn not_components(&self) -> &[StoreId] {
        &self.not_components
    }

    /// Change-tracked components.
    #[must_use]
    pub fn changed_components(&self) -> &[StoreId] {
        &self.changed_components
    }

    /// Returns `true` if the query re-evaluates when `store` is added to or
    /// removed from an entity.
    #[must_use]
    pub fn references(&self, store: StoreId) -> bool {
        self.components.contains(&store) || self.not_components.contains(&store)
    }

    /// Returns `true` if a freshly created entity, which has no
    /// components, may match.
    #[must_use]
    pub fn matches_on_creation(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns `true` if the query reports changed entities.
    #[must_use]
    pub fn tracks_changes(&self) -> bool {
        !self.changed_components.is_empty()
    }

    /// The live index, including entities pending removal.
    #[must_use]
    pub fn matches(&self) -> &[Entity] {
        self.matches.dense()
    }

    /// Entities that started matching since the last drain.
    #[must_use]
    pub fn entered(&self) -> &[Entity] {
        self.entered.dense()
    }

    /// Entities that stopped matching since the last drain.
    #[must_use]
    pub fn exited(&self) -> &[Entity] {
        self.exited.dense()
    }

    /// Entities whose removal is waiting for the next commit.
    #[must_use]
    pub fn pending_removals(&self) -> &[Entity] {
        self.to_remove.dense()
    }

    /// Result of the most recent diff.
    #[must_use]
    pub fn changed(&self) -> &[Entity] {
        &self.changed
    }

    /// Tests `eid` against the compiled masks.
    #[must_use]
    pub fn check(&self, masks: &[Vec<u32>], eid: Entity) -> bool {
        self.generations.iter().all(|g| {
            let mask = masks
                .get(g.generation)
                .and_then(|row| row.get(eid as usize))
                .copied()
                .unwrap_or(0);
            mask & g.not_mask == 0 && mask & g.mask == g.mask
        })
    }

    /// Adds `eid` to the live index and reports it as entered.
    pub(crate) fn add_entity(&mut self, eid: Entity) {
        self.to_remove.remove(eid);
        self.entered.add(eid);
        self.matches.add(eid);
    }

    /// Schedules the removal of `eid`.
    ///
    /// Returns `true` if a removal was newly scheduled, in which case the
    /// query must be marked dirty.
    pub(crate) fn remove_entity(&mut self, eid: Entity) -> bool {
        if !self.matches.has(eid) || self.to_remove.has(eid) {
            return false;
        }
        self.to_remove.add(eid);
        self.exited.add(eid);
        true
    }

    /// Re-evaluates `eid` after one of its components changed.
    ///
    /// Returns `true` if a removal was newly scheduled.
    pub(crate) fn update(&mut self, masks: &[Vec<u32>], eid: Entity) -> bool {
        self.to_remove.remove(eid);
        if self.check(masks, eid) {
            self.exited.remove(eid);
            self.add_entity(eid);
            false
        } else {
            self.entered.remove(eid);
            self.remove_entity(eid)
        }
    }

    /// Drops every pending entity from the live index.
    pub(crate) fn commit_removals(&mut self) -> usize {
        let pending = self.to_remove.take();
        for &eid in pending.iter().rev() {
            self.matches.remove(eid);
        }
        pending.len()
    }

    /// Drains the entered set.
    pub(crate) fn take_entered(&mut self) -> Vec<Entity> {
        self.entered.take()
    }

    /// Drains the exited set.
    pub(crate) fn take_exited(&mut self) -> Vec<Entity> {
        self.exited.take()
    }

    /// Clears the changed list.
    pub(crate) fn reset_changed(&mut self) {
        self.changed.clear();
    }

    /// Compares every matching entity's tracked columns against their
    /// snapshots, refreshing the snapshot of each difference.
    ///
    /// Float elements compare by value: `-0.0` equals `0.0`, and a `NaN`
    /// differs from its snapshot on every call.
    ///
    /// Entities that differ are appended to the changed list, which is
    /// cleared first when `clear` is set.
    pub(crate) fn diff(&mut self, stores: &StoreRegistry, clear: bool) -> &[Entity] {
        if clear {
            self.changed.clear();
        }
        if self.matches.is_empty() {
            return &self.changed;
        }

        let columns: Vec<Option<(FieldType, &[u8], usize)>> = self
            .flat_props
            .iter()
            .map(|&(store, leaf, ty)| {
                let (bytes, stride) = stores.get(store).ok()?.leaf_bytes(leaf)?;
                Some((ty, bytes, stride))
            })
            .collect();

        for (shadow, column) in self.shadows.iter_mut().zip(&columns) {
            if let Some((_, bytes, _)) = column {
                let shadow = shadow.get_or_insert_with(|| bytes.to_vec());
                if shadow.len() < bytes.len() {
                    shadow.resize(bytes.len(), 0);
                }
            }
        }

        for &eid in self.matches.dense() {
            let mut dirty = false;
            for (shadow, column) in self.shadows.iter_mut().zip(&columns) {
                let (Some(shadow), Some((ty, bytes, stride))) = (shadow.as_mut(), column) else {
                    continue;
                };
                let start = eid as usize * stride;
                let range = start..start + stride;
                let (Some(current), Some(previous)) =
                    (bytes.get(range.clone()), shadow.get_mut(range))
                else {
                    continue;
                };
                if slot_changed(*ty, current, previous) {
                    previous.copy_from_slice(current);
                    dirty = true;
                }
            }
            if dirty {
                self.changed.push(eid);
            }
        }
        &self.changed
    }
}

/// Returns `true` if any element of an entity's slot differs from its
/// snapshot.
fn slot_changed(ty: FieldType, current: &[u8], previous: &[u8]) -> bool {
    match ty {
        FieldType::F32 => floats_differ::<f32>(current, previous),
        FieldType::F64 => floats_differ::<f64>(current, previous),
        _ => current != previous,
    }
}

fn floats_differ<T: bytemuck::Pod + PartialEq>(current: &[u8], previous: &[u8]) -> bool {
    let width = std::mem::size_of::<T>();
    current
        .chunks_exact(width)
        .zip(previous.chunks_exact(width))
        .any(|(now, before)| {
            bytemuck::pod_read_unaligned::<T>(now) != bytemuck::pod_read_unaligned::<T>(before)
        })
}

fn push_unique(list: &mut Vec<StoreId>, store: StoreId) {
    if !list.contains(&store) {
        list.push(store);
    }
}

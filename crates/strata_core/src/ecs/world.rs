//! # ECS World
//!
//! The isolation unit for entities. A world owns relationships only:
//! bitmask rows, the existence index, component records and query states.
//! Component data lives in the engine's stores.
//!
//! Worlds are created and mutated through [`Engine`](super::Engine); this
//! type exposes read-only introspection.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::config::validate_size;
use crate::error::{EcsError, EcsResult};
use crate::storage::{StoreId, StoreRegistry};
use crate::util::{bin, SparseSet};

use super::component::{next_bitflag, ComponentRecord};
use super::entity::{Entity, EntityAllocator};
use super::query::{QueryDescriptor, QueryId, QueryState};

/// Handle to a world created by an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorldId(u32);

impl WorldId {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Slot index in the engine's world table.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "world#{}", self.0)
    }
}

/// Entities of one world and their relationships to components and queries.
///
/// # Example
///
/// ```rust,ignore
/// let world = engine.create_world()?;
/// let eid = engine.add_entity(world)?;
/// assert!(engine.world(world)?.entity_exists(eid));
/// ```
#[derive(Debug)]
pub struct World {
    /// Handle of this world in its engine.
    id: WorldId,
    /// Entity capacity.
    size: usize,
    /// Bitmask rows, one `u32` per entity slot.
    masks: Vec<Vec<u32>>,
    /// Next bit to assign in the last row.
    bitflag: u32,
    /// Existence index.
    entities: SparseSet,
    /// Handle issuance and recycling.
    allocator: EntityAllocator,
    /// Components owned by each live entity, in insertion order.
    entity_components: HashMap<Entity, Vec<StoreId>>,
    /// Registered components.
    components: HashMap<StoreId, ComponentRecord>,
    /// Registered components, in registration order.
    component_order: Vec<StoreId>,
    /// Live query states.
    queries: BTreeMap<QueryId, QueryState>,
    /// Queries re-tested whenever an entity is created.
    creation_queries: BTreeSet<QueryId>,
    /// Queries with removals waiting for a commit.
    dirty_queries: BTreeSet<QueryId>,
}

impl World {
    /// Creates an empty world with room for `size` entities.
    pub(crate) fn new(id: WorldId, size: usize) -> EcsResult<Self> {
        validate_size(size)?;
        Ok(Self {
            id,
            size,
            masks: vec![vec![0; size]],
            bitflag: 1,
            entities: SparseSet::new(),
            allocator: EntityAllocator::new(),
            entity_components: HashMap::new(),
            components: HashMap::new(),
            component_order: Vec::new(),
            queries: BTreeMap::new(),
            creation_queries: BTreeSet::new(),
            dirty_queries: BTreeSet::new(),
        })
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Handle of this world.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> WorldId {
        self.id
    }

    /// Entity capacity.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Cursor value at which the engine grows every world.
    #[inline]
    #[must_use]
    pub const fn resize_threshold(&self) -> usize {
        self.size - self.size / 5
    }

    /// Number of bitmask rows.
    #[inline]
    #[must_use]
    pub fn generation_count(&self) -> usize {
        self.masks.len()
    }

    /// The bit the next registered component will receive.
    #[inline]
    #[must_use]
    pub const fn bitflag(&self) -> u32 {
        self.bitflag
    }

    /// The bitmask rows.
    #[must_use]
    pub fn masks(&self) -> &[Vec<u32>] {
        &self.masks
    }

    /// Live entities, in existence-index order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        self.entities.dense()
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if `eid` is live.
    #[must_use]
    pub fn entity_exists(&self, eid: Entity) -> bool {
        self.entities.has(eid)
    }

    /// Number of handles ever issued.
    #[must_use]
    pub const fn entity_cursor(&self) -> Entity {
        self.allocator.cursor()
    }

    /// Handles waiting for reuse: the manual backlog, then the queue.
    #[must_use]
    pub fn removed_entities(&self) -> Vec<Entity> {
        self.allocator.removed()
    }

    /// Returns `true` once manual recycling is enabled.
    #[must_use]
    pub const fn is_manual_recycling(&self) -> bool {
        self.allocator.is_manual()
    }

    /// Components owned by `eid`, in the order they were added.
    #[must_use]
    pub fn entity_components(&self, eid: Entity) -> Option<&[StoreId]> {
        self.entity_components.get(&eid).map(Vec::as_slice)
    }

    /// Registered components, in registration order.
    #[must_use]
    pub fn components(&self) -> &[StoreId] {
        &self.component_order
    }

    /// Metadata of a registered component.
    #[must_use]
    pub fn component(&self, store: StoreId) -> Option<&ComponentRecord> {
        self.components.get(&store)
    }

    /// Returns `true` if `eid` has the component. Unregistered components
    /// are never present.
    #[must_use]
    pub fn has_component(&self, store: StoreId, eid: Entity) -> bool {
        self.components.get(&store).is_some_and(|record| {
            self.masks
                .get(record.generation_id())
                .and_then(|row| row.get(eid as usize))
                .is_some_and(|&mask| record.is_set_in(mask))
        })
    }

    /// State of a registered query.
    #[must_use]
    pub fn query_state(&self, query: QueryId) -> Option<&QueryState> {
        self.queries.get(&query)
    }

    /// Queries with removals waiting for a commit.
    pub fn dirty_queries(&self) -> impl Iterator<Item = QueryId> + '_ {
        self.dirty_queries.iter().copied()
    }

    /// Renders every bitmask row of `eid` in binary.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if `eid` is not live.
    pub fn describe_masks(&self, eid: Entity) -> EcsResult<Vec<String>> {
        self.ensure_exists(eid)?;
        self.masks
            .iter()
            .map(|row| bin(i64::from(row.get(eid as usize).copied().unwrap_or(0))))
            .collect()
    }

    fn ensure_exists(&self, eid: Entity) -> EcsResult<()> {
        if self.entities.has(eid) {
            Ok(())
        } else {
            Err(EcsError::EntityNotFound {
                world: self.id,
                entity: eid,
            })
        }
    }

    // =========================================================================
    // Capacity
    // =========================================================================

    /// Grows every bitmask row to `size` slots. Shrinking is ignored.
    pub(crate) fn resize(&mut self, size: usize) {
        if size <= self.size {
            return;
        }
        for row in &mut self.masks {
            row.resize(size, 0);
        }
        tracing::debug!(world = %self.id, from = self.size, to = size, "world resized");
        self.size = size;
    }

    // =========================================================================
    // Entities
    // =========================================================================

    pub(crate) fn enable_manual_recycling(&mut self) {
        self.allocator.enable_manual_recycling();
    }

    pub(crate) fn flush_removed(&mut self) {
        self.allocator.flush();
    }

    /// Issues an entity and seeds it into every query it matches on creation.
    pub(crate) fn add_entity(&mut self, recycle_after: usize) -> EcsResult<Entity> {
        let eid = self.allocator.allocate(recycle_after, self.size)?;
        self.entities.add(eid);
        self.entity_components.insert(eid, Vec::new());

        for id in &self.creation_queries {
            if let Some(query) = self.queries.get_mut(id) {
                if query.check(&self.masks, eid) {
                    query.add_entity(eid);
                }
            }
        }
        Ok(eid)
    }

    /// Removes a live entity. Returns `false` if it was not live.
    pub(crate) fn remove_entity(&mut self, eid: Entity) -> bool {
        if !self.entities.has(eid) {
            return false;
        }

        for (id, query) in &mut self.queries {
            if query.remove_entity(eid) {
                self.dirty_queries.insert(*id);
            }
        }

        self.allocator.release(eid);
        self.entities.remove(eid);
        self.entity_components.remove(&eid);
        for row in &mut self.masks {
            if let Some(mask) = row.get_mut(eid as usize) {
                *mask = 0;
            }
        }
        true
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Binds `store` to this world. Registering twice is a no-op.
    pub(crate) fn register_component(&mut self, store: StoreId) {
        if self.components.contains_key(&store) {
            return;
        }

        let dependents = self
            .queries
            .iter()
            .filter(|(_, query)| query.references(store))
            .map(|(id, _)| *id)
            .collect();
        let generation_id = self.masks.len() - 1;
        tracing::trace!(
            world = %self.id,
            %store,
            generation = generation_id,
            bitflag = self.bitflag,
            "component registered"
        );
        self.components
            .insert(store, ComponentRecord::new(generation_id, self.bitflag, dependents));
        self.component_order.push(store);

        let (next, new_generation) = next_bitflag(self.bitflag);
        self.bitflag = next;
        if new_generation {
            self.masks.push(vec![0; self.size]);
            tracing::debug!(
                world = %self.id,
                generations = self.masks.len(),
                "generation row appended"
            );
        }
    }

    /// Sets the component bit of `eid`. Returns `false` if it was already set.
    pub(crate) fn add_component(&mut self, store: StoreId, eid: Entity) -> EcsResult<bool> {
        self.ensure_exists(eid)?;
        self.register_component(store);
        if self.has_component(store, eid) {
            return Ok(false);
        }
        let record = self
            .components
            .get(&store)
            .ok_or(EcsError::UnknownStore(store))?;

        self.masks[record.generation_id()][eid as usize] |= record.bitflag();
        reevaluate(
            &mut self.queries,
            &mut self.dirty_queries,
            &self.masks,
            record,
            eid,
        );
        self.entity_components.entry(eid).or_default().push(store);
        Ok(true)
    }

    /// Clears the component bit of `eid`. Returns `false` if it was not set.
    pub(crate) fn remove_component(&mut self, store: StoreId, eid: Entity) -> EcsResult<bool> {
        self.ensure_exists(eid)?;
        if !self.has_component(store, eid) {
            return Ok(false);
        }
        let record = self
            .components
            .get(&store)
            .ok_or(EcsError::UnknownStore(store))?;

        self.masks[record.generation_id()][eid as usize] &= !record.bitflag();
        reevaluate(
            &mut self.queries,
            &mut self.dirty_queries,
            &self.masks,
            record,
            eid,
        );
        if let Some(owned) = self.entity_components.get_mut(&eid) {
            owned.retain(|&owned| owned != store);
        }
        Ok(true)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Compiles and seeds `query` unless it is already live in this world.
    ///
    /// Components named by the query are registered first.
    pub(crate) fn register_query(
        &mut self,
        query: QueryId,
        descriptor: &QueryDescriptor,
        stores: &StoreRegistry,
    ) -> EcsResult<()> {
        if self.queries.contains_key(&query) {
            return Ok(());
        }
        for term in descriptor.terms() {
            let store = term.store();
            if !stores.contains(store) {
                return Err(EcsError::UnknownStore(store));
            }
            self.register_component(store);
        }

        let mut state = QueryState::compile(descriptor, &self.components, stores)?;
        for store in state.components().iter().chain(state.not_components()) {
            if let Some(record) = self.components.get_mut(store) {
                record.queries.insert(query);
            }
        }
        if state.matches_on_creation() {
            self.creation_queries.insert(query);
        }

        for eid in 0..self.allocator.cursor() {
            if self.entities.has(eid) && state.check(&self.masks, eid) {
                state.add_entity(eid);
            }
        }
        tracing::trace!(
            world = %self.id,
            %query,
            matched = state.matches().len(),
            "query registered"
        );
        self.queries.insert(query, state);
        Ok(())
    }

    pub(crate) fn query_state_mut(&mut self, query: QueryId) -> EcsResult<&mut QueryState> {
        self.queries
            .get_mut(&query)
            .ok_or(EcsError::UnknownQuery(query))
    }

    /// Commits every pending removal of every dirty query.
    pub(crate) fn commit_removals(&mut self) {
        if self.dirty_queries.is_empty() {
            return;
        }
        let mut committed = 0;
        for id in std::mem::take(&mut self.dirty_queries) {
            if let Some(query) = self.queries.get_mut(&id) {
                committed += query.commit_removals();
            }
        }
        tracing::trace!(world = %self.id, committed, "removals committed");
    }

    /// The result of a registered query: the changed list for change
    /// tracking queries, otherwise the live index.
    pub(crate) fn query_result(
        &mut self,
        query: QueryId,
        stores: &StoreRegistry,
        clear_diff: bool,
    ) -> EcsResult<&[Entity]> {
        let state = self.query_state_mut(query)?;
        if state.tracks_changes() {
            Ok(state.diff(stores, clear_diff))
        } else {
            Ok(state.matches())
        }
    }

    /// Drops a query's state and detaches it from every component.
    /// Returns `false` if it was not registered.
    pub(crate) fn remove_query(&mut self, query: QueryId) -> bool {
        if self.queries.remove(&query).is_none() {
            return false;
        }
        for record in self.components.values_mut() {
            record.queries.remove(&query);
        }
        self.creation_queries.remove(&query);
        self.dirty_queries.remove(&query);
        true
    }
}

/// Re-evaluates every query depending on `record` for `eid`.
fn reevaluate(
    queries: &mut BTreeMap<QueryId, QueryState>,
    dirty: &mut BTreeSet<QueryId>,
    masks: &[Vec<u32>],
    record: &ComponentRecord,
    eid: Entity,
) {
    for id in record.dependents() {
        if let Some(query) = queries.get_mut(&id) {
            if query.update(masks, eid) {
                dirty.insert(id);
            }
        }
    }
}

//! # Engine Context
//!
//! The [`Engine`] owns everything that is shared between worlds: the
//! configuration, the component stores and the query descriptor table.
//! Every operation takes the world it acts on as an explicit [`WorldId`].
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut engine = Engine::with_defaults();
//! let position = engine.define_component(&Schema::vector3(FieldType::F32))?;
//! let velocity = engine.define_component(&Schema::vector3(FieldType::F32))?;
//! let movement = engine.define_query([QueryTerm::With(position), QueryTerm::With(velocity)])?;
//!
//! let world = engine.create_world()?;
//! let eid = engine.add_entity(world)?;
//! engine.add_component(world, position, eid)?;
//! engine.add_component(world, velocity, eid)?;
//!
//! let (entities, stores) = engine.query_with_stores(world, movement)?;
//! let (pos, vel) = stores.get_pair_mut(position, velocity)?;
//! let [px, py, pz] = pos.scalars_mut::<f32, 3>(["x", "y", "z"])?;
//! let [vx, vy, vz] = vel.scalars::<f32, 3>(["x", "y", "z"])?;
//! for &eid in entities {
//!     let i = eid as usize;
//!     px[i] += vx[i];
//!     py[i] += vy[i];
//!     pz[i] += vz[i];
//! }
//! ```

use crate::config::{validate_size, validate_threshold, EngineConfig};
use crate::error::{EcsError, EcsResult};
use crate::storage::{Schema, Store, StoreId, StoreRegistry};

use super::entity::Entity;
use super::query::{QueryDescriptor, QueryId, QueryState, QueryTerm};
use super::world::{World, WorldId};

/// Explicit context for worlds, components and queries.
#[derive(Debug)]
pub struct Engine {
    /// Live configuration.
    config: EngineConfig,
    /// Configuration restored by [`reset`](Self::reset).
    initial_config: EngineConfig,
    /// Every store, tag or structured.
    stores: StoreRegistry,
    /// Structured stores resized along with the default size.
    components: Vec<StoreId>,
    /// Query definitions, indexed by [`QueryId`].
    queries: Vec<QueryDescriptor>,
    /// Worlds, indexed by [`WorldId`]. Deleted worlds leave a hole.
    worlds: Vec<Option<World>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Engine {
    /// Creates an engine with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: EngineConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::from_config(EngineConfig::default())
    }

    fn from_config(config: EngineConfig) -> Self {
        Self {
            initial_config: config.clone(),
            config,
            stores: StoreRegistry::new(),
            components: Vec::new(),
            queries: Vec::new(),
            worlds: Vec::new(),
        }
    }

    /// Drops every world, store and query and restores the configuration
    /// the engine was built with.
    pub fn reset(&mut self) {
        *self = Self::from_config(self.initial_config.clone());
        tracing::debug!("engine reset");
    }

    /// The live configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Capacity used for new worlds and components.
    #[must_use]
    pub const fn default_size(&self) -> usize {
        self.config.default_size
    }

    /// Sets the default capacity and grows every world and every structured
    /// component to it.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] for a zero or oversized size.
    pub fn set_default_size(&mut self, size: usize) -> EcsResult<()> {
        validate_size(size)?;
        tracing::debug!(from = self.config.default_size, to = size, "default size changed");
        self.config.default_size = size;
        for world in self.worlds.iter_mut().flatten() {
            world.resize(size);
        }
        for &store in &self.components {
            if let Ok(store) = self.stores.get_mut(store) {
                store.resize(size);
            }
        }
        Ok(())
    }

    /// Sets the fraction of the default size the removed queue must exceed
    /// before automatic recycling reuses handles.
    ///
    /// The limit is the same for every world, whatever its own size.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] unless `fraction` is in `[0, 1]`.
    pub fn set_removed_recycle_threshold(&mut self, fraction: f64) -> EcsResult<()> {
        validate_threshold(fraction)?;
        self.config.removed_recycle_threshold = fraction;
        Ok(())
    }

    /// Removed-queue length that must be exceeded before a handle is reused.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn recycle_after(&self) -> usize {
        (self.config.default_size as f64 * self.config.removed_recycle_threshold).round() as usize
    }

    // =========================================================================
    // Worlds
    // =========================================================================

    /// Creates a world sized to the default capacity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] if no more handles are available.
    pub fn create_world(&mut self) -> EcsResult<WorldId> {
        self.create_world_with_size(self.config.default_size)
    }

    /// Creates a world with room for `size` entities.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] for a zero or oversized size.
    pub fn create_world_with_size(&mut self, size: usize) -> EcsResult<WorldId> {
        let index = u32::try_from(self.worlds.len()).map_err(|_| EcsError::CapacityExceeded {
            capacity: self.worlds.len(),
        })?;
        let id = WorldId::new(index);
        self.worlds.push(Some(World::new(id, size)?));
        tracing::debug!(world = %id, size, "world created");
        Ok(id)
    }

    /// Borrows a world for introspection.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a deleted or foreign handle.
    pub fn world(&self, world: WorldId) -> EcsResult<&World> {
        self.worlds
            .get(world.index())
            .and_then(Option::as_ref)
            .ok_or(EcsError::UnknownWorld(world))
    }

    fn world_mut(&mut self, world: WorldId) -> EcsResult<&mut World> {
        self.worlds
            .get_mut(world.index())
            .and_then(Option::as_mut)
            .ok_or(EcsError::UnknownWorld(world))
    }

    /// Handles of every live world.
    pub fn worlds(&self) -> impl Iterator<Item = WorldId> + '_ {
        self.worlds.iter().flatten().map(World::id)
    }

    /// Removes every entity, component registration and query state of a
    /// world, resizing it to the default capacity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a deleted or foreign handle.
    pub fn reset_world(&mut self, world: WorldId) -> EcsResult<()> {
        self.reset_world_with_size(world, self.config.default_size)
    }

    /// Resets a world to an empty state with room for `size` entities.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a deleted or foreign handle,
    /// or [`EcsError::InvalidConfig`] for an invalid size.
    pub fn reset_world_with_size(&mut self, world: WorldId, size: usize) -> EcsResult<()> {
        let fresh = World::new(world, size)?;
        *self.world_mut(world)? = fresh;
        tracing::debug!(%world, size, "world reset");
        Ok(())
    }

    /// Deletes a world. Its handle becomes invalid.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a deleted or foreign handle.
    pub fn delete_world(&mut self, world: WorldId) -> EcsResult<()> {
        self.worlds
            .get_mut(world.index())
            .and_then(Option::take)
            .ok_or(EcsError::UnknownWorld(world))?;
        tracing::debug!(%world, "world deleted");
        Ok(())
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Adds an entity to a world.
    ///
    /// When the world's cursor has reached its resize threshold, every world
    /// and structured component is grown first, by half of the world's size
    /// rounded up to a multiple of 4.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a bad handle and
    /// [`EcsError::CapacityExceeded`] when no handle can be issued.
    pub fn add_entity(&mut self, world: WorldId) -> EcsResult<Entity> {
        let (cursor, threshold, size) = {
            let world = self.world(world)?;
            (
                world.entity_cursor() as usize,
                world.resize_threshold(),
                world.size(),
            )
        };
        if cursor >= threshold {
            let grown = size + size.div_ceil(8) * 4;
            tracing::warn!(%world, from = size, to = grown, "world reached its resize threshold");
            self.set_default_size(grown.max(self.config.default_size))?;
        }

        let recycle_after = self.recycle_after();
        self.world_mut(world)?.add_entity(recycle_after)
    }

    /// Removes an entity from a world. Removing an absent entity is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a bad handle.
    pub fn remove_entity(&mut self, world: WorldId, eid: Entity) -> EcsResult<()> {
        self.world_mut(world)?.remove_entity(eid);
        Ok(())
    }

    /// Returns `true` if `eid` is live in the world.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a bad handle.
    pub fn entity_exists(&self, world: WorldId, eid: Entity) -> EcsResult<bool> {
        Ok(self.world(world)?.entity_exists(eid))
    }

    /// Number of handles the world has ever issued.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a bad handle.
    pub fn entity_cursor(&self, world: WorldId) -> EcsResult<Entity> {
        Ok(self.world(world)?.entity_cursor())
    }

    /// Handles waiting for reuse: the manual backlog, then the queue.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a bad handle.
    pub fn removed_entities(&self, world: WorldId) -> EcsResult<Vec<Entity>> {
        Ok(self.world(world)?.removed_entities())
    }

    /// Stops automatic recycling in a world; removed handles wait for
    /// [`flush_removed_entities`](Self::flush_removed_entities).
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a bad handle.
    pub fn enable_manual_entity_recycling(&mut self, world: WorldId) -> EcsResult<()> {
        self.world_mut(world)?.enable_manual_recycling();
        Ok(())
    }

    /// Makes every removed handle of a world reusable, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a bad handle.
    pub fn flush_removed_entities(&mut self, world: WorldId) -> EcsResult<()> {
        self.world_mut(world)?.flush_removed();
        Ok(())
    }

    /// A copy of every live entity of a world.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a bad handle.
    pub fn all_entities(&self, world: WorldId) -> EcsResult<Vec<Entity>> {
        Ok(self.world(world)?.entities().to_vec())
    }

    /// Components owned by an entity, in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the entity is not live.
    pub fn entity_components(&self, world: WorldId, eid: Entity) -> EcsResult<&[StoreId]> {
        self.world(world)?
            .entity_components(eid)
            .ok_or(EcsError::EntityNotFound { world, entity: eid })
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Defines a component backed by a new store at the default capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema is malformed.
    pub fn define_component(&mut self, schema: &Schema) -> EcsResult<StoreId> {
        self.define_component_with_size(schema, self.config.default_size)
    }

    /// Defines a component backed by a new store of `size` entities.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema is malformed.
    pub fn define_component_with_size(&mut self, schema: &Schema, size: usize) -> EcsResult<StoreId> {
        let store = self.stores.create(schema, size)?;
        if !schema.is_tag() {
            self.components.push(store);
        }
        Ok(store)
    }

    /// Frees a component's store and hands it back. Worlds keep its bit,
    /// but it can no longer be added, removed or queried.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownStore`] if the store is unknown or freed.
    pub fn free_component(&mut self, store: StoreId) -> EcsResult<Store> {
        let freed = self.stores.free(store)?;
        self.components.retain(|&id| id != store);
        Ok(freed)
    }

    /// The store registry.
    #[must_use]
    pub const fn stores(&self) -> &StoreRegistry {
        &self.stores
    }

    /// The store registry, mutably.
    pub fn stores_mut(&mut self) -> &mut StoreRegistry {
        &mut self.stores
    }

    /// Borrows one store.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownStore`] if the store is unknown or freed.
    pub fn store(&self, store: StoreId) -> EcsResult<&Store> {
        self.stores.get(store)
    }

    /// Mutably borrows one store.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownStore`] if the store is unknown or freed.
    pub fn store_mut(&mut self, store: StoreId) -> EcsResult<&mut Store> {
        self.stores.get_mut(store)
    }

    /// Binds a component to a world. Registering twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownStore`] or [`EcsError::UnknownWorld`].
    pub fn register_component(&mut self, world: WorldId, store: StoreId) -> EcsResult<()> {
        if !self.stores.contains(store) {
            return Err(EcsError::UnknownStore(store));
        }
        self.world_mut(world)?.register_component(store);
        Ok(())
    }

    /// Binds several components to a world, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first unknown store.
    pub fn register_components(&mut self, world: WorldId, stores: &[StoreId]) -> EcsResult<()> {
        stores
            .iter()
            .try_for_each(|&store| self.register_component(world, store))
    }

    /// Components registered in a world, in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a bad handle.
    pub fn world_components(&self, world: WorldId) -> EcsResult<&[StoreId]> {
        Ok(self.world(world)?.components())
    }

    /// Returns `true` if the entity has the component.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a bad handle.
    pub fn has_component(&self, world: WorldId, store: StoreId, eid: Entity) -> EcsResult<bool> {
        Ok(self.world(world)?.has_component(store, eid))
    }

    /// Adds a component to an entity, keeping whatever data its slot holds.
    /// Adding a component the entity already has is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the entity is not live, or an
    /// unknown handle error.
    pub fn add_component(&mut self, world: WorldId, store: StoreId, eid: Entity) -> EcsResult<()> {
        self.add_component_with(world, store, eid, false)
    }

    /// Adds a component to an entity and zeroes its data slot.
    ///
    /// # Errors
    ///
    /// Same as [`add_component`](Self::add_component).
    pub fn add_component_zeroed(
        &mut self,
        world: WorldId,
        store: StoreId,
        eid: Entity,
    ) -> EcsResult<()> {
        self.add_component_with(world, store, eid, true)
    }

    fn add_component_with(
        &mut self,
        world: WorldId,
        store: StoreId,
        eid: Entity,
        reset: bool,
    ) -> EcsResult<()> {
        if !self.stores.contains(store) {
            return Err(EcsError::UnknownStore(store));
        }
        let added = self.world_mut(world)?.add_component(store, eid)?;
        if added && reset {
            self.stores.get_mut(store)?.reset_for(eid as usize);
        }
        Ok(())
    }

    /// Removes a component from an entity and zeroes its data slot.
    /// Removing a component the entity does not have is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the entity is not live, or an
    /// unknown handle error.
    pub fn remove_component(
        &mut self,
        world: WorldId,
        store: StoreId,
        eid: Entity,
    ) -> EcsResult<()> {
        self.remove_component_with(world, store, eid, true)
    }

    /// Removes a component from an entity, leaving its data slot untouched.
    ///
    /// # Errors
    ///
    /// Same as [`remove_component`](Self::remove_component).
    pub fn remove_component_keep_data(
        &mut self,
        world: WorldId,
        store: StoreId,
        eid: Entity,
    ) -> EcsResult<()> {
        self.remove_component_with(world, store, eid, false)
    }

    fn remove_component_with(
        &mut self,
        world: WorldId,
        store: StoreId,
        eid: Entity,
        reset: bool,
    ) -> EcsResult<()> {
        if !self.stores.contains(store) {
            return Err(EcsError::UnknownStore(store));
        }
        let removed = self.world_mut(world)?.remove_component(store, eid)?;
        if removed && reset {
            self.stores.get_mut(store)?.reset_for(eid as usize);
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Defines a query. An empty term list yields every entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownStore`] if a term names an unknown store.
    pub fn define_query(&mut self, terms: impl IntoIterator<Item = QueryTerm>) -> EcsResult<QueryId> {
        let descriptor = QueryDescriptor::new(terms);
        if let Some(term) = descriptor
            .terms()
            .iter()
            .find(|term| !self.stores.contains(term.store()))
        {
            return Err(EcsError::UnknownStore(term.store()));
        }
        let index = u32::try_from(self.queries.len()).map_err(|_| EcsError::CapacityExceeded {
            capacity: self.queries.len(),
        })?;
        self.queries.push(descriptor);
        Ok(QueryId::new(index))
    }

    /// The definition of a query.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownQuery`] for a foreign handle.
    pub fn query_descriptor(&self, query: QueryId) -> EcsResult<&QueryDescriptor> {
        self.queries
            .get(query.index())
            .ok_or(EcsError::UnknownQuery(query))
    }

    /// Runs a query: commits pending removals, then returns the live index,
    /// or for change tracking queries the entities changed since the last
    /// call.
    ///
    /// The result is read-only and reflects the world as of this call.
    ///
    /// # Errors
    ///
    /// Returns an unknown handle error.
    pub fn query(&mut self, world: WorldId, query: QueryId) -> EcsResult<&[Entity]> {
        self.query_with_options(world, query, true)
    }

    /// Like [`query`](Self::query); `clear_diff = false` appends to the
    /// previous changed list instead of replacing it.
    ///
    /// # Errors
    ///
    /// Returns an unknown handle error.
    pub fn query_with_options(
        &mut self,
        world: WorldId,
        query: QueryId,
        clear_diff: bool,
    ) -> EcsResult<&[Entity]> {
        run_query(
            &mut self.worlds,
            &self.queries,
            &self.stores,
            world,
            query,
            clear_diff,
        )
    }

    /// Runs a query and hands back the store registry alongside the result,
    /// so systems can write columns while iterating it.
    ///
    /// # Errors
    ///
    /// Returns an unknown handle error.
    pub fn query_with_stores(
        &mut self,
        world: WorldId,
        query: QueryId,
    ) -> EcsResult<(&[Entity], &mut StoreRegistry)> {
        let entities = run_query(
            &mut self.worlds,
            &self.queries,
            &self.stores,
            world,
            query,
            true,
        )?;
        Ok((entities, &mut self.stores))
    }

    /// Drains the entities that started matching since the last drain.
    ///
    /// # Errors
    ///
    /// Returns an unknown handle error.
    pub fn enter_query(&mut self, world: WorldId, query: QueryId) -> EcsResult<Vec<Entity>> {
        Ok(self.registered_query(world, query)?.take_entered())
    }

    /// Drains the entities that stopped matching since the last drain.
    ///
    /// # Errors
    ///
    /// Returns an unknown handle error.
    pub fn exit_query(&mut self, world: WorldId, query: QueryId) -> EcsResult<Vec<Entity>> {
        Ok(self.registered_query(world, query)?.take_exited())
    }

    fn registered_query(
        &mut self,
        world: WorldId,
        query: QueryId,
    ) -> EcsResult<&mut QueryState> {
        let descriptor = self
            .queries
            .get(query.index())
            .ok_or(EcsError::UnknownQuery(query))?;
        let world = self
            .worlds
            .get_mut(world.index())
            .and_then(Option::as_mut)
            .ok_or(EcsError::UnknownWorld(world))?;
        world.register_query(query, descriptor, &self.stores)?;
        world.query_state_mut(query)
    }

    /// Commits every pending query removal of a world.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownWorld`] for a bad handle.
    pub fn commit_removals(&mut self, world: WorldId) -> EcsResult<()> {
        self.world_mut(world)?.commit_removals();
        Ok(())
    }

    /// Clears the changed list of a query. A query never run in the world
    /// has nothing to clear.
    ///
    /// # Errors
    ///
    /// Returns an unknown handle error.
    pub fn reset_changed_query(&mut self, world: WorldId, query: QueryId) -> EcsResult<()> {
        self.query_descriptor(query)?;
        if let Ok(state) = self.world_mut(world)?.query_state_mut(query) {
            state.reset_changed();
        }
        Ok(())
    }

    /// Drops a query's state from a world. The query can still be run
    /// again, which re-registers and re-seeds it.
    ///
    /// # Errors
    ///
    /// Returns an unknown handle error.
    pub fn remove_query(&mut self, world: WorldId, query: QueryId) -> EcsResult<()> {
        self.query_descriptor(query)?;
        self.world_mut(world)?.remove_query(query);
        Ok(())
    }
}

/// Runs a query against one world, borrowing only the fields it needs so
/// the caller can hand out the store registry alongside the result.
fn run_query<'w>(
    worlds: &'w mut [Option<World>],
    descriptors: &[QueryDescriptor],
    stores: &StoreRegistry,
    world: WorldId,
    query: QueryId,
    clear_diff: bool,
) -> EcsResult<&'w [Entity]> {
    let descriptor = descriptors
        .get(query.index())
        .ok_or(EcsError::UnknownQuery(query))?;
    let world = worlds
        .get_mut(world.index())
        .and_then(Option::as_mut)
        .ok_or(EcsError::UnknownWorld(world))?;

    world.register_query(query, descriptor, stores)?;
    world.commit_removals();
    if descriptor.is_all_entities() {
        Ok(world.entities())
    } else {
        world.query_result(query, stores, clear_diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FieldType;

    #[test]
    fn test_engine_lifecycle() {
        let mut engine = Engine::with_defaults();
        let world = engine.create_world().unwrap();
        assert_eq!(engine.world(world).unwrap().size(), 100_000);

        engine.delete_world(world).unwrap();
        assert!(matches!(engine.world(world), Err(EcsError::UnknownWorld(_))));
        assert!(engine.delete_world(world).is_err());

        engine.set_default_size(10).unwrap();
        engine.reset();
        assert_eq!(engine.default_size(), 100_000);
        assert_eq!(engine.worlds().count(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            default_size: 0,
            ..EngineConfig::default()
        };
        assert!(Engine::new(config).is_err());
        assert!(Engine::with_defaults().set_removed_recycle_threshold(-0.5).is_err());
    }

    #[test]
    fn test_components_follow_default_size() {
        let mut engine = Engine::with_defaults();
        engine.set_default_size(16).unwrap();
        let position = engine.define_component(&Schema::vector3(FieldType::F32)).unwrap();
        let tag = engine.define_component(&Schema::tag()).unwrap();

        engine.set_default_size(64).unwrap();
        assert_eq!(engine.store(position).unwrap().size(), 64);
        assert_eq!(engine.store(tag).unwrap().size(), 16);
    }

    #[test]
    fn test_unknown_handles() {
        let mut engine = Engine::with_defaults();
        let world = engine.create_world_with_size(8).unwrap();
        let freed = engine.define_component(&Schema::tag()).unwrap();
        engine.free_component(freed).unwrap();

        let eid = engine.add_entity(world).unwrap();
        assert!(matches!(
            engine.add_component(world, freed, eid),
            Err(EcsError::UnknownStore(_))
        ));
        assert!(matches!(
            engine.define_query([QueryTerm::With(freed)]),
            Err(EcsError::UnknownStore(_))
        ));
        assert!(matches!(
            engine.query(world, QueryId::new(9)),
            Err(EcsError::UnknownQuery(_))
        ));
    }

    #[test]
    fn test_reset_world() {
        let mut engine = Engine::with_defaults();
        let world = engine.create_world_with_size(32).unwrap();
        let tag = engine.define_component(&Schema::tag()).unwrap();
        engine.enable_manual_entity_recycling(world).unwrap();
        let eid = engine.add_entity(world).unwrap();
        engine.add_component(world, tag, eid).unwrap();

        engine.reset_world_with_size(world, 64).unwrap();
        let reset = engine.world(world).unwrap();
        assert_eq!(reset.size(), 64);
        assert_eq!(reset.entity_count(), 0);
        assert_eq!(reset.entity_cursor(), 0);
        assert!(reset.components().is_empty());
        assert!(!reset.is_manual_recycling());
    }
}

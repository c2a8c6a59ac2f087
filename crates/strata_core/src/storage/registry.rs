//! # Store Registry
//!
//! Owns every store created through an engine. Stores are addressed by
//! [`StoreId`] and are independent of worlds: one store backs the same
//! component in every world that registers it.

use crate::error::{EcsError, EcsResult};

use super::schema::Schema;
use super::store::Store;

/// Handle to a store in a [`StoreRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreId(u32);

impl StoreId {
    /// Slot index of this store.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store#{}", self.0)
    }
}

/// Slot map of stores.
///
/// Freed slots are not reused, so a stale [`StoreId`] never aliases a
/// newer store.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    stores: Vec<Option<Store>>,
}

impl StoreRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { stores: Vec::new() }
    }

    /// Lays out a new store for `schema` sized for `size` entities.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema is invalid or the registry is full.
    pub fn create(&mut self, schema: &Schema, size: usize) -> EcsResult<StoreId> {
        let store = Store::new(schema, size)?;
        let id = u32::try_from(self.stores.len())
            .map(StoreId)
            .map_err(|_| EcsError::CapacityExceeded {
                capacity: self.stores.len(),
            })?;
        tracing::debug!(%id, size, tag = store.is_tag(), "store created");
        self.stores.push(Some(store));
        Ok(id)
    }

    /// Returns `true` if `id` names a live store.
    #[must_use]
    pub fn contains(&self, id: StoreId) -> bool {
        matches!(self.stores.get(id.index()), Some(Some(_)))
    }

    /// Borrows a store.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownStore`] if `id` was never created or has
    /// been freed.
    pub fn get(&self, id: StoreId) -> EcsResult<&Store> {
        self.stores
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(EcsError::UnknownStore(id))
    }

    /// Mutably borrows a store.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_mut(&mut self, id: StoreId) -> EcsResult<&mut Store> {
        self.stores
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(EcsError::UnknownStore(id))
    }

    /// Mutably borrows two distinct stores at once.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::AliasedStore`] if `a == b`, otherwise the same
    /// errors as [`get`](Self::get).
    pub fn get_pair_mut(&mut self, a: StoreId, b: StoreId) -> EcsResult<(&mut Store, &mut Store)> {
        if a == b {
            return Err(EcsError::AliasedStore(a));
        }
        self.get(a)?;
        self.get(b)?;

        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.stores.split_at_mut(high.index());
        let (Some(low_store), Some(high_store)) = (head[low.index()].as_mut(), tail[0].as_mut())
        else {
            return Err(EcsError::UnknownStore(a));
        };
        if a < b {
            Ok((low_store, high_store))
        } else {
            Ok((high_store, low_store))
        }
    }

    /// Removes a store and hands it back.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn free(&mut self, id: StoreId) -> EcsResult<Store> {
        let store = self
            .stores
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(EcsError::UnknownStore(id))?;
        tracing::debug!(%id, "store freed");
        Ok(store)
    }

    /// Grows every live store to `size` entities.
    pub fn resize_all(&mut self, size: usize) {
        for store in self.stores.iter_mut().flatten() {
            store.resize(size);
        }
    }

    /// Live stores with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (StoreId, &Store)> {
        self.stores
            .iter()
            .zip(0u32..)
            .filter_map(|(store, index)| store.as_ref().map(|store| (StoreId(index), store)))
    }

    /// Number of live stores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.iter().flatten().count()
    }

    /// Returns `true` if no store is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FieldType;

    #[test]
    fn test_create_and_free() {
        let mut registry = StoreRegistry::new();
        let a = registry.create(&Schema::vector3(FieldType::F32), 8).unwrap();
        let b = registry.create(&Schema::tag(), 8).unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        let freed = registry.free(a).unwrap();
        assert_eq!(freed.size(), 8);
        assert!(!registry.contains(a));
        assert!(matches!(registry.get(a), Err(EcsError::UnknownStore(id)) if id == a));
        assert!(registry.free(a).is_err());

        let c = registry.create(&Schema::tag(), 8).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_pair_mut() {
        let mut registry = StoreRegistry::new();
        let position = registry.create(&Schema::vector3(FieldType::F32), 4).unwrap();
        let velocity = registry.create(&Schema::vector3(FieldType::F32), 4).unwrap();
        registry.get_mut(velocity).unwrap().scalar_mut::<f32>("x").unwrap()[1] = 2.0;

        let (vel, pos) = registry.get_pair_mut(velocity, position).unwrap();
        pos.scalar_mut::<f32>("x").unwrap()[1] += vel.scalar::<f32>("x").unwrap()[1];
        assert_eq!(registry.get(position).unwrap().scalar::<f32>("x").unwrap()[1], 2.0);

        assert!(matches!(
            registry.get_pair_mut(position, position),
            Err(EcsError::AliasedStore(_))
        ));
    }

    #[test]
    fn test_resize_all() {
        let mut registry = StoreRegistry::new();
        let id = registry.create(&Schema::vector3(FieldType::I32), 4).unwrap();
        registry.resize_all(16);
        assert_eq!(registry.get(id).unwrap().size(), 16);
        assert_eq!(registry.get(id).unwrap().scalar::<i32>("z").unwrap().len(), 16);
    }
}

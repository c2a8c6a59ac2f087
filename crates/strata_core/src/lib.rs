//! # STRATA Core Engine
//!
//! Entity-component data engine with:
//! - Integer entity handles with threshold or flush driven recycling
//! - World-independent column stores, packing fixed-length arrays of one
//!   element type into a shared arena
//! - Live queries maintained incrementally on every component change, with
//!   entered, exited and changed views
//!
//! ## Architecture Rules
//!
//! 1. **Data-oriented design** - Component data lives in flat columns
//!    indexed by entity
//! 2. **Bitmask membership** - A world tracks component presence as one bit
//!    per entity, 31 components per generation row
//! 3. **Deferred removals** - Query removals are batched and committed on the
//!    next read
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_core::{Engine, FieldType, QueryTerm, Schema};
//!
//! let mut engine = Engine::with_defaults();
//! let position = engine.define_component(&Schema::vector3(FieldType::F32))?;
//! let moving = engine.define_query([QueryTerm::With(position)])?;
//!
//! let world = engine.create_world()?;
//! let eid = engine.add_entity(world)?;
//! engine.add_component(world, position, eid)?;
//! assert_eq!(engine.query(world, moving)?, &[eid]);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod memory;
pub mod storage;
pub mod util;

pub use config::EngineConfig;
pub use ecs::{
    ComponentRecord, Engine, Entity, EntityAllocator, QueryDescriptor, QueryId, QueryState,
    QueryTerm, World, WorldId,
};
pub use error::{EcsError, EcsResult};
pub use memory::{Arena, Buffer, Region};
pub use storage::{
    ArrayColumn, ArrayColumnMut, Element, FieldType, Leaf, LeafKind, Schema, Store, StoreId,
    StoreRegistry,
};
pub use util::{bin, SparseSet};

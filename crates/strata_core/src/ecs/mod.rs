//! # Entity Component System
//!
//! Worlds, entities, component bindings and incrementally maintained
//! queries.
//!
//! ## Design Philosophy
//!
//! - Entities are plain indices into columns and bitmask rows
//! - Component data lives in world-independent stores
//! - Component presence is one bit per entity in a world's bitmask rows
//! - Query results are live indices, updated on every component change and
//!   committed lazily on read

mod component;
mod engine;
mod entity;
mod query;
mod world;

pub use component::{next_bitflag, ComponentRecord, GENERATION_LIMIT};
pub use engine::Engine;
pub use entity::{Entity, EntityAllocator};
pub use query::{QueryDescriptor, QueryId, QueryState, QueryTerm};
pub use world::{World, WorldId};

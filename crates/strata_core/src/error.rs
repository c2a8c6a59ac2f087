//! # Engine Error Types
//!
//! All errors that can occur in the engine.
//!
//! Every variant signals a programmer error: a stale handle, an entity that
//! is not alive in the world, or a malformed schema. None of them are
//! retried internally.

use thiserror::Error;

use crate::ecs::{Entity, QueryId, WorldId};
use crate::storage::{FieldType, StoreId};

/// Errors that can occur in the engine.
#[derive(Error, Debug)]
pub enum EcsError {
    /// The world handle does not refer to a live world.
    #[error("unknown world: {0}")]
    UnknownWorld(WorldId),

    /// The store handle does not refer to a registered store.
    #[error("cannot use unknown or freed store {0}")]
    UnknownStore(StoreId),

    /// The query handle was never returned by `define_query`.
    #[error("unknown query: {0}")]
    UnknownQuery(QueryId),

    /// The entity is not present in the world's existence index.
    #[error("entity {entity} does not exist in {world}")]
    EntityNotFound {
        /// The world that was searched.
        world: WorldId,
        /// The missing entity handle.
        entity: Entity,
    },

    /// The world cannot issue another handle.
    #[error("max entities reached: capacity {capacity}")]
    CapacityExceeded {
        /// Current capacity of the world.
        capacity: usize,
    },

    /// An array field was declared without a usable length.
    #[error("array field `{field}` must declare a positive length")]
    MissingArrayLength {
        /// Dotted path of the field.
        field: String,
    },

    /// A field declared an element type the engine does not know.
    #[error("invalid component property type `{type_name}` for field `{field}`")]
    UnknownFieldType {
        /// Dotted path of the field.
        field: String,
        /// The offending type name.
        type_name: String,
    },

    /// A schema value is neither a type name, an array declaration nor a table.
    #[error("malformed schema at `{field}`: {reason}")]
    MalformedSchema {
        /// Dotted path of the field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// No leaf column exists at the given path.
    #[error("store has no field `{0}`")]
    UnknownField(String),

    /// A typed accessor was used on a field of another element type.
    #[error("field `{field}` holds {actual:?}, not {requested}")]
    TypeMismatch {
        /// Dotted path of the field.
        field: String,
        /// Declared element type of the field.
        actual: FieldType,
        /// Rust type name that was requested.
        requested: &'static str,
    },

    /// A scalar accessor was used on an array field, or the reverse.
    #[error("field `{field}` is not a {expected} field")]
    FieldKindMismatch {
        /// Dotted path of the field.
        field: String,
        /// The kind the accessor expected.
        expected: &'static str,
    },

    /// The same field was requested twice in one disjoint borrow.
    #[error("field `{0}` requested more than once")]
    AliasedField(String),

    /// The same store was requested twice in one disjoint borrow.
    #[error("{0} requested more than once")]
    AliasedStore(StoreId),

    /// Input to the bit-encoding helper is outside the safe integer range.
    #[error("value must be a safe integer, got {0}")]
    UnsafeInteger(i64),

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration or schema document failed to parse.
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A configuration or schema file could not be read.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type EcsResult<T> = Result<T, EcsError>;

//! # Storage
//!
//! Schemas, element types and the column stores that hold component data.
//!
//! Stores know nothing about worlds or entities beyond their index: an
//! entity id is simply a row in every column.

mod registry;
mod schema;
mod store;
mod types;

pub use registry::{StoreId, StoreRegistry};
pub use schema::Schema;
pub use store::{ArrayColumn, ArrayColumnMut, Leaf, LeafKind, Store};
pub use types::{Element, FieldType};

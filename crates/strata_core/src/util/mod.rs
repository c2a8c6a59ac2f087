//! # Utilities
//!
//! Small building blocks shared by the entity and query layers.

mod bits;
mod sparse_set;

pub use bits::{bin, MAX_SAFE_INTEGER};
pub use sparse_set::SparseSet;

//! # Memory Management
//!
//! Zeroed, aligned column buffers and the bump arena that packs
//! fixed-length array fields.
//!
//! ## Design Philosophy
//!
//! Columns are allocated once per store and only reallocated on an explicit
//! resize:
//! - Scalar fields own one [`Buffer`] each
//! - Array fields of one element type share one [`Arena`]

mod arena;
mod buffer;

pub use arena::{Arena, Region};
pub use buffer::Buffer;

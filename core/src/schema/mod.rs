// accrete/src/schema/mod.rs

//! Declares the shape of an accumulated state: per-field merge policies,
//! default factories, and cross-schema field reuse.

pub mod definition;
pub mod field;

// Re-export key types for easier access from other accrete modules (and lib.rs)
pub use definition::{FieldKey, Schema, SchemaBuilder};
pub use field::{AnyValue, DefaultFn, FieldSchema, MergeFn};

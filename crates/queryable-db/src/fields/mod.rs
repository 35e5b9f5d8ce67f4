//! Model field definitions.

pub mod types;

pub use types::{FieldDef, FieldType, OnDelete};

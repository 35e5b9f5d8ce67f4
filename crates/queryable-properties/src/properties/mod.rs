//! Property declaration styles.
//!
//! Two equivalent ways to declare a queryable property:
//!
//! - [`base`] - implement [`QueryableProperty`] on a dedicated type
//! - [`dynamic`] - assemble a [`DynamicProperty`] from closures

pub mod base;
pub mod dynamic;

pub use base::{QueryableProperty, SetterCacheBehavior};
pub use dynamic::DynamicProperty;

//! # queryable-properties
//!
//! Computed ("queryable") properties for the queryable ORM. A queryable
//! property is a property-like attribute on a model that can additionally be
//! used inside database queries — filtering, ordering and annotation — as if
//! it were a real column.
//!
//! Two equivalent declaration styles exist:
//!
//! - implement [`QueryableProperty`](properties::QueryableProperty) on a
//!   dedicated type and register it on the model;
//! - assemble a [`DynamicProperty`](properties::DynamicProperty) from
//!   closures with the builder API.
//!
//! Either way, a model opts in by implementing
//! [`QueryableModel`](model::QueryableModel) and routing its database access
//! through [`QueryablePropertiesManager`](managers::QueryablePropertiesManager).
//! The substrate's plain manager treats every name as a literal column; only
//! the specialized manager resolves property names during query
//! construction.
//!
//! ## Module Overview
//!
//! - [`properties`] - The property trait, builder, and setter cache behaviors
//! - [`model`] - [`QueryableModel`](model::QueryableModel), the instance
//!   cache, and property access helpers
//! - [`query`] - Property resolution against the query AST
//! - [`managers`] - The property-aware manager and queryset
//! - [`utils`] - Free-function helpers

#![allow(clippy::result_large_err)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::doc_markdown)]

pub mod managers;
pub mod model;
pub mod properties;
pub mod query;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use managers::{QueryablePropertiesManager, QueryablePropertiesQuerySet};
pub use model::{
    get_queryable_property, BoxedProperty, PropertyCache, QueryableModel,
    QueryablePropertyAccess,
};
pub use properties::{DynamicProperty, QueryableProperty, SetterCacheBehavior};
pub use query::{FilterParts, PropertyAnnotation, PropertyQuery};
pub use utils::reset_queryable_property;

//! # queryable
//!
//! Computed model properties that participate in database queries.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient
//! access. You can depend on `queryable` to get the whole stack, or depend
//! on individual crates for finer-grained control.
//!
//! A queryable property is declared once on a model and then behaves like a
//! real column inside querysets: it can be filtered on, ordered by, selected
//! as an annotation, aggregated over, and written through bulk updates.
//!
//! ```ignore
//! use queryable::properties::{QueryablePropertiesManager, QueryablePropertyAccess};
//!
//! let versions = QueryablePropertiesManager::<Version>::new();
//! let matches = versions
//!     .filter(Q::filter("version", Lookup::Exact("1.2.3".into())))
//!     .execute_query(&db)
//!     .await?;
//! ```

/// Core types, settings, logging, and error types.
pub use queryable_core as core;

/// ORM substrate: Model definitions, `QuerySet`, Manager, and expressions.
#[cfg(feature = "db")]
pub use queryable_db as db;

/// Queryable properties: declaration traits, the property-aware manager and
/// queryset, and instance-level cached access.
#[cfg(feature = "properties")]
pub use queryable_properties as properties;

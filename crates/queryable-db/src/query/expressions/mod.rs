//! Query expressions, aggregates, F-objects, subqueries and database functions.
//!
//! # Submodules
//!
//! - [`core`] - Expression types: F, Value, Func, Aggregate, Case/When, arithmetic
//! - [`subquery`] - Subquery, OuterRef, Exists expressions for correlated subqueries
//! - [`functions`] - Database function helpers (Coalesce, Concat, Upper, Cast, ...)

pub mod core;
pub mod functions;
pub mod subquery;

// Re-export the common types at the expressions level.
pub use self::core::{AggregateFunc, Expression, When};
pub use self::functions::*;
pub use self::subquery::{Exists, OuterRef, SubqueryExpression};

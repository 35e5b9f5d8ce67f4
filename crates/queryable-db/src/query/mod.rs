//! Query building, compilation, and execution.
//!
//! This module contains the complete query pipeline:
//!
//! - [`lookups`] - Q objects and lookup types for filtering
//! - [`expressions`] - F-objects, aggregates, and computed expressions
//! - [`compiler`] - Query AST and SQL compilation
//! - [`queryset`] - QuerySet and Manager for lazy query building

pub mod compiler;
pub mod expressions;
pub mod lookups;
pub mod queryset;

pub use compiler::{
    DatabaseBackendType, OrderBy, OrderTarget, Query, Row, SelectColumn, SqlCompiler, WhereNode,
};
pub use expressions::{AggregateFunc, Expression, When};
pub use lookups::{Lookup, Q};
pub use queryset::{Manager, QuerySet};

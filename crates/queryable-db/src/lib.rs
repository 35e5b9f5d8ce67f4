//! # queryable-db
//!
//! ORM substrate for the queryable framework. Provides the [`Model`](model::Model)
//! trait for defining database models, [`QuerySet`](query::QuerySet) for building and
//! executing database queries, [`Manager`](query::Manager) for model-level operations,
//! and expression types for constructing complex queries.
//!
//! ## Architecture
//!
//! The ORM is designed around lazy evaluation. A [`QuerySet`](query::QuerySet) builds
//! a [`Query`](query::Query) AST through method chaining without touching the database.
//! SQL is only generated when a terminal method (`.get_exec()`, `.count_exec()`,
//! `.first_exec()`, etc.) is called, at which point the
//! [`SqlCompiler`](query::SqlCompiler) translates the AST into parameterized SQL
//! appropriate for the target backend.
//!
//! The `queryable-properties` crate layers computed model properties on top of this
//! substrate: it resolves property names into the expressions and annotation entries
//! defined here, then reuses the same compilation and execution paths.
//!
//! ## Module Overview
//!
//! - [`model`] - The [`Model`](model::Model) trait and [`ModelMeta`](model::ModelMeta)
//! - [`fields`] - Field definitions ([`FieldDef`](fields::FieldDef)) and types
//! - [`value`] - The backend-agnostic [`Value`](value::Value) enum
//! - [`query`] - Query building, lookups, expressions, and compilation
//! - [`executor`] - The [`DbExecutor`](executor::DbExecutor) backend interface

// These clippy lints are intentionally allowed for the ORM crate:
// - struct_excessive_bools: FieldDef mirrors a field-option API which uses many booleans
// - too_many_lines: The SQL compiler methods are inherently large due to many match arms
// - result_large_err: QueryableError is the framework error type and should be used consistently
// - format_push_string: format! with push_str is clearer than write! for SQL generation
// - doc_markdown: backtick requirements for documentation items are too strict
// - return_self_not_must_use: builder pattern methods are self-documenting
// - use_self: explicit type names are clearer in some contexts
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::result_large_err)]
#![allow(clippy::format_push_string)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::use_self)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::match_same_arms)]

pub mod executor;
pub mod fields;
pub mod model;
pub mod query;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use executor::{delete_model, save_model, DbExecutor};
pub use fields::{FieldDef, FieldType, OnDelete};
pub use model::{Model, ModelMeta};
pub use query::expressions::{Exists, OuterRef, SubqueryExpression};
pub use query::{
    AggregateFunc, DatabaseBackendType, Expression, Lookup, Manager, OrderBy, OrderTarget, Query,
    QuerySet, Row, SelectColumn, SqlCompiler, When, WhereNode, Q,
};
pub use value::Value;

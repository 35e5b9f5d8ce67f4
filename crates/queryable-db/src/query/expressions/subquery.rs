//! Subquery, OuterRef and Exists expressions for correlated subqueries.
//!
//! These are the building blocks of computed property annotations that look
//! across tables: a property like "highest version of this application"
//! embeds a query on the versions table, correlated to the outer row through
//! an [`OuterRef`].
//!
//! # Examples
//!
//! ```
//! use queryable_db::query::expressions::subquery::{Exists, OuterRef, SubqueryExpression};
//! use queryable_db::query::compiler::Query;
//!
//! // A subquery selecting from the versions table
//! let inner = Query::new("app_version");
//! let subquery = SubqueryExpression::new(inner);
//!
//! // OuterRef references a column of the enclosing query
//! let outer_ref = OuterRef::new("id");
//!
//! // Exists wraps a subquery to produce a boolean
//! let exists = Exists::new(Query::new("app_version"));
//! ```

use super::core::Expression;
use crate::query::compiler::Query;

/// A subquery expression wrapping a [`Query`] for use inside another query.
///
/// Renders as `(SELECT ... FROM ... WHERE ...)`. Typically used in
/// annotations to fetch a scalar value from a correlated subquery.
#[derive(Debug, Clone)]
pub struct SubqueryExpression {
    /// The inner query that forms the subquery.
    query: Query,
}

impl SubqueryExpression {
    /// Creates a new subquery expression from a Query AST.
    pub fn new(query: Query) -> Self {
        Self { query }
    }

    /// Returns a reference to the inner query.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Converts this subquery into an [`Expression`] usable in annotations
    /// and other expression contexts.
    pub fn into_expression(self) -> Expression {
        Expression::Subquery(Box::new(self.query))
    }
}

/// A reference from inside a subquery to a column of the enclosing query.
///
/// The compiler resolves it to a qualified column of the outer query's
/// table, e.g. `"app_application"."id"` when the subquery is embedded in a
/// query over `app_application`. Compiled outside any subquery it falls
/// back to a plain column reference.
#[derive(Debug, Clone)]
pub struct OuterRef {
    /// The column name in the outer query.
    column: String,
}

impl OuterRef {
    /// Creates a new outer reference to the given column name.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    /// Returns the column name being referenced.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Converts this outer reference into an [`Expression`].
    pub fn into_expression(self) -> Expression {
        Expression::OuterRef(self.column)
    }
}

/// An EXISTS subquery expression checking whether any rows match.
///
/// Renders as `EXISTS (SELECT 1 FROM ... WHERE ...)`, or `NOT EXISTS`
/// when negated. Boolean properties like "does this application have any
/// versions" annotate with it.
///
/// # Examples
///
/// ```
/// use queryable_db::query::expressions::subquery::Exists;
/// use queryable_db::query::compiler::Query;
///
/// let expr = Exists::new(Query::new("app_version")).into_expression();
/// ```
#[derive(Debug, Clone)]
pub struct Exists {
    /// The inner query for the EXISTS check.
    query: Query,
    /// Whether to negate (NOT EXISTS).
    negated: bool,
}

impl Exists {
    /// Creates a new EXISTS expression from a Query AST.
    pub fn new(query: Query) -> Self {
        Self {
            query,
            negated: false,
        }
    }

    /// Negates this EXISTS to produce NOT EXISTS.
    #[must_use]
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Returns whether this is a negated (NOT EXISTS) expression.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Returns a reference to the inner query.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Converts this EXISTS into an [`Expression`].
    pub fn into_expression(self) -> Expression {
        Expression::Exists {
            query: Box::new(self.query),
            negated: self.negated,
        }
    }
}

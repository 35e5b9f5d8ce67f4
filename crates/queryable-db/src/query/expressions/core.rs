//! Query expressions, aggregates and F-objects.
//!
//! [`Expression`] trees feed `annotate()`, `aggregate()`, `order_by()` and
//! expression-backed WHERE/HAVING conditions. Queryable property annotations
//! are ordinary `Expression`s, so everything here composes with them.
//!
//! # Examples
//!
//! ```
//! use queryable_db::query::expressions::{AggregateFunc, Expression};
//!
//! // F("major") * 1000 + F("minor")
//! let expr = Expression::f("major") * Expression::value(1000) + Expression::f("minor");
//!
//! // COUNT("id")
//! let count = Expression::aggregate(AggregateFunc::Count, Expression::col("id"));
//! ```

use crate::query::compiler::Query;
use crate::query::lookups::Q;
use crate::value::Value;
use std::collections::HashMap;
use std::ops;

/// A query expression that produces a value in the context of a SQL query.
///
/// Expressions reference columns, literal values, functions, aggregates,
/// subqueries and arithmetic combinations of all of these.
#[derive(Debug, Clone)]
pub enum Expression {
    /// A column reference.
    Col(String),
    /// A literal value.
    Value(Value),
    /// An F-expression referencing another field (or queryable property).
    F(String),
    /// A database function call.
    Func {
        /// Function name (e.g., "COALESCE", "UPPER").
        name: String,
        /// Function arguments.
        args: Vec<Expression>,
    },
    /// An aggregate function.
    Aggregate {
        /// The aggregate operation.
        func: AggregateFunc,
        /// The expression being aggregated.
        field: Box<Expression>,
        /// Whether to apply DISTINCT.
        distinct: bool,
    },
    /// A CASE ... WHEN ... THEN ... ELSE ... END expression.
    Case {
        /// The WHEN/THEN branches.
        whens: Vec<When>,
        /// The ELSE value.
        default: Option<Box<Expression>>,
    },
    /// A scalar subquery expression.
    Subquery(Box<Query>),
    /// A reference from inside a subquery to the enclosing query's column.
    OuterRef(String),
    /// An EXISTS (or NOT EXISTS) subquery expression.
    Exists {
        /// The inner query for the EXISTS check.
        query: Box<Query>,
        /// Whether this is NOT EXISTS.
        negated: bool,
    },
    /// CAST(expr AS type) - type conversion.
    Cast {
        /// The expression to cast.
        expr: Box<Expression>,
        /// The target data type.
        data_type: String,
    },
    /// Raw SQL with parameters.
    RawSQL(String, Vec<Value>),
    /// Addition.
    Add(Box<Expression>, Box<Expression>),
    /// Subtraction.
    Sub(Box<Expression>, Box<Expression>),
    /// Multiplication.
    Mul(Box<Expression>, Box<Expression>),
    /// Division.
    Div(Box<Expression>, Box<Expression>),
}

/// Aggregate function types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    /// COUNT.
    Count,
    /// SUM.
    Sum,
    /// AVG.
    Avg,
    /// MIN.
    Min,
    /// MAX.
    Max,
}

impl AggregateFunc {
    /// Returns the SQL function name for this aggregate.
    pub const fn sql_name(&self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

/// A single WHEN/THEN branch in a CASE expression.
#[derive(Debug, Clone)]
pub struct When {
    /// The condition for this branch.
    pub condition: Q,
    /// The value to return when the condition is met.
    pub then: Expression,
}

impl Expression {
    /// Creates a column reference expression.
    pub fn col(name: impl Into<String>) -> Self {
        Self::Col(name.into())
    }

    /// Creates an F-expression referencing a field.
    pub fn f(name: impl Into<String>) -> Self {
        Self::F(name.into())
    }

    /// Creates a literal value expression.
    pub fn value(v: impl Into<Value>) -> Self {
        Self::Value(v.into())
    }

    /// Creates a function call expression.
    pub fn func(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::Func {
            name: name.into(),
            args,
        }
    }

    /// Creates an aggregate expression.
    pub fn aggregate(func: AggregateFunc, field: Expression) -> Self {
        Self::Aggregate {
            func,
            field: Box::new(field),
            distinct: false,
        }
    }

    /// Creates an aggregate with DISTINCT.
    pub fn aggregate_distinct(func: AggregateFunc, field: Expression) -> Self {
        Self::Aggregate {
            func,
            field: Box::new(field),
            distinct: true,
        }
    }

    /// Creates a CASE expression.
    pub fn case(whens: Vec<When>, default: Option<Expression>) -> Self {
        Self::Case {
            whens,
            default: default.map(Box::new),
        }
    }

    /// Creates a raw SQL expression with parameters.
    pub fn raw(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self::RawSQL(sql.into(), params)
    }

    /// Returns `true` when the expression aggregates rows of the query it
    /// appears in.
    ///
    /// Aggregates inside `Subquery`/`Exists` belong to the inner query and
    /// do not count; a scalar subquery is a plain value to the outer query.
    /// Conditions on aggregating annotations must go to HAVING, and their
    /// presence in the SELECT list forces a GROUP BY.
    pub fn contains_aggregate(&self) -> bool {
        match self {
            Self::Aggregate { .. } => true,
            Self::Col(_)
            | Self::Value(_)
            | Self::F(_)
            | Self::OuterRef(_)
            | Self::RawSQL(..)
            | Self::Subquery(_)
            | Self::Exists { .. } => false,
            Self::Func { args, .. } => args.iter().any(Self::contains_aggregate),
            Self::Case { whens, default } => {
                whens.iter().any(|w| w.then.contains_aggregate())
                    || default.as_deref().is_some_and(Self::contains_aggregate)
            }
            Self::Cast { expr, .. } => expr.contains_aggregate(),
            Self::Add(l, r) | Self::Sub(l, r) | Self::Mul(l, r) | Self::Div(l, r) => {
                l.contains_aggregate() || r.contains_aggregate()
            }
        }
    }

    /// Returns the names of all `F` references in this expression.
    ///
    /// `Subquery`/`Exists`/`OuterRef` resolve against their own scope and
    /// are not descended into. Property resolution uses this to find
    /// property references inside annotate/aggregate expressions.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_field_refs(&mut fields);
        fields
    }

    fn collect_field_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::F(name) => out.push(name),
            Self::Func { args, .. } => {
                for arg in args {
                    arg.collect_field_refs(out);
                }
            }
            Self::Aggregate { field, .. } => field.collect_field_refs(out),
            Self::Case { whens, default } => {
                for when in whens {
                    when.then.collect_field_refs(out);
                }
                if let Some(d) = default {
                    d.collect_field_refs(out);
                }
            }
            Self::Cast { expr, .. } => expr.collect_field_refs(out),
            Self::Add(l, r) | Self::Sub(l, r) | Self::Mul(l, r) | Self::Div(l, r) => {
                l.collect_field_refs(out);
                r.collect_field_refs(out);
            }
            Self::Col(_)
            | Self::Value(_)
            | Self::OuterRef(_)
            | Self::RawSQL(..)
            | Self::Subquery(_)
            | Self::Exists { .. } => {}
        }
    }

    /// Replaces `F(name)` references found in `map` with the mapped
    /// expression, leaving everything else untouched.
    ///
    /// This is how property references inside user expressions are inlined
    /// with the property's annotation.
    #[must_use]
    pub fn replace_field_refs(self, map: &HashMap<String, Expression>) -> Self {
        match self {
            Self::F(name) => map.get(&name).cloned().unwrap_or(Self::F(name)),
            Self::Func { name, args } => Self::Func {
                name,
                args: args
                    .into_iter()
                    .map(|a| a.replace_field_refs(map))
                    .collect(),
            },
            Self::Aggregate {
                func,
                field,
                distinct,
            } => Self::Aggregate {
                func,
                field: Box::new(field.replace_field_refs(map)),
                distinct,
            },
            Self::Case { whens, default } => Self::Case {
                whens: whens
                    .into_iter()
                    .map(|w| When {
                        condition: w.condition,
                        then: w.then.replace_field_refs(map),
                    })
                    .collect(),
                default: default.map(|d| Box::new(d.replace_field_refs(map))),
            },
            Self::Cast { expr, data_type } => Self::Cast {
                expr: Box::new(expr.replace_field_refs(map)),
                data_type,
            },
            Self::Add(l, r) => Self::Add(
                Box::new(l.replace_field_refs(map)),
                Box::new(r.replace_field_refs(map)),
            ),
            Self::Sub(l, r) => Self::Sub(
                Box::new(l.replace_field_refs(map)),
                Box::new(r.replace_field_refs(map)),
            ),
            Self::Mul(l, r) => Self::Mul(
                Box::new(l.replace_field_refs(map)),
                Box::new(r.replace_field_refs(map)),
            ),
            Self::Div(l, r) => Self::Div(
                Box::new(l.replace_field_refs(map)),
                Box::new(r.replace_field_refs(map)),
            ),
            other => other,
        }
    }
}

impl ops::Add for Expression {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::Add(Box::new(self), Box::new(rhs))
    }
}

impl ops::Sub for Expression {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::Sub(Box::new(self), Box::new(rhs))
    }
}

impl ops::Mul for Expression {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self::Mul(Box::new(self), Box::new(rhs))
    }
}

impl ops::Div for Expression {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        Self::Div(Box::new(self), Box::new(rhs))
    }
}

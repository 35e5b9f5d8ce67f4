//! Field lookups and composable Q filters.
//!
//! [`Lookup`] is a typed field comparison and [`Q`] combines comparisons
//! with AND, OR and NOT. Queryable property filters receive the `Lookup`
//! unchanged and return a `Q` tree of their own, so a single property name
//! can expand into conditions on several concrete columns.
//!
//! # Examples
//!
//! ```
//! use queryable_db::query::lookups::{Lookup, Q};
//! use queryable_db::value::Value;
//!
//! // major = 2 AND minor >= 1
//! let q = Q::filter("major", Lookup::Exact(Value::from(2)))
//!     & Q::filter("minor", Lookup::Gte(Value::from(1)));
//!
//! // name = "My cool app" OR name LIKE 'Another%'
//! let either = Q::filter("name", Lookup::Exact(Value::from("My cool app")))
//!     | Q::filter("name", Lookup::StartsWith("Another".to_string()));
//!
//! // NOT(patch = 0)
//! let negated = !Q::filter("patch", Lookup::Exact(Value::from(0)));
//! ```

use crate::value::Value;
use std::ops;

/// A field-level lookup operation.
///
/// Each variant produces the matching SQL WHERE fragment when compiled.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Exact match (`field = value`).
    Exact(Value),
    /// Case-insensitive exact match (`LOWER(field) = LOWER(value)`).
    IExact(Value),
    /// Substring match (`field LIKE '%value%'`).
    Contains(String),
    /// Case-insensitive substring match.
    IContains(String),
    /// Membership test (`field IN (values...)`).
    In(Vec<Value>),
    /// Greater than (`field > value`).
    Gt(Value),
    /// Greater than or equal (`field >= value`).
    Gte(Value),
    /// Less than (`field < value`).
    Lt(Value),
    /// Less than or equal (`field <= value`).
    Lte(Value),
    /// Starts with (`field LIKE 'value%'`).
    StartsWith(String),
    /// Ends with (`field LIKE '%value'`).
    EndsWith(String),
    /// Range test (`field BETWEEN low AND high`).
    Range(Value, Value),
    /// NULL test (`field IS NULL` or `field IS NOT NULL`).
    IsNull(bool),
}

impl Lookup {
    /// Returns the lookup's conventional name.
    ///
    /// Property filters use this in error messages when they reject a
    /// lookup they do not support.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Exact(_) => "exact",
            Self::IExact(_) => "iexact",
            Self::Contains(_) => "contains",
            Self::IContains(_) => "icontains",
            Self::In(_) => "in",
            Self::Gt(_) => "gt",
            Self::Gte(_) => "gte",
            Self::Lt(_) => "lt",
            Self::Lte(_) => "lte",
            Self::StartsWith(_) => "startswith",
            Self::EndsWith(_) => "endswith",
            Self::Range(_, _) => "range",
            Self::IsNull(_) => "isnull",
        }
    }
}

/// A composable query filter.
///
/// `Q` trees combine with `&` (AND), `|` (OR) and `!` (NOT) to build
/// arbitrarily nested WHERE clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum Q {
    /// A single field lookup.
    Filter {
        /// The field name; the segment before any `__` is what gets
        /// resolved against model fields and queryable properties.
        field: String,
        /// The lookup operation.
        lookup: Lookup,
    },
    /// Logical AND of multiple conditions.
    And(Vec<Q>),
    /// Logical OR of multiple conditions.
    Or(Vec<Q>),
    /// Logical negation of a condition.
    Not(Box<Q>),
}

impl Q {
    /// Creates a new filter Q object.
    pub fn filter(field: impl Into<String>, lookup: Lookup) -> Self {
        Self::Filter {
            field: field.into(),
            lookup,
        }
    }

    /// Returns `true` if this is an empty AND or OR (no conditions).
    pub fn is_empty(&self) -> bool {
        match self {
            Self::And(children) | Self::Or(children) => children.is_empty(),
            _ => false,
        }
    }
}

impl ops::BitAnd for Q {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            // Flatten nested ANDs
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), other) => {
                left.push(other);
                Self::And(left)
            }
            (other, Self::And(mut right)) => {
                right.insert(0, other);
                Self::And(right)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }
}

impl ops::BitOr for Q {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            // Flatten nested ORs
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), other) => {
                left.push(other);
                Self::Or(left)
            }
            (other, Self::Or(mut right)) => {
                right.insert(0, other);
                Self::Or(right)
            }
            (left, right) => Self::Or(vec![left, right]),
        }
    }
}

impl ops::Not for Q {
    type Output = Self;

    fn not(self) -> Self::Output {
        // Double negation cancellation
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}

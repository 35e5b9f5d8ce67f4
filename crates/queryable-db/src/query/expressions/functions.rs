//! Builder helpers for common SQL functions.
//!
//! Each helper returns an [`Expression`] ready for annotations, filters and
//! ordering. The set is intentionally small: string assembly and type
//! conversion cover what computed properties typically annotate with.
//!
//! # Examples
//!
//! ```
//! use queryable_db::query::expressions::functions::*;
//! use queryable_db::query::expressions::core::Expression;
//!
//! // CONCAT(CAST(major AS TEXT), '.', CAST(minor AS TEXT))
//! let dotted = concat(vec![
//!     cast(Expression::col("major"), "TEXT"),
//!     Expression::value("."),
//!     cast(Expression::col("minor"), "TEXT"),
//! ]);
//! ```

use super::core::Expression;

// ═══════════════════════════════════════════════════════════════════════════
// Comparison Functions
// ═══════════════════════════════════════════════════════════════════════════

/// COALESCE(expr1, expr2, ...) - returns the first non-NULL argument.
pub fn coalesce(args: Vec<Expression>) -> Expression {
    Expression::Func {
        name: "COALESCE".to_string(),
        args,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Text Functions
// ═══════════════════════════════════════════════════════════════════════════

/// CONCAT(expr1, expr2, ...) - concatenates strings.
pub fn concat(args: Vec<Expression>) -> Expression {
    Expression::Func {
        name: "CONCAT".to_string(),
        args,
    }
}

/// CONCAT(expr1, expr2) - concatenates exactly two expressions.
pub fn concat_pair(left: Expression, right: Expression) -> Expression {
    Expression::Func {
        name: "CONCAT".to_string(),
        args: vec![left, right],
    }
}

/// LENGTH(str) - returns the length of a string.
pub fn length(expr: Expression) -> Expression {
    Expression::Func {
        name: "LENGTH".to_string(),
        args: vec![expr],
    }
}

/// LOWER(str) - converts to lowercase.
pub fn lower(expr: Expression) -> Expression {
    Expression::Func {
        name: "LOWER".to_string(),
        args: vec![expr],
    }
}

/// UPPER(str) - converts to uppercase.
pub fn upper(expr: Expression) -> Expression {
    Expression::Func {
        name: "UPPER".to_string(),
        args: vec![expr],
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Type Conversion Functions
// ═══════════════════════════════════════════════════════════════════════════

/// CAST(expr AS type) - converts an expression to a different data type.
pub fn cast(expr: Expression, data_type: impl Into<String>) -> Expression {
    Expression::Cast {
        expr: Box::new(expr),
        data_type: data_type.into(),
    }
}

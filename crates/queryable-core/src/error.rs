//! Core error types for the queryable workspace.
//!
//! This module provides the error enum [`QueryableError`] shared by the
//! database substrate and the queryable-property layer, covering ORM errors,
//! property resolution errors, configuration errors, and IO errors.

use thiserror::Error;

/// The primary error type for the queryable workspace.
///
/// Property-related variants carry fully formatted messages naming the
/// offending property, so callers (and tests) can match on the text.
#[derive(Error, Debug)]
pub enum QueryableError {
    // ── Queryable properties ─────────────────────────────────────────

    /// A queryable property was used in a way it does not implement
    /// (filtering, annotating, or updating without the matching hook,
    /// or with conflicting update values).
    #[error("Queryable property error: {0}")]
    Property(String),

    /// A property name was looked up on a model that does not declare it.
    #[error("Queryable property does not exist: {0}")]
    PropertyDoesNotExist(String),

    // ── ORM errors ───────────────────────────────────────────────────

    /// A name could not be resolved into a model field, an annotation, or
    /// a queryable property.
    #[error("Field error: {0}")]
    FieldError(String),

    /// Raised when a query expected exactly one result but found none.
    #[error("Object does not exist: {0}")]
    DoesNotExist(String),

    /// Raised when a query expected exactly one result but found multiple.
    #[error("Multiple objects returned when one expected: {0}")]
    MultipleObjectsReturned(String),

    /// A generic database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A database integrity constraint was violated.
    #[error("Integrity error: {0}")]
    IntegrityError(String),

    /// An operational database error (connection failure, a query the
    /// backend cannot express, etc.).
    #[error("Operational error: {0}")]
    OperationalError(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A convenience type alias for `Result<T, QueryableError>`.
pub type QueryableResult<T> = Result<T, QueryableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_error_display() {
        let err = QueryableError::Property(
            "Queryable property \"version\" is supposed to be used as a filter \
             but does not implement filtering."
                .to_string(),
        );
        assert!(err.to_string().starts_with("Queryable property error:"));
        assert!(err.to_string().contains("\"version\""));
    }

    #[test]
    fn test_property_does_not_exist_display() {
        let err = QueryableError::PropertyDoesNotExist(
            "Application has no queryable property named 'nope'".to_string(),
        );
        assert!(err.to_string().contains("has no queryable property named 'nope'"));
    }

    #[test]
    fn test_field_error_display() {
        let err = QueryableError::FieldError("Cannot resolve keyword 'nam' into field".to_string());
        assert_eq!(
            err.to_string(),
            "Field error: Cannot resolve keyword 'nam' into field"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: QueryableError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }
}

//! # queryable-core
//!
//! Error types, settings, and logging for the queryable workspace. This crate
//! has no dependency on the rest of the workspace and provides the foundation
//! the database and property layers build on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result alias
//! - [`settings`] - Settings and global configuration
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;

// Re-export the most commonly used types at the crate root.
pub use error::{QueryableError, QueryableResult};
pub use settings::{Settings, SETTINGS};

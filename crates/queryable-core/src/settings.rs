//! Settings system for the queryable workspace.
//!
//! This module provides the [`Settings`] struct, which holds workspace
//! configuration, and [`LazySettings`], a globally-accessible, lazily
//! initialized settings instance. Settings can be built in code, loaded from
//! a TOML file, or overridden from environment variables.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{QueryableError, QueryableResult};

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// The database engine (e.g. `postgresql`, `sqlite3`, `mysql`).
    /// Executor implementations interpret this string.
    pub engine: String,
    /// The database name (or file path for `SQLite`).
    pub name: String,
    /// The database user.
    pub user: String,
    /// The database password.
    pub password: String,
    /// The database host.
    pub host: String,
    /// The database port.
    pub port: u16,
    /// Additional engine-specific options.
    pub options: HashMap<String, String>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            engine: "sqlite3".to_string(),
            name: "db.sqlite3".to_string(),
            user: String::new(),
            password: String::new(),
            host: String::new(),
            port: 0,
            options: HashMap::new(),
        }
    }
}

/// The complete set of workspace settings.
///
/// Use [`SETTINGS`] to access the global instance.
///
/// # Examples
///
/// ```
/// use queryable_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.log_level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled. Controls the logging format.
    pub debug: bool,

    // ── Database ─────────────────────────────────────────────────────

    /// Database configurations, keyed by alias (e.g. "default").
    pub databases: HashMap<String, DatabaseSettings>,

    // ── Time ─────────────────────────────────────────────────────────

    /// The default time zone (e.g. "UTC").
    pub time_zone: String,
    /// Whether to use timezone-aware datetimes.
    pub use_tz: bool,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut databases = HashMap::new();
        databases.insert("default".to_string(), DatabaseSettings::default());

        Self {
            debug: true,
            databases,
            time_zone: "UTC".to_string(),
            use_tz: true,
            log_level: "info".to_string(),
            extra: HashMap::new(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML string.
    ///
    /// Fields not present in the TOML keep their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or cannot be deserialized.
    pub fn from_toml_str(toml_str: &str) -> QueryableResult<Self> {
        // Deserialize the TOML into a serde_json::Value and merge it over the
        // defaults, so partial configuration files keep default values.
        let toml_value: toml::Value = toml::from_str(toml_str).map_err(|e| {
            QueryableError::ConfigurationError(format!("Failed to parse TOML: {e}"))
        })?;

        let json_value = toml_to_json(toml_value);
        let default_json = serde_json::to_value(Self::default()).map_err(|e| {
            QueryableError::ConfigurationError(format!(
                "Failed to serialize default settings: {e}"
            ))
        })?;

        let merged = merge_json(default_json, json_value);
        serde_json::from_value(merged).map_err(|e| {
            QueryableError::ConfigurationError(format!(
                "Failed to deserialize settings from TOML: {e}"
            ))
        })
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> QueryableResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            QueryableError::ConfigurationError(format!(
                "Failed to read TOML file '{}': {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads settings from environment variables (starting from defaults).
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env_overrides();
        settings
    }

    /// Applies environment variable overrides to this settings struct.
    ///
    /// Supported environment variables:
    ///
    /// - `QUERYABLE_DEBUG` -> `debug` ("true"/"1"/"yes" => true, anything else => false)
    /// - `QUERYABLE_LOG_LEVEL` -> `log_level`
    /// - `QUERYABLE_TIME_ZONE` -> `time_zone`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("QUERYABLE_DEBUG") {
            self.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
        }

        if let Ok(val) = std::env::var("QUERYABLE_LOG_LEVEL") {
            self.log_level = val;
        }

        if let Ok(val) = std::env::var("QUERYABLE_TIME_ZONE") {
            self.time_zone = val;
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) to access them.
///
/// # Panics
///
/// [`get`](LazySettings::get) panics if settings have not been configured.
/// [`configure`](LazySettings::configure) panics if called more than once.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
///
/// Call `SETTINGS.configure(settings)` once at application startup, then
/// access settings via `SETTINGS.get()` anywhere in the workspace.
pub static SETTINGS: LazySettings = LazySettings::new();

// ============================================================
// Helpers
// ============================================================

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

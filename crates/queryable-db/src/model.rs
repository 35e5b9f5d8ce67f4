//! Model trait and metadata.
//!
//! [`Model`] is the contract every mapped struct implements: static metadata,
//! primary key access, field extraction for INSERT/UPDATE, and construction
//! from a fetched [`Row`]. [`ModelMeta`] is the static description of the
//! table behind the struct.

use crate::fields::FieldDef;
use crate::query::compiler::OrderBy;
use crate::value::Value;
use queryable_core::QueryableError;

/// A database row abstraction used for constructing model instances.
pub use crate::query::compiler::Row;

/// The contract for all mapped model types.
///
/// Implemented manually on each struct that represents a table.
///
/// # Examples
///
/// ```
/// use queryable_db::model::{Model, ModelMeta, Row};
/// use queryable_db::fields::{FieldDef, FieldType};
/// use queryable_db::value::Value;
/// use queryable_core::QueryableError;
///
/// struct Application {
///     id: i64,
///     name: String,
/// }
///
/// impl Model for Application {
///     fn meta() -> &'static ModelMeta {
///         use std::sync::LazyLock;
///         static META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
///             app_label: "app",
///             model_name: "application",
///             db_table: "app_application".to_string(),
///             verbose_name: "application".to_string(),
///             verbose_name_plural: "applications".to_string(),
///             ordering: vec![],
///             abstract_model: false,
///             fields: vec![
///                 FieldDef::new("id", FieldType::BigAutoField).primary_key(),
///                 FieldDef::new("name", FieldType::CharField).max_length(255),
///             ],
///         });
///         &META
///     }
///
///     fn table_name() -> &'static str { "app_application" }
///     fn app_label() -> &'static str { "app" }
///
///     fn pk(&self) -> Option<Value> {
///         (self.id != 0).then(|| Value::Int(self.id))
///     }
///     fn set_pk(&mut self, value: Value) {
///         if let Value::Int(id) = value { self.id = id; }
///     }
///     fn field_values(&self) -> Vec<(&'static str, Value)> {
///         vec![("id", Value::Int(self.id)), ("name", Value::String(self.name.clone()))]
///     }
///     fn from_row(row: &Row) -> Result<Self, QueryableError> {
///         Ok(Application {
///             id: row.get::<i64>("id")?,
///             name: row.get::<String>("name")?,
///         })
///     }
/// }
/// ```
pub trait Model: Send + Sync + 'static {
    /// Returns the static metadata for this model type.
    fn meta() -> &'static ModelMeta;

    /// Returns the database table name.
    fn table_name() -> &'static str;

    /// Returns the application label this model belongs to.
    fn app_label() -> &'static str;

    /// Returns the primary key value, or `None` if unsaved.
    fn pk(&self) -> Option<Value>;

    /// Sets the primary key value on this instance (used after INSERT).
    fn set_pk(&mut self, value: Value);

    /// Returns the name of the primary key field (e.g., "id").
    fn pk_field_name() -> &'static str {
        "id"
    }

    /// Returns all field name-value pairs for this instance.
    fn field_values(&self) -> Vec<(&'static str, Value)>;

    /// Returns field name-value pairs excluding the primary key.
    /// Used for INSERT operations where the PK is auto-generated.
    fn non_pk_field_values(&self) -> Vec<(&'static str, Value)> {
        let pk_name = Self::pk_field_name();
        self.field_values()
            .into_iter()
            .filter(|(name, _)| *name != pk_name)
            .collect()
    }

    /// Constructs a model instance from a database row.
    ///
    /// Implementations read only their own columns; rows may carry extra
    /// columns such as annotation aliases.
    fn from_row(row: &Row) -> Result<Self, QueryableError>
    where
        Self: Sized;
}

/// Static metadata about a model.
pub struct ModelMeta {
    /// The application label (e.g., "app", "store").
    pub app_label: &'static str,
    /// The model name in lowercase (e.g., "application", "version").
    pub model_name: &'static str,
    /// The database table name.
    pub db_table: String,
    /// Human-readable singular name.
    pub verbose_name: String,
    /// Human-readable plural name.
    pub verbose_name_plural: String,
    /// Default ordering for queries.
    pub ordering: Vec<OrderBy>,
    /// Whether this is an abstract model (no table created).
    pub abstract_model: bool,
    /// Field definitions for this model.
    pub fields: Vec<FieldDef>,
}

impl ModelMeta {
    /// Returns `true` when a concrete field with this attribute name exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Returns the concrete column names, primary key first.
    ///
    /// This is the column list used for GROUP BY when an aggregate
    /// annotation joins a query.
    pub fn column_names(&self) -> Vec<&str> {
        let mut cols: Vec<&str> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.primary_key {
                cols.insert(0, field.column.as_str());
            } else {
                cols.push(field.column.as_str());
            }
        }
        cols
    }
}

//! Field type definitions for model metadata.
//!
//! [`FieldType`] enumerates the supported column types and [`FieldDef`]
//! captures the per-field metadata a model declares. Property resolution
//! leans on these definitions to decide whether a filtered or ordered name
//! is a concrete column.

use crate::value::Value;

/// The type of a model field, determining its SQL column type.
///
/// Relational access across tables is out of scope for this crate, but
/// `ForeignKey` is kept so models can declare the column and its ON DELETE
/// behavior.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum FieldType {
    /// Auto-incrementing 32-bit integer primary key.
    AutoField,
    /// Auto-incrementing 64-bit integer primary key.
    BigAutoField,
    /// Variable-length string with a max length.
    CharField,
    /// Unlimited-length text.
    TextField,
    /// 32-bit signed integer.
    IntegerField,
    /// 64-bit signed integer.
    BigIntegerField,
    /// 16-bit signed integer.
    SmallIntegerField,
    /// 64-bit floating-point number.
    FloatField,
    /// Fixed-precision decimal number.
    DecimalField {
        /// Maximum total digits.
        max_digits: u32,
        /// Digits after the decimal point.
        decimal_places: u32,
    },
    /// Boolean (true/false).
    BooleanField,
    /// Date without time.
    DateField,
    /// Date and time.
    DateTimeField,
    /// UUID field.
    UuidField,
    /// JSON data.
    JsonField,
    /// Many-to-one relationship, stored as a plain FK column.
    ForeignKey {
        /// The target model name (e.g. "app.Application").
        to: String,
        /// Behavior when the referenced object is deleted.
        on_delete: OnDelete,
        /// The name used for the reverse relation.
        related_name: Option<String>,
    },
}

/// Behavior when a referenced object is deleted (ON DELETE action).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OnDelete {
    /// Delete all related objects (CASCADE).
    Cascade,
    /// Prevent deletion if related objects exist (PROTECT).
    Protect,
    /// Set the foreign key to NULL.
    SetNull,
    /// Set the foreign key to its default value.
    SetDefault,
    /// Take no action (may cause integrity errors).
    DoNothing,
}

/// Complete definition of a model field.
///
/// Constructed with [`FieldDef::new`] plus builder methods, usually inside a
/// model's [`meta()`](crate::model::Model::meta) implementation.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// The attribute name of this field.
    pub name: &'static str,
    /// The database column name (may differ from `name`).
    pub column: String,
    /// The type of this field.
    pub field_type: FieldType,
    /// Whether this field is the primary key.
    pub primary_key: bool,
    /// Whether NULL is allowed in the database.
    pub null: bool,
    /// Default value for new instances.
    pub default: Option<Value>,
    /// Whether a UNIQUE constraint is applied.
    pub unique: bool,
    /// Whether a database index should be created.
    pub db_index: bool,
    /// Maximum character length (for CharField and similar).
    pub max_length: Option<usize>,
    /// Human-readable help text.
    pub help_text: String,
    /// Human-readable name for the field.
    pub verbose_name: String,
}

impl FieldDef {
    /// Creates a new `FieldDef` with sensible defaults.
    ///
    /// Only the field name and type are required. All other attributes take
    /// their default values (non-null, no index, no default).
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            column: name.to_string(),
            field_type,
            primary_key: false,
            null: false,
            default: None,
            unique: false,
            db_index: false,
            max_length: None,
            help_text: String::new(),
            verbose_name: name.replace('_', " "),
        }
    }

    /// Sets the database column name.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Marks this field as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Allows NULL values in the database.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    /// Sets the maximum character length.
    #[must_use]
    pub const fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Marks this field as having a database index.
    #[must_use]
    pub const fn db_index(mut self) -> Self {
        self.db_index = true;
        self
    }

    /// Marks this field as having a UNIQUE constraint.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the default value for this field.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the verbose (human-readable) name.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = name.into();
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    /// Returns `true` if this field represents a relational field.
    pub const fn is_relation(&self) -> bool {
        matches!(self.field_type, FieldType::ForeignKey { .. })
    }
}

impl FieldType {
    /// Returns the SQL column type for the given field type on PostgreSQL.
    pub fn pg_column_type(&self) -> String {
        match self {
            Self::AutoField => "SERIAL".to_string(),
            Self::BigAutoField => "BIGSERIAL".to_string(),
            Self::CharField => "VARCHAR".to_string(),
            Self::TextField => "TEXT".to_string(),
            Self::IntegerField => "INTEGER".to_string(),
            Self::BigIntegerField => "BIGINT".to_string(),
            Self::SmallIntegerField => "SMALLINT".to_string(),
            Self::FloatField => "DOUBLE PRECISION".to_string(),
            Self::DecimalField {
                max_digits,
                decimal_places,
            } => format!("NUMERIC({max_digits}, {decimal_places})"),
            Self::BooleanField => "BOOLEAN".to_string(),
            Self::DateField => "DATE".to_string(),
            Self::DateTimeField => "TIMESTAMP".to_string(),
            Self::UuidField => "UUID".to_string(),
            Self::JsonField => "JSONB".to_string(),
            Self::ForeignKey { .. } => "INTEGER".to_string(),
        }
    }
}

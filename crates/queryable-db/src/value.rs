//! Backend-agnostic database values.
//!
//! [`Value`] is the single currency for field contents, bind parameters and
//! row cells across the crate. Queryable properties also traffic in `Value`:
//! property getters, setters and update expansions all produce or consume it.

use std::fmt;

/// A database value independent of any concrete backend.
///
/// Every query parameter and every cell of a fetched [`Row`](crate::query::Row)
/// is a `Value`. Conversions from the common Rust types are provided so call
/// sites can write `Value::from(42)` or rely on `Into<Value>` bounds.
///
/// # Examples
///
/// ```
/// use queryable_db::value::Value;
///
/// assert_eq!(Value::from(7_i64), Value::Int(7));
/// assert_eq!(Value::from("1.2.3"), Value::String("1.2.3".to_string()));
/// assert_eq!(Value::from(None::<i64>), Value::Null);
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// SQL NULL.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// Raw binary data.
    Bytes(Vec<u8>),
    /// A date without time.
    Date(chrono::NaiveDate),
    /// A date and time without timezone.
    DateTime(chrono::NaiveDateTime),
    /// A date and time in UTC.
    DateTimeTz(chrono::DateTime<chrono::Utc>),
    /// A time without date.
    Time(chrono::NaiveTime),
    /// A UUID value.
    Uuid(uuid::Uuid),
    /// A JSON value.
    Json(serde_json::Value),
    /// A list of values (IN clauses, BETWEEN bounds).
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::DateTimeTz(dt) => write!(f, "{dt}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Json(j) => write!(f, "{j}"),
            Self::List(vals) => {
                write!(f, "[")?;
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<chrono::NaiveDateTime> for Value {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Value {
    fn from(v: chrono::DateTime<chrono::Utc>) -> Self {
        Self::DateTimeTz(v)
    }
}

impl From<chrono::NaiveTime> for Value {
    fn from(v: chrono::NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

impl Value {
    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attempts to extract a boolean value.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer value.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract a float value.
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_integers() {
        assert_eq!(Value::from(3_i16), Value::Int(3));
        assert_eq!(Value::from(3_i32), Value::Int(3));
        assert_eq!(Value::from(3_i64), Value::Int(3));
    }

    #[test]
    fn test_from_floats() {
        assert_eq!(Value::from(2.5_f64), Value::Float(2.5));
        assert_eq!(Value::from(2.5_f32), Value::Float(2.5));
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(false), Value::Bool(false));
    }

    #[test]
    fn test_from_strings() {
        assert_eq!(Value::from("demo"), Value::String("demo".to_string()));
        assert_eq!(
            Value::from("demo".to_string()),
            Value::String("demo".to_string())
        );
    }

    #[test]
    fn test_from_bytes() {
        assert_eq!(Value::from(vec![0_u8, 1, 2]), Value::Bytes(vec![0, 1, 2]));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(Some(5_i64)), Value::Int(5));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
    }

    #[test]
    fn test_from_uuid() {
        let u = uuid::Uuid::new_v4();
        assert_eq!(Value::from(u), Value::Uuid(u));
    }

    #[test]
    fn test_from_json() {
        let j = serde_json::json!({"pinned": true});
        assert_eq!(Value::from(j.clone()), Value::Json(j));
    }

    #[test]
    fn test_from_chrono() {
        let d = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(Value::from(d), Value::Date(d));

        let dt = d.and_hms_opt(9, 15, 0).unwrap();
        assert_eq!(Value::from(dt), Value::DateTime(dt));

        let t = chrono::NaiveTime::from_hms_opt(9, 15, 0).unwrap();
        assert_eq!(Value::from(t), Value::Time(t));
    }

    #[test]
    fn test_from_list() {
        let vals = vec![Value::Int(1), Value::Int(2)];
        assert_eq!(Value::from(vals.clone()), Value::List(vals));
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Int(13).to_string(), "13");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::String("2.0.0".into()).to_string(), "2.0.0");
    }

    #[test]
    fn test_display_bytes() {
        assert_eq!(Value::Bytes(vec![9; 4]).to_string(), "<4 bytes>");
    }

    #[test]
    fn test_display_list() {
        let list = Value::List(vec![Value::Int(1), Value::String("a".into())]);
        assert_eq!(list.to_string(), "[1, a]");
    }

    #[test]
    fn test_display_uuid() {
        assert_eq!(
            Value::Uuid(uuid::Uuid::nil()).to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_accessors() {
        assert!(Value::Null.is_null());
        assert!(!Value::Int(0).is_null());
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(1).as_bool(), None);
        assert_eq!(Value::Int(42).as_int(), Some(42));
        assert_eq!(Value::Float(0.5).as_int(), None);
        assert_eq!(Value::Float(0.5).as_float(), Some(0.5));
        assert_eq!(Value::Int(1).as_float(), None);
        assert_eq!(Value::String("v".into()).as_str(), Some("v"));
        assert_eq!(Value::Null.as_str(), None);
    }
}

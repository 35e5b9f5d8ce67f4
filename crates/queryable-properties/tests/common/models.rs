//! The application/version scenario models.
//!
//! `Version` declares its properties with dedicated types implementing
//! [`QueryableProperty`]; `Application` assembles its computed properties
//! with the [`DynamicProperty`] builder plus one stateful dedicated type.
//! Together they exercise both declaration styles.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::LazyLock;

use queryable_core::{QueryableError, QueryableResult};
use queryable_db::fields::{FieldDef, FieldType, OnDelete};
use queryable_db::model::{Model, ModelMeta, Row};
use queryable_db::query::compiler::{OrderBy, Query, SelectColumn, WhereNode};
use queryable_db::query::expressions::functions::{cast, concat};
use queryable_db::query::expressions::subquery::{OuterRef, SubqueryExpression};
use queryable_db::query::expressions::{AggregateFunc, Expression};
use queryable_db::query::lookups::{Lookup, Q};
use queryable_db::value::Value;
use queryable_properties::model::{BoxedProperty, PropertyCache, QueryableModel};
use queryable_properties::properties::{DynamicProperty, QueryableProperty, SetterCacheBehavior};
use queryable_properties::QueryablePropertyAccess;

// ── Version ──────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Version {
    pub id: i64,
    pub major: i64,
    pub minor: i64,
    pub patch: i64,
    pub application_id: i64,
    pub property_cache: PropertyCache,
}

impl Version {
    pub fn new(major: i64, minor: i64, patch: i64) -> Self {
        Self {
            id: 0,
            major,
            minor,
            patch,
            application_id: 1,
            property_cache: PropertyCache::new(),
        }
    }
}

impl Model for Version {
    fn meta() -> &'static ModelMeta {
        static META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
            app_label: "app",
            model_name: "version",
            db_table: "app_version".to_string(),
            verbose_name: "Version".to_string(),
            verbose_name_plural: "Versions".to_string(),
            ordering: vec![],
            abstract_model: false,
            fields: vec![
                FieldDef::new("id", FieldType::BigAutoField).primary_key(),
                FieldDef::new("major", FieldType::IntegerField),
                FieldDef::new("minor", FieldType::IntegerField),
                FieldDef::new("patch", FieldType::IntegerField),
                FieldDef::new(
                    "application",
                    FieldType::ForeignKey {
                        to: "app.Application".to_string(),
                        on_delete: OnDelete::Cascade,
                        related_name: Some("versions".to_string()),
                    },
                )
                .column("application_id"),
            ],
        });
        &META
    }

    fn table_name() -> &'static str {
        "app_version"
    }

    fn app_label() -> &'static str {
        "app"
    }

    fn pk(&self) -> Option<Value> {
        (self.id != 0).then(|| Value::Int(self.id))
    }

    fn set_pk(&mut self, value: Value) {
        if let Value::Int(id) = value {
            self.id = id;
        }
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::Int(self.id)),
            ("major", Value::Int(self.major)),
            ("minor", Value::Int(self.minor)),
            ("patch", Value::Int(self.patch)),
            ("application_id", Value::Int(self.application_id)),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, QueryableError> {
        Ok(Self {
            id: row.get("id")?,
            major: row.get("major")?,
            minor: row.get("minor")?,
            patch: row.get("patch")?,
            application_id: row.get("application_id")?,
            property_cache: PropertyCache::new(),
        })
    }
}

impl QueryableModel for Version {
    fn queryable_properties() -> &'static [BoxedProperty<Self>] {
        static PROPS: LazyLock<Vec<BoxedProperty<Version>>> = LazyLock::new(|| {
            vec![
                Box::new(MajorMinorProperty),
                Box::new(FullVersionProperty),
            ]
        });
        &PROPS
    }

    fn property_cache(&self) -> &PropertyCache {
        &self.property_cache
    }

    fn property_cache_mut(&mut self) -> &mut PropertyCache {
        &mut self.property_cache
    }
}

fn parse_part(part: &str) -> QueryableResult<i64> {
    part.parse()
        .map_err(|_| QueryableError::Property(format!("Invalid version component '{part}'.")))
}

fn exact_string(lookup: &Lookup) -> QueryableResult<&str> {
    let Lookup::Exact(value) = lookup else {
        return Err(QueryableError::Property(format!(
            "Unsupported lookup '{}'.",
            lookup.name()
        )));
    };
    value.as_str().ok_or_else(|| {
        QueryableError::Property("Version filters require a string value.".to_string())
    })
}

/// "major.minor" of a version. Filterable and updatable, not annotatable.
pub struct MajorMinorProperty;

impl QueryableProperty<Version> for MajorMinorProperty {
    fn name(&self) -> &str {
        "major_minor"
    }

    fn get_value(&self, instance: &Version) -> QueryableResult<Value> {
        Ok(Value::String(format!(
            "{}.{}",
            instance.major, instance.minor
        )))
    }

    fn get_filter(&self, lookup: &Lookup) -> Option<QueryableResult<Q>> {
        Some(major_minor_filter(lookup))
    }

    fn get_update_kwargs(&self, value: Value) -> Option<QueryableResult<Vec<(String, Value)>>> {
        Some(major_minor_update(value))
    }
}

fn major_minor_filter(lookup: &Lookup) -> QueryableResult<Q> {
    let value = exact_string(lookup)?;
    let Some((major, minor)) = value.split_once('.') else {
        return Err(QueryableError::Property(format!(
            "Invalid version string '{value}'."
        )));
    };
    Ok(
        Q::filter("major", Lookup::Exact(Value::Int(parse_part(major)?)))
            & Q::filter("minor", Lookup::Exact(Value::Int(parse_part(minor)?))),
    )
}

fn major_minor_update(value: Value) -> QueryableResult<Vec<(String, Value)>> {
    let Some(text) = value.as_str() else {
        return Err(QueryableError::Property(
            "Version updates require a string value.".to_string(),
        ));
    };
    let Some((major, minor)) = text.split_once('.') else {
        return Err(QueryableError::Property(format!(
            "Invalid version string '{text}'."
        )));
    };
    Ok(vec![
        ("major".to_string(), Value::Int(parse_part(major)?)),
        ("minor".to_string(), Value::Int(parse_part(minor)?)),
    ])
}

/// The full dotted version string. Annotatable, filterable without its
/// annotation, settable and updatable.
pub struct FullVersionProperty;

impl QueryableProperty<Version> for FullVersionProperty {
    fn name(&self) -> &str {
        "version"
    }

    fn get_value(&self, instance: &Version) -> QueryableResult<Value> {
        let major_minor = instance.get_property("major_minor")?;
        let Some(major_minor) = major_minor.as_str() else {
            return Err(QueryableError::Property(
                "major_minor did not produce a string.".to_string(),
            ));
        };
        Ok(Value::String(format!("{major_minor}.{}", instance.patch)))
    }

    fn get_annotation(&self) -> Option<Expression> {
        Some(version_expr())
    }

    fn get_filter(&self, lookup: &Lookup) -> Option<QueryableResult<Q>> {
        Some(full_version_filter(lookup))
    }

    fn filter_requires_annotation(&self) -> bool {
        false
    }

    fn set_value(&self, instance: &mut Version, value: Value) -> Option<QueryableResult<Value>> {
        Some(full_version_set(instance, &value).map(|()| value))
    }

    fn setter_cache_behavior(&self) -> SetterCacheBehavior {
        SetterCacheBehavior::CacheValue
    }

    fn get_update_kwargs(&self, value: Value) -> Option<QueryableResult<Vec<(String, Value)>>> {
        Some(full_version_update(value))
    }
}

/// CONCAT over the numeric parts, matching the "version" annotation.
pub fn version_expr() -> Expression {
    concat(vec![
        cast(Expression::col("major"), "TEXT"),
        Expression::value("."),
        cast(Expression::col("minor"), "TEXT"),
        Expression::value("."),
        cast(Expression::col("patch"), "TEXT"),
    ])
}

fn full_version_filter(lookup: &Lookup) -> QueryableResult<Q> {
    let value = exact_string(lookup)?;
    let Some((major_minor, patch)) = value.rsplit_once('.') else {
        return Err(QueryableError::Property(format!(
            "Invalid version string '{value}'."
        )));
    };
    Ok(
        Q::filter("major_minor", Lookup::Exact(Value::from(major_minor)))
            & Q::filter("patch", Lookup::Exact(Value::Int(parse_part(patch)?))),
    )
}

fn full_version_set(instance: &mut Version, value: &Value) -> QueryableResult<()> {
    let Some(text) = value.as_str() else {
        return Err(QueryableError::Property(
            "Version setters require a string value.".to_string(),
        ));
    };
    let parts: Vec<&str> = text.split('.').collect();
    let [major, minor, patch] = parts.as_slice() else {
        return Err(QueryableError::Property(format!(
            "Invalid version string '{text}'."
        )));
    };
    instance.major = parse_part(major)?;
    instance.minor = parse_part(minor)?;
    instance.patch = parse_part(patch)?;
    Ok(())
}

fn full_version_update(value: Value) -> QueryableResult<Vec<(String, Value)>> {
    let Some(text) = value.as_str() else {
        return Err(QueryableError::Property(
            "Version updates require a string value.".to_string(),
        ));
    };
    let Some((major_minor, patch)) = text.rsplit_once('.') else {
        return Err(QueryableError::Property(format!(
            "Invalid version string '{text}'."
        )));
    };
    Ok(vec![
        ("major_minor".to_string(), Value::from(major_minor)),
        ("patch".to_string(), Value::Int(parse_part(patch)?)),
    ])
}

// ── Application ──────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Application {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub property_cache: PropertyCache,
}

impl Application {
    pub fn new(name: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            category: "Demo apps".to_string(),
            property_cache: PropertyCache::new(),
        }
    }
}

impl Model for Application {
    fn meta() -> &'static ModelMeta {
        static META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
            app_label: "app",
            model_name: "application",
            db_table: "app_application".to_string(),
            verbose_name: "Application".to_string(),
            verbose_name_plural: "Applications".to_string(),
            ordering: vec![],
            abstract_model: false,
            fields: vec![
                FieldDef::new("id", FieldType::BigAutoField).primary_key(),
                FieldDef::new("name", FieldType::CharField).max_length(255),
                FieldDef::new("category", FieldType::CharField).max_length(255),
            ],
        });
        &META
    }

    fn table_name() -> &'static str {
        "app_application"
    }

    fn app_label() -> &'static str {
        "app"
    }

    fn pk(&self) -> Option<Value> {
        (self.id != 0).then(|| Value::Int(self.id))
    }

    fn set_pk(&mut self, value: Value) {
        if let Value::Int(id) = value {
            self.id = id;
        }
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::Int(self.id)),
            ("name", Value::String(self.name.clone())),
            ("category", Value::String(self.category.clone())),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, QueryableError> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            category: row.get("category")?,
            property_cache: PropertyCache::new(),
        })
    }
}

impl QueryableModel for Application {
    fn queryable_properties() -> &'static [BoxedProperty<Self>] {
        static PROPS: LazyLock<Vec<BoxedProperty<Application>>> = LazyLock::new(|| {
            vec![
                Box::new(
                    DynamicProperty::<Application>::new("highest_version")
                        .getter(|_| Ok(Value::Null))
                        .annotation(highest_version_expr),
                ),
                Box::new(
                    DynamicProperty::<Application>::new("version_count")
                        .getter(|_| Ok(Value::Int(0)))
                        .annotation(version_count_expr),
                ),
                Box::new(DummyProperty::default()),
            ]
        });
        &PROPS
    }

    fn property_cache(&self) -> &PropertyCache {
        &self.property_cache
    }

    fn property_cache_mut(&mut self) -> &mut PropertyCache {
        &mut self.property_cache
    }
}

/// The dotted version string of the application's highest version: a
/// correlated scalar subquery ordered by the numeric parts, first row only.
pub fn highest_version_expr() -> Expression {
    let mut inner = Query::new("app_version");
    inner.select = vec![SelectColumn::Expression(
        version_expr(),
        "version".to_string(),
    )];
    inner.where_clause = Some(WhereNode::ColumnExpression {
        column: "application_id".to_string(),
        expr: OuterRef::new("id").into_expression(),
    });
    inner.order_by = vec![
        OrderBy::desc("major"),
        OrderBy::desc("minor"),
        OrderBy::desc("patch"),
    ];
    inner.limit = Some(1);
    SubqueryExpression::new(inner).into_expression()
}

/// The number of versions per application as a correlated COUNT subquery.
pub fn version_count_expr() -> Expression {
    let mut inner = Query::new("app_version");
    inner.select = vec![SelectColumn::Expression(
        Expression::aggregate(AggregateFunc::Count, Expression::col("id")),
        "count".to_string(),
    )];
    inner.where_clause = Some(WhereNode::ColumnExpression {
        column: "application_id".to_string(),
        expr: OuterRef::new("id").into_expression(),
    });
    SubqueryExpression::new(inner).into_expression()
}

/// A stateful getter with a setter that ignores its input, for exercising
/// the return-value caching behavior.
#[derive(Default)]
pub struct DummyProperty {
    counter: AtomicI64,
}

impl QueryableProperty<Application> for DummyProperty {
    fn name(&self) -> &str {
        "dummy"
    }

    fn get_value(&self, _instance: &Application) -> QueryableResult<Value> {
        Ok(Value::Int(self.counter.fetch_add(1, Ordering::Relaxed) + 1))
    }

    fn set_value(
        &self,
        _instance: &mut Application,
        _value: Value,
    ) -> Option<QueryableResult<Value>> {
        Some(Ok(Value::Int(-1)))
    }

    fn setter_cache_behavior(&self) -> SetterCacheBehavior {
        SetterCacheBehavior::CacheReturnValue
    }
}

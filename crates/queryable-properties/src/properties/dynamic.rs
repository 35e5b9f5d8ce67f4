//! Closure-assembled queryable properties.
//!
//! [`DynamicProperty`] is the builder-style counterpart to implementing
//! [`QueryableProperty`] on a dedicated type: each capability is supplied as
//! a closure, and absent capabilities fall back to the trait's default
//! derivation rules.

use std::fmt;

use queryable_core::{QueryableError, QueryableResult};
use queryable_db::model::Model;
use queryable_db::query::expressions::Expression;
use queryable_db::query::lookups::{Lookup, Q};
use queryable_db::value::Value;

use super::base::{QueryableProperty, SetterCacheBehavior};

type GetterFn<M> = Box<dyn Fn(&M) -> QueryableResult<Value> + Send + Sync>;
type SetterFn<M> = Box<dyn Fn(&mut M, Value) -> QueryableResult<Value> + Send + Sync>;
type FilterFn = Box<dyn Fn(&Lookup) -> QueryableResult<Q> + Send + Sync>;
type AnnotationFn = Box<dyn Fn() -> Expression + Send + Sync>;
type UpdaterFn = Box<dyn Fn(Value) -> QueryableResult<Vec<(String, Value)>> + Send + Sync>;

/// A queryable property assembled from closures.
///
/// ```
/// use queryable_properties::properties::DynamicProperty;
/// use queryable_db::query::expressions::functions::upper;
/// use queryable_db::{Expression, Value};
/// # use queryable_db::fields::{FieldDef, FieldType};
/// # use queryable_db::model::{Model, ModelMeta, Row};
/// # use queryable_core::QueryableError;
/// # struct Track { id: i64, title: String }
/// # impl Model for Track {
/// #     fn meta() -> &'static ModelMeta {
/// #         use std::sync::LazyLock;
/// #         static META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
/// #             app_label: "music", model_name: "track",
/// #             db_table: "music_track".to_string(),
/// #             verbose_name: "track".to_string(),
/// #             verbose_name_plural: "tracks".to_string(),
/// #             ordering: vec![], abstract_model: false,
/// #             fields: vec![FieldDef::new("id", FieldType::BigAutoField).primary_key()],
/// #         });
/// #         &META
/// #     }
/// #     fn table_name() -> &'static str { "music_track" }
/// #     fn app_label() -> &'static str { "music" }
/// #     fn pk(&self) -> Option<Value> { None }
/// #     fn set_pk(&mut self, _value: Value) {}
/// #     fn field_values(&self) -> Vec<(&'static str, Value)> { vec![] }
/// #     fn from_row(_row: &Row) -> Result<Self, QueryableError> {
/// #         Ok(Track { id: 0, title: String::new() })
/// #     }
/// # }
///
/// let loud_title = DynamicProperty::<Track>::new("loud_title")
///     .getter(|track| Ok(Value::String(track.title.to_uppercase())))
///     .annotation(|| upper(Expression::col("title")));
/// ```
pub struct DynamicProperty<M: Model> {
    name: String,
    getter: Option<GetterFn<M>>,
    setter: Option<SetterFn<M>>,
    filter: Option<FilterFn>,
    filter_requires_annotation: Option<bool>,
    annotation: Option<AnnotationFn>,
    updater: Option<UpdaterFn>,
    cache_behavior: SetterCacheBehavior,
}

impl<M: Model> DynamicProperty<M> {
    /// Creates a property with the given name and no capabilities.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            getter: None,
            setter: None,
            filter: None,
            filter_requires_annotation: None,
            annotation: None,
            updater: None,
            cache_behavior: SetterCacheBehavior::default(),
        }
    }

    /// Sets the getter closure.
    #[must_use]
    pub fn getter<F>(mut self, f: F) -> Self
    where
        F: Fn(&M) -> QueryableResult<Value> + Send + Sync + 'static,
    {
        self.getter = Some(Box::new(f));
        self
    }

    /// Sets the setter closure. The returned value feeds
    /// [`SetterCacheBehavior::CacheReturnValue`].
    #[must_use]
    pub fn setter<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut M, Value) -> QueryableResult<Value> + Send + Sync + 'static,
    {
        self.setter = Some(Box::new(f));
        self
    }

    /// Sets the cache behavior applied after the setter ran.
    #[must_use]
    pub const fn with_setter_cache_behavior(mut self, behavior: SetterCacheBehavior) -> Self {
        self.cache_behavior = behavior;
        self
    }

    /// Sets the filter closure, leaving the annotation requirement derived
    /// from whether an annotation closure is present.
    #[must_use]
    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Lookup) -> QueryableResult<Q> + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(f));
        self
    }

    /// Sets the filter closure together with an explicit annotation
    /// requirement.
    ///
    /// Passing `false` keeps the property's annotation out of queries that
    /// only filter on it.
    #[must_use]
    pub fn filter_requiring_annotation<F>(mut self, requires: bool, f: F) -> Self
    where
        F: Fn(&Lookup) -> QueryableResult<Q> + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(f));
        self.filter_requires_annotation = Some(requires);
        self
    }

    /// Sets the annotation closure.
    #[must_use]
    pub fn annotation<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Expression + Send + Sync + 'static,
    {
        self.annotation = Some(Box::new(f));
        self
    }

    /// Sets the update translation closure.
    #[must_use]
    pub fn updater<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> QueryableResult<Vec<(String, Value)>> + Send + Sync + 'static,
    {
        self.updater = Some(Box::new(f));
        self
    }
}

impl<M: Model> QueryableProperty<M> for DynamicProperty<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_value(&self, instance: &M) -> QueryableResult<Value> {
        match &self.getter {
            Some(f) => f(instance),
            None => Err(QueryableError::Property(format!(
                "Queryable property \"{}\" does not implement a getter.",
                self.name
            ))),
        }
    }

    fn get_annotation(&self) -> Option<Expression> {
        self.annotation.as_ref().map(|f| f())
    }

    fn get_filter(&self, lookup: &Lookup) -> Option<QueryableResult<Q>> {
        if let Some(f) = &self.filter {
            return Some(f(lookup));
        }
        if self.annotation.is_some() {
            return Some(Ok(Q::filter(self.name.clone(), lookup.clone())));
        }
        None
    }

    fn filter_requires_annotation(&self) -> bool {
        self.filter_requires_annotation
            .unwrap_or_else(|| self.annotation.is_some())
    }

    fn set_value(&self, instance: &mut M, value: Value) -> Option<QueryableResult<Value>> {
        self.setter.as_ref().map(|f| f(instance, value))
    }

    fn setter_cache_behavior(&self) -> SetterCacheBehavior {
        self.cache_behavior
    }

    fn get_update_kwargs(&self, value: Value) -> Option<QueryableResult<Vec<(String, Value)>>> {
        self.updater.as_ref().map(|f| f(value))
    }
}

impl<M: Model> fmt::Debug for DynamicProperty<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicProperty")
            .field("name", &self.name)
            .field("has_getter", &self.getter.is_some())
            .field("has_setter", &self.setter.is_some())
            .field("has_filter", &self.filter.is_some())
            .field("has_annotation", &self.annotation.is_some())
            .field("has_updater", &self.updater.is_some())
            .field("cache_behavior", &self.cache_behavior)
            .finish()
    }
}

//! The property-aware model surface.
//!
//! Models opt into queryable properties by implementing [`QueryableModel`]:
//! a static registry of boxed property implementations plus accessors to a
//! per-instance [`PropertyCache`]. The blanket [`QueryablePropertyAccess`]
//! extension provides getter/setter access with the cache semantics applied.

use std::collections::HashMap;

use queryable_core::{QueryableError, QueryableResult};
use queryable_db::model::Model;
use queryable_db::value::Value;

use crate::properties::{QueryableProperty, SetterCacheBehavior};

/// A property implementation registered on a model.
pub type BoxedProperty<M> = Box<dyn QueryableProperty<M>>;

/// Per-instance storage for queryable property values.
///
/// Values land here when a queryset selects a property's annotation and when
/// a setter's cache behavior stores one. Reads through
/// [`QueryablePropertyAccess::get_property`] prefer cached values over
/// recomputing the getter.
#[derive(Debug, Clone, Default)]
pub struct PropertyCache {
    values: HashMap<String, Value>,
}

impl PropertyCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Returns the cached value for a property, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Stores a value for a property.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Removes and returns the cached value for a property.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Whether a value is cached for the property.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Drops all cached values.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// The number of cached values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A model carrying queryable properties.
///
/// Implementations declare their properties in a `LazyLock` static and hold
/// a [`PropertyCache`] field:
///
/// ```ignore
/// impl QueryableModel for Version {
///     fn queryable_properties() -> &'static [BoxedProperty<Self>] {
///         static PROPS: LazyLock<Vec<BoxedProperty<Version>>> = LazyLock::new(|| {
///             vec![Box::new(MajorMinorProperty), Box::new(FullVersionProperty)]
///         });
///         &PROPS
///     }
///     fn property_cache(&self) -> &PropertyCache { &self.property_cache }
///     fn property_cache_mut(&mut self) -> &mut PropertyCache { &mut self.property_cache }
/// }
/// ```
pub trait QueryableModel: Model {
    /// The properties declared on this model.
    fn queryable_properties() -> &'static [BoxedProperty<Self>]
    where
        Self: Sized;

    /// Read access to the instance's property cache.
    fn property_cache(&self) -> &PropertyCache;

    /// Write access to the instance's property cache.
    fn property_cache_mut(&mut self) -> &mut PropertyCache;
}

/// Looks up a property declared on the model by name.
pub fn get_queryable_property<M: QueryableModel>(
    name: &str,
) -> QueryableResult<&'static dyn QueryableProperty<M>> {
    M::queryable_properties()
        .iter()
        .find(|prop| prop.name() == name)
        .map(|prop| prop.as_ref())
        .ok_or_else(|| {
            QueryableError::PropertyDoesNotExist(format!(
                "{} has no queryable property named '{name}'",
                M::meta().model_name
            ))
        })
}

/// Instance-level access to queryable properties.
///
/// Implemented for every [`QueryableModel`]; call these methods instead of
/// touching the cache directly.
pub trait QueryablePropertyAccess: QueryableModel + Sized {
    /// Returns the property value, preferring a cached value over the getter.
    ///
    /// Getter results are not cached automatically; only queryset selection
    /// and setter cache behaviors populate the cache.
    fn get_property(&self, name: &str) -> QueryableResult<Value> {
        if let Some(cached) = self.property_cache().get(name) {
            return Ok(cached.clone());
        }
        let prop = get_queryable_property::<Self>(name)?;
        prop.get_value(self)
    }

    /// Runs the property's setter and applies its cache behavior.
    fn set_property(&mut self, name: &str, value: Value) -> QueryableResult<()> {
        let prop = get_queryable_property::<Self>(name)?;
        let Some(result) = prop.set_value(self, value.clone()) else {
            return Err(QueryableError::Property(format!(
                "Queryable property \"{name}\" does not implement a setter."
            )));
        };
        let returned = result?;
        match prop.setter_cache_behavior() {
            SetterCacheBehavior::ClearCache => {
                self.property_cache_mut().remove(name);
            }
            SetterCacheBehavior::CacheValue => {
                self.property_cache_mut().set(name, value);
            }
            SetterCacheBehavior::CacheReturnValue => {
                self.property_cache_mut().set(name, returned);
            }
            SetterCacheBehavior::DoNothing => {}
        }
        Ok(())
    }

    /// Whether the property currently has a cached value.
    fn has_cached_property(&self, name: &str) -> bool {
        self.property_cache().contains(name)
    }

    /// Clears the property's cached value so the next read recomputes it.
    fn reset_property(&mut self, name: &str) {
        self.property_cache_mut().remove(name);
    }
}

impl<M: QueryableModel> QueryablePropertyAccess for M {}

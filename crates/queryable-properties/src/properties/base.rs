//! The queryable property trait and setter cache behaviors.
//!
//! A queryable property is a computed, property-like attribute on a model
//! that can additionally participate in database queries. The
//! [`QueryableProperty`] trait describes everything a property may support:
//! a getter (required), a setter, a filter implementation, an annotation
//! expression, and an update translation. Each optional capability has a
//! default that derives sensible behavior from the others, so a minimal
//! implementation only provides `name` and `get_value`.

use queryable_core::QueryableResult;
use queryable_db::model::Model;
use queryable_db::query::expressions::Expression;
use queryable_db::query::lookups::{Lookup, Q};
use queryable_db::value::Value;

/// What happens to the cached property value after its setter ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetterCacheBehavior {
    /// Discard any cached value so the next read recomputes it.
    #[default]
    ClearCache,
    /// Cache the value that was passed to the setter.
    CacheValue,
    /// Cache the value the setter returned.
    CacheReturnValue,
    /// Leave the cache untouched.
    DoNothing,
}

/// A computed property on a model that can be used in database queries.
///
/// Implementing types are registered on the model through
/// [`QueryableModel::queryable_properties`](crate::model::QueryableModel::queryable_properties)
/// and are looked up by [`name`](Self::name) during query construction.
///
/// The default implementations encode the derivation rules between the
/// optional capabilities:
///
/// - a property with an annotation but no explicit filter implementation is
///   filtered against its own annotation;
/// - such annotation-derived filters require the annotation to be present,
///   so [`filter_requires_annotation`](Self::filter_requires_annotation)
///   defaults to whether an annotation exists.
pub trait QueryableProperty<M: Model>: Send + Sync {
    /// The property's name, which doubles as its annotation alias.
    fn name(&self) -> &str;

    /// Computes the property value from a model instance.
    fn get_value(&self, instance: &M) -> QueryableResult<Value>;

    /// Returns the expression that computes this property in SQL, if the
    /// property supports annotation.
    fn get_annotation(&self) -> Option<Expression> {
        None
    }

    /// Translates a lookup on this property into a filter condition.
    ///
    /// `None` means the property cannot be filtered on. The default filters
    /// annotation-backed properties against their own alias.
    fn get_filter(&self, lookup: &Lookup) -> Option<QueryableResult<Q>> {
        if self.get_annotation().is_some() {
            Some(Ok(Q::filter(self.name().to_string(), lookup.clone())))
        } else {
            None
        }
    }

    /// Whether filtering on this property requires its annotation to be
    /// present on the query.
    fn filter_requires_annotation(&self) -> bool {
        self.get_annotation().is_some()
    }

    /// Applies a new value to a model instance.
    ///
    /// `None` means the property has no setter. `Some(Ok(v))` carries the
    /// setter's return value, which [`SetterCacheBehavior::CacheReturnValue`]
    /// stores in the instance cache.
    fn set_value(&self, instance: &mut M, value: Value) -> Option<QueryableResult<Value>> {
        let _ = (instance, value);
        None
    }

    /// The cache behavior applied after [`set_value`](Self::set_value) ran.
    fn setter_cache_behavior(&self) -> SetterCacheBehavior {
        SetterCacheBehavior::default()
    }

    /// Translates an update value for this property into concrete field
    /// values.
    ///
    /// The returned names may themselves be queryable properties; update
    /// expansion resolves them recursively. `None` means the property cannot
    /// be used in `update()`.
    fn get_update_kwargs(&self, value: Value) -> Option<QueryableResult<Vec<(String, Value)>>> {
        let _ = value;
        None
    }
}

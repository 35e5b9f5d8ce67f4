//! Free-function helpers for working with queryable properties.

use queryable_core::QueryableResult;
use queryable_db::value::Value;

use crate::model::QueryableModel;

pub use crate::model::get_queryable_property;

/// Resets the cached value of the named property on a model instance.
///
/// A later read of the property on this instance executes the getter again.
/// Errors when the model declares no property with that name.
pub fn reset_queryable_property<M: QueryableModel>(
    instance: &mut M,
    name: &str,
) -> QueryableResult<Option<Value>> {
    get_queryable_property::<M>(name)?;
    Ok(instance.property_cache_mut().remove(name))
}

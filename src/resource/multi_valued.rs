//! Multi-valued attribute support.
//!
//! Items of `emails`, `addresses`, `phoneNumbers`, `roles` and `members`
//! implement [`MultiValuedItem`]. The PATCH engine works on them through the
//! object-safe [`ItemList`], implemented for every `Option<Vec<T>>` field.

use crate::error::AttributeError;
use crate::patch::matcher::find_index;
use crate::patch::path::{FALSE_LITERAL, FilterKey, TRUE_LITERAL, ValueFilter};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// One item of a multi-valued attribute.
pub trait MultiValuedItem: Clone + Default + Serialize + DeserializeOwned + Send + Sync {
    /// Name of the attribute the items belong to, e.g. `emails`.
    const ATTRIBUTE: &'static str;

    /// The item's value for `key` in filter form.
    ///
    /// Boolean flags render as `True`/`False` so they compare equal to
    /// canonicalized filter literals.
    fn filter_value(&self, key: FilterKey) -> Option<Cow<'_, str>>;

    /// Write one sub-attribute. The name is matched case-insensitively and a
    /// JSON `null` clears the sub-attribute.
    fn set_sub_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError>;
}

/// Object-safe view of a multi-valued attribute used by the PATCH engine.
pub trait ItemList {
    /// Index of the first item matching `filter`.
    fn find(&self, filter: &ValueFilter) -> Option<usize>;

    /// Replace the item at `index` with `value`.
    fn replace_item(&mut self, index: usize, value: Value) -> Result<(), AttributeError>;

    /// Write one sub-attribute of the item at `index`.
    fn set_item_attribute(
        &mut self,
        index: usize,
        sub_attribute: &str,
        value: Value,
    ) -> Result<(), AttributeError>;

    /// Append a new item carrying the filter pair.
    ///
    /// With a sub-attribute the item is `{key: filterValue, sub: value}`.
    /// Without one, `value` must be an object and becomes the item, with the
    /// filter pair stamped on it.
    fn push_matching(
        &mut self,
        filter: &ValueFilter,
        sub_attribute: Option<&str>,
        value: Value,
    ) -> Result<(), AttributeError>;

    /// Remove the item at `index`.
    fn remove_item(&mut self, index: usize);
}

impl<T: MultiValuedItem> ItemList for Option<Vec<T>> {
    fn find(&self, filter: &ValueFilter) -> Option<usize> {
        self.as_deref().and_then(|items| find_index(items, filter))
    }

    fn replace_item(&mut self, index: usize, value: Value) -> Result<(), AttributeError> {
        let item = item_from_value::<T>(value)?;
        if let Some(slot) = self.as_mut().and_then(|items| items.get_mut(index)) {
            *slot = item;
        }
        Ok(())
    }

    fn set_item_attribute(
        &mut self,
        index: usize,
        sub_attribute: &str,
        value: Value,
    ) -> Result<(), AttributeError> {
        match self.as_mut().and_then(|items| items.get_mut(index)) {
            Some(item) => item.set_sub_attribute(sub_attribute, value),
            None => Ok(()),
        }
    }

    fn push_matching(
        &mut self,
        filter: &ValueFilter,
        sub_attribute: Option<&str>,
        value: Value,
    ) -> Result<(), AttributeError> {
        let mut item = match sub_attribute {
            Some(_) => T::default(),
            None => item_from_value::<T>(value.clone())?,
        };

        item.set_sub_attribute(filter.key.as_str(), Value::String(filter.value.clone()))?;
        if let Some(sub_attribute) = sub_attribute {
            item.set_sub_attribute(sub_attribute, value)?;
        }

        self.get_or_insert_with(Vec::new).push(item);
        Ok(())
    }

    fn remove_item(&mut self, index: usize) {
        if let Some(items) = self.as_mut() {
            if index < items.len() {
                items.remove(index);
            }
        }
    }
}

fn item_from_value<T: MultiValuedItem>(value: Value) -> Result<T, AttributeError> {
    if !value.is_object() {
        return Err(AttributeError::unexpected_type(T::ATTRIBUTE, "an object"));
    }
    serde_json::from_value(value).map_err(|e| AttributeError::invalid_value(T::ATTRIBUTE, e))
}

/// Convert a JSON value into an optional string attribute.
pub(crate) fn string_value(attribute: &str, value: Value) -> Result<Option<String>, AttributeError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        _ => Err(AttributeError::unexpected_type(attribute, "a string")),
    }
}

/// Convert a JSON value into an optional boolean attribute.
///
/// Accepts JSON booleans and the strings `true`/`false` in any case, which
/// some provisioning clients send for `active` and `primary`.
pub(crate) fn flag_value(attribute: &str, value: Value) -> Result<Option<bool>, AttributeError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
        _ => Err(AttributeError::unexpected_type(attribute, "a boolean")),
    }
}

/// Convert a JSON value into a `True`/`False` string flag.
///
/// Booleans and boolean-like strings are canonicalized; other strings are
/// kept verbatim.
pub(crate) fn flag_literal(attribute: &str, value: Value) -> Result<Option<String>, AttributeError> {
    match value {
        Value::Bool(b) => Ok(Some(bool_literal(b).to_string())),
        Value::String(s) => match flag_value(attribute, Value::String(s.clone())) {
            Ok(Some(b)) => Ok(Some(bool_literal(b).to_string())),
            _ => Ok(Some(s)),
        },
        other => string_value(attribute, other),
    }
}

/// Render a boolean flag in filter form.
pub(crate) fn bool_literal(flag: bool) -> &'static str {
    if flag { TRUE_LITERAL } else { FALSE_LITERAL }
}

/// Serde adapter applying [`flag_value`] to boolean fields, so create
/// bodies and whole-value writes accept the same inputs as sub-attribute
/// writes.
pub(crate) fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    flag_value("flag", value).map_err(de::Error::custom)
}

/// Serde adapter applying [`flag_literal`] to `True`/`False` string flags.
pub(crate) fn deserialize_flag_literal<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    flag_literal("flag", value).map_err(de::Error::custom)
}

/// Deserialize any JSON value into an attribute of type `T`.
pub(crate) fn typed_value<T: DeserializeOwned>(
    attribute: &str,
    value: Value,
) -> Result<T, AttributeError> {
    serde_json::from_value(value).map_err(|e| AttributeError::invalid_value(attribute, e))
}

//! Field deserializers that never fail on shape.
//!
//! Grafana documents are free-form JSON. These helpers read a raw JSON value
//! and fall back to the field's zero value whenever the value is absent, null,
//! or of the wrong type, so a typed tree can be built from any document.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A sequence entry that is either a well-formed object or something else.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<T> {
    Object(T),
    Malformed,
}

impl<T> Node<T> {
    #[must_use]
    pub const fn as_object(&self) -> Option<&T> {
        match self {
            Self::Object(value) => Some(value),
            Self::Malformed => None,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Node<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(node_from_value(value))
    }
}

fn node_from_value<T: DeserializeOwned>(value: Value) -> Node<T> {
    if !value.is_object() {
        return Node::Malformed;
    }
    serde_json::from_value(value).map_or(Node::Malformed, Node::Object)
}

/// Reads a string, defaulting to empty.
///
/// # Errors
/// Only fails if the underlying deserializer cannot produce a JSON value.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string).unwrap_or_default())
}

/// Reads a string, yielding `None` when absent or not a string.
///
/// # Errors
/// Only fails if the underlying deserializer cannot produce a JSON value.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

/// Reads an integer. Floating point values are truncated toward zero.
///
/// # Errors
/// Only fails if the underlying deserializer cannot produce a JSON value.
pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(int_from_value(&value))
}

#[allow(clippy::cast_possible_truncation)]
fn int_from_value(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|number| number.trunc() as i64))
        .unwrap_or_default()
}

/// Reads a boolean, defaulting to `false`.
///
/// # Errors
/// Only fails if the underlying deserializer cannot produce a JSON value.
pub fn boolean<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or_default())
}

/// Reads a list of strings, dropping entries that are not strings.
///
/// # Errors
/// Only fails if the underlying deserializer cannot produce a JSON value.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text),
            _ => None,
        })
        .collect())
}

/// Reads a string-to-string map, dropping non-string values. `null` and
/// other non-objects yield an empty map.
///
/// # Errors
/// Only fails if the underlying deserializer cannot produce a JSON value.
pub fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(entries) = value else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, item)| match item {
            Value::String(text) => Some((key, text)),
            _ => None,
        })
        .collect())
}

/// Reads a value whose `null` stands for its zero value. Other shapes must
/// still decode as `T`.
///
/// # Errors
/// Fails when a non-null value does not decode as `T`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a sequence of nodes. A missing or non-sequence value yields an
/// empty list; entries that are not objects are kept as [`Node::Malformed`]
/// so callers can still count them.
///
/// # Errors
/// Only fails if the underlying deserializer cannot produce a JSON value.
pub fn nodes<'de, D, T>(deserializer: D) -> Result<Vec<Node<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items.into_iter().map(node_from_value).collect())
}

/// Reads a nested object, falling back to `T::default()`.
///
/// # Errors
/// Only fails if the underlying deserializer cannot produce a JSON value.
pub fn object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Looks up a string member of a raw JSON object.
#[must_use]
pub fn member_str<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "string")]
        name: String,
        #[serde(default, deserialize_with = "int")]
        id: i64,
        #[serde(default, deserialize_with = "string_list")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "nodes")]
        children: Vec<Node<Self>>,
        #[serde(default, deserialize_with = "string_map")]
        labels: BTreeMap<String, String>,
    }

    #[test]
    fn wrong_types_fall_back_to_zero_values() {
        let sample: Sample = serde_json::from_value(json!({
            "name": 12,
            "id": "seven",
            "tags": "not-a-list",
            "children": {"nested": true},
            "labels": null
        }))
        .expect("lenient fields never fail");

        assert_eq!(sample.name, "");
        assert_eq!(sample.id, 0);
        assert!(sample.tags.is_empty());
        assert!(sample.children.is_empty());
        assert!(sample.labels.is_empty());
    }

    #[test]
    fn float_ids_truncate_and_malformed_children_are_counted() {
        let sample: Sample = serde_json::from_value(json!({
            "id": 4.0,
            "tags": ["a", 1, "b"],
            "children": [{"name": "x"}, 3, null]
        }))
        .expect("lenient fields never fail");

        assert_eq!(sample.id, 4);
        assert_eq!(sample.tags, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(sample.children.len(), 3);
        assert_eq!(
            sample.children[0].as_object().map(|child| child.name.as_str()),
            Some("x")
        );
        assert!(sample.children[1].as_object().is_none());
    }
}

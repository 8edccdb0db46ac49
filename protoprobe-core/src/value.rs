//! Message-value trees.
//!
//! A [`MessageValue`] is the in-memory form of a protobuf message as the
//! editor works with it: a fully-qualified type name plus a field tree in
//! the proto3 JSON mapping. The bridge moves these across the wire
//! boundary; the string-rewriting helpers run placeholder substitution
//! over them without disturbing their shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A protobuf message as a typed JSON field tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageValue {
    /// Fully-qualified message type name, e.g. `acme.v1.Greeting`.
    pub type_name: String,
    /// Field tree in the proto3 JSON mapping.
    pub fields: Value,
}

impl MessageValue {
    /// Create a message value from a type name and a field tree.
    pub fn new(type_name: impl Into<String>, fields: Value) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }
}

/// Apply `f` to every string leaf of a message tree.
///
/// Objects and arrays are recursed into; non-string leaves pass through
/// untouched. Object keys are field names, not data, and are never
/// rewritten.
pub fn rewrite_strings<F>(value: &MessageValue, f: F) -> MessageValue
where
    F: Fn(&str) -> String,
{
    match try_rewrite_strings(value, |s| Ok::<_, std::convert::Infallible>(f(s))) {
        Ok(rewritten) => rewritten,
        Err(never) => match never {},
    }
}

/// Fallible variant of [`rewrite_strings`].
///
/// Stops at the first leaf `f` rejects and propagates its error.
pub fn try_rewrite_strings<F, E>(value: &MessageValue, f: F) -> Result<MessageValue, E>
where
    F: Fn(&str) -> Result<String, E>,
{
    Ok(MessageValue {
        type_name: value.type_name.clone(),
        fields: try_rewrite_value(&value.fields, &f)?,
    })
}

fn try_rewrite_value<F, E>(value: &Value, f: &F) -> Result<Value, E>
where
    F: Fn(&str) -> Result<String, E>,
{
    match value {
        Value::String(s) => f(s).map(Value::String),
        Value::Array(items) => items
            .iter()
            .map(|item| try_rewrite_value(item, f))
            .collect::<Result<Vec<_>, E>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| try_rewrite_value(item, f).map(|item| (key.clone(), item)))
            .collect::<Result<serde_json::Map<_, _>, E>>()
            .map(Value::Object),
        other => Ok(other.clone()),
    }
}

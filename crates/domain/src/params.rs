//! Caller-supplied parameters and payloads
//!
//! Parameters are an ordered name/value map; values are JSON so that
//! generated calling code can pass anything through unchanged. The
//! payload is either a pre-serialized string or a structured map, as a
//! tagged union instead of runtime type inspection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An ordered parameter mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    /// Creates an empty parameter map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts a parameter, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns true if `name` is present with a non-blank value.
    #[must_use]
    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !is_blank(v))
    }

    /// Returns true if `parent[child]` is present with a non-blank value.
    #[must_use]
    pub fn is_nested_present(&self, parent: &str, child: &str) -> bool {
        nested_value(self.get(parent), child).is_some_and(|v| !is_blank(v))
    }

    /// Iterates over all entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns true if no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for Params {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Params {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A request payload: either a pre-serialized JSON string or a
/// structured mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// A raw JSON document, sent to the wire verbatim.
    Raw(String),
    /// A structured mapping, serialized before sending.
    Structured(Map<String, Value>),
}

impl Payload {
    /// Wraps a JSON value as a structured payload.
    ///
    /// Non-object values become a raw payload of their serialized form,
    /// since only objects can satisfy named parameters.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Structured(map),
            other => Self::Raw(other.to_string()),
        }
    }

    /// Returns the structured mapping, if this payload has one.
    #[must_use]
    pub const fn as_structured(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Structured(map) => Some(map),
            Self::Raw(_) => None,
        }
    }

    /// Returns true if `parent[child]` is present and non-blank in a
    /// structured payload. Raw payloads are never consulted here; the
    /// dispatcher parses them first.
    #[must_use]
    pub fn is_nested_present(&self, parent: &str, child: &str) -> bool {
        self.as_structured()
            .is_some_and(|map| nested_value(map.get(parent), child).is_some_and(|v| !is_blank(v)))
    }

    /// Returns true if `name` is present and non-blank in a structured
    /// payload.
    #[must_use]
    pub fn is_present(&self, name: &str) -> bool {
        self.as_structured()
            .is_some_and(|map| map.get(name).is_some_and(|v| !is_blank(v)))
    }

    /// Serializes the payload for the wire.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for a structured payload that cannot
    /// be encoded (practically unreachable for JSON maps).
    pub fn to_body(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Raw(body) => Ok(body.clone()),
            Self::Structured(map) => serde_json::to_string(map),
        }
    }
}

/// Splits a possibly nested parameter name into `(parent, child)`.
///
/// `assignment[name]` yields `("assignment", Some("name"))`; a flat name
/// yields itself with no child.
#[must_use]
pub fn split_nested(name: &str) -> (&str, Option<&str>) {
    if let Some(open) = name.find('[')
        && let Some(close) = name.rfind(']')
        && close > open
    {
        return (&name[..open], Some(&name[open + 1..close]));
    }
    (name, None)
}

/// Blankness as the upstream API treats presence: null, empty or
/// whitespace-only strings, and empty collections count as absent.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn nested_value<'a>(parent: Option<&'a Value>, child: &str) -> Option<&'a Value> {
    parent?.as_object()?.get(child)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_blankness() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!("   ")));
        assert!(is_blank(&json!([])));
        assert!(is_blank(&json!({})));
        assert!(!is_blank(&json!(false)));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!("x")));
    }

    #[test]
    fn test_split_nested() {
        assert_eq!(split_nested("assignment[name]"), ("assignment", Some("name")));
        assert_eq!(split_nested("course_id"), ("course_id", None));
        assert_eq!(split_nested("odd[shape"), ("odd[shape", None));
    }

    #[test]
    fn test_params_presence() {
        let params = Params::new()
            .with("course_id", 42)
            .with("blank", "")
            .with("assignment", json!({ "name": "Essay" }));

        assert!(params.is_present("course_id"));
        assert!(!params.is_present("blank"));
        assert!(!params.is_present("missing"));
        assert!(params.is_nested_present("assignment", "name"));
        assert!(!params.is_nested_present("assignment", "due_at"));
    }

    #[test]
    fn test_payload_structured_presence() {
        let payload = Payload::from_value(json!({
            "assignment": { "name": "Essay", "points": null }
        }));
        assert!(payload.is_nested_present("assignment", "name"));
        assert!(!payload.is_nested_present("assignment", "points"));
        assert!(payload.is_present("assignment"));
    }

    #[test]
    fn test_raw_payload_never_consulted() {
        let payload = Payload::Raw(r#"{"assignment":{"name":"Essay"}}"#.to_string());
        assert!(!payload.is_nested_present("assignment", "name"));
        assert!(!payload.is_present("assignment"));
    }

    #[test]
    fn test_payload_to_body() {
        let raw = Payload::Raw("{\"a\":1}".to_string());
        assert_eq!(raw.to_body().unwrap(), "{\"a\":1}");

        let structured = Payload::from_value(json!({ "a": 1 }));
        assert_eq!(structured.to_body().unwrap(), "{\"a\":1}");
    }
}

//! The configuration value tree shared by every resolution layer.
//!
//! Defaults, project configuration files, the registration store snapshot,
//! and runtime overrides all take this shape, so the merge algorithm in
//! [`crate::merge`] can combine them uniformly. The tree is JSON-like data
//! plus [`Handler`] leaves for registered callables and engine instances.
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use strata_config::Value;
//!
//! let value = Value::from(json!({"dir": {"output": "_site"}}));
//! let output = value
//!     .as_map()
//!     .and_then(|map| map.get("dir"))
//!     .and_then(Value::as_map)
//!     .and_then(|dir| dir.get("output"))
//!     .and_then(Value::as_str);
//! assert_eq!(output, Some("_site"));
//! ```

use std::collections::BTreeMap;

use serde::ser::{Serialize, Serializer};

use crate::handler::Handler;

/// Mapping node of the configuration tree, ordered for deterministic output.
pub type Map = BTreeMap<String, Value>;

/// A single node of the configuration tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Absent or explicitly null value.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Integer(i64),
    /// Floating-point scalar.
    Float(f64),
    /// String scalar.
    String(String),
    /// Ordered sequence; replaced wholesale during merges.
    Array(Vec<Value>),
    /// Nested mapping; combined recursively during merges.
    Map(Map),
    /// Registered callable or engine instance; compared by identity.
    Handler(Handler),
}

impl Value {
    /// Borrow as a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Borrow as an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Borrow as a float.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Borrow as a string slice.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow as an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as a mapping.
    #[must_use]
    pub const fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Mutably borrow as a mapping.
    pub const fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow as a handler.
    #[must_use]
    pub const fn as_handler(&self) -> Option<&Handler> {
        match self {
            Self::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    /// Whether this node is a mapping.
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Self::Map(value)
    }
}

impl From<Handler> for Value {
    fn from(value: Handler) -> Self {
        Self::Handler(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(flag) => Self::Bool(flag),
            serde_json::Value::Number(number) => number
                .as_i64()
                .map_or_else(|| number.as_f64().map_or(Self::Null, Self::Float), Self::Integer),
            serde_json::Value::String(text) => Self::String(text),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, entry)| (key, Self::from(entry)))
                    .collect(),
            ),
        }
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(text) => Self::String(text),
            toml::Value::Integer(number) => Self::Integer(number),
            toml::Value::Float(number) => Self::Float(number),
            toml::Value::Boolean(flag) => Self::Bool(flag),
            toml::Value::Datetime(datetime) => Self::String(datetime.to_string()),
            toml::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            toml::Value::Table(table) => Self::Map(
                table
                    .into_iter()
                    .map(|(key, entry)| (key, Self::from(entry)))
                    .collect(),
            ),
        }
    }
}

/// Handlers have no data representation; they serialise as the placeholder
/// string `"<handler>"` so resolved configurations can be dumped for
/// diagnostics.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(flag) => serializer.serialize_bool(*flag),
            Self::Integer(number) => serializer.serialize_i64(*number),
            Self::Float(number) => serializer.serialize_f64(*number),
            Self::String(text) => serializer.serialize_str(text),
            Self::Array(items) => serializer.collect_seq(items),
            Self::Map(entries) => serializer.collect_map(entries),
            Self::Handler(_) => serializer.serialize_str("<handler>"),
        }
    }
}

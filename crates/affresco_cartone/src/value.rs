//! Runtime value vocabulary for props, state and attrs.

use std::fmt;

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// A string-keyed value map. Ordering is irrelevant; the engine sorts keys
/// wherever a deterministic sequence matters.
pub type ValueMap = FxHashMap<CompactString, Value>;

/// A dynamically typed runtime value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(CompactString),
    List(Vec<Value>),
    Map(ValueMap),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Loose truthiness: `Null`, `false`, `0`, `0.0` and `""` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Text-interpolation rendering: `Null` is empty, strings are raw,
    /// composites fall back to JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::List(_) | Value::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(CompactString::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(CompactString::from(value))
    }
}

impl From<CompactString> for Value {
    fn from(value: CompactString) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Map(value)
    }
}

/// Build a [`ValueMap`] from `key => value` pairs.
///
/// ```
/// use affresco_cartone::{vmap, Value};
///
/// let props = vmap! { "id" => "app", "count" => 3 };
/// assert_eq!(props.get("count"), Some(&Value::Int(3)));
/// ```
#[macro_export]
macro_rules! vmap {
    () => { $crate::ValueMap::default() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ValueMap::default();
        $(
            map.insert($crate::CompactString::from($key), $crate::Value::from($value));
        )+
        map
    }};
}

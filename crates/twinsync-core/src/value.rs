//! Value type for twin property state
//!
//! Supports the minimal set of JSON-representable kinds a device twin
//! property can take.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared kind of a twin property binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ValueKind {
    /// Unconfigured binding; rejected when the registry opens
    #[default]
    Unknown,

    /// Boolean value
    Boolean,

    /// Signed integer
    Integer,

    /// Floating point number
    Float,

    /// UTF-8 string
    String,
}

impl ValueKind {
    /// Zero value installed when a binding of this kind opens.
    /// `Unknown` has no storage.
    pub fn zero_value(self) -> Option<TwinValue> {
        match self {
            ValueKind::Unknown => None,
            ValueKind::Boolean => Some(TwinValue::Boolean(false)),
            ValueKind::Integer => Some(TwinValue::Integer(0)),
            ValueKind::Float => Some(TwinValue::Float(OrderedFloat(0.0))),
            ValueKind::String => Some(TwinValue::String(String::new())),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Unknown => "unknown",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
        };
        write!(f, "{name}")
    }
}

/// Current state of a twin property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TwinValue {
    /// Boolean value
    Boolean(bool),

    /// Integer number
    Integer(i64),

    /// Floating point number
    Float(OrderedFloat<f64>),

    /// UTF-8 string
    String(String),
}

impl TwinValue {
    /// The kind tag for this value
    pub fn kind(&self) -> ValueKind {
        match self {
            TwinValue::Boolean(_) => ValueKind::Boolean,
            TwinValue::Integer(_) => ValueKind::Integer,
            TwinValue::Float(_) => ValueKind::Float,
            TwinValue::String(_) => ValueKind::String,
        }
    }

    /// Convert to boolean if possible
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TwinValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to integer if possible
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TwinValue::Integer(i) => Some(*i),
            TwinValue::Float(f) => Some(f.into_inner() as i64),
            _ => None,
        }
    }

    /// Convert to float if possible
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TwinValue::Float(f) => Some(f.into_inner()),
            TwinValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Convert to string if possible
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TwinValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TwinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TwinValue::Boolean(b) => write!(f, "{b}"),
            TwinValue::Integer(i) => write!(f, "{i}"),
            TwinValue::Float(fl) => write!(f, "{fl}"),
            TwinValue::String(s) => write!(f, "{s}"),
        }
    }
}

// Conversions from Rust types
impl From<bool> for TwinValue {
    fn from(b: bool) -> Self {
        TwinValue::Boolean(b)
    }
}

impl From<i32> for TwinValue {
    fn from(i: i32) -> Self {
        TwinValue::Integer(i64::from(i))
    }
}

impl From<i64> for TwinValue {
    fn from(i: i64) -> Self {
        TwinValue::Integer(i)
    }
}

impl From<f32> for TwinValue {
    fn from(f: f32) -> Self {
        TwinValue::Float(OrderedFloat(f64::from(f)))
    }
}

impl From<f64> for TwinValue {
    fn from(f: f64) -> Self {
        TwinValue::Float(OrderedFloat(f))
    }
}

impl From<String> for TwinValue {
    fn from(s: String) -> Self {
        TwinValue::String(s)
    }
}

impl From<&str> for TwinValue {
    fn from(s: &str) -> Self {
        TwinValue::String(s.to_string())
    }
}

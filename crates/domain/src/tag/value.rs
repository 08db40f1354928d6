use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TagKind;
use crate::error::{DomainError, Result};

/// A typed tag value. The kind is chosen at construction and carried by the
/// variant, so a stored value can never disagree with its declared kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum TagValue {
    Integer(i64),
    Double(f64),
    String(String),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl TagValue {
    /// The declared kind of this value.
    pub fn kind(&self) -> TagKind {
        match self {
            Self::Integer(_) => TagKind::Integer,
            Self::Double(_) => TagKind::Double,
            Self::String(_) => TagKind::String,
            Self::Boolean(_) => TagKind::Boolean,
            Self::Timestamp(_) => TagKind::Timestamp,
        }
    }

    /// Derives a TagValue from a raw JSON value, re-deriving the kind from
    /// the value's native representation.
    ///
    /// `null` is rejected with [`DomainError::NullValue`]; arrays and objects
    /// have no tag representation and fail with [`DomainError::UnsupportedKind`].
    pub fn try_from_json(tag: &str, value: Value) -> Result<Self> {
        match value {
            Value::Null => Err(DomainError::NullValue(tag.to_string())),
            Value::Bool(b) => Ok(Self::Boolean(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Double(f))
                } else {
                    Err(DomainError::UnsupportedKind(n.to_string()))
                }
            }
            Value::String(s) => Ok(Self::String(s)),
            Value::Array(_) => Err(DomainError::UnsupportedKind("array".to_string())),
            Value::Object(_) => Err(DomainError::UnsupportedKind("object".to_string())),
        }
    }

    /// Projects the value back into plain JSON (kind discarded).
    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(i) => Value::from(*i),
            Self::Double(f) => Value::from(*f),
            Self::String(s) => Value::from(s.clone()),
            Self::Boolean(b) => Value::from(*b),
            Self::Timestamp(ts) => Value::from(ts.to_rfc3339()),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl From<i64> for TagValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for TagValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for TagValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for TagValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for TagValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<DateTime<Utc>> for TagValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

/// Conversion seam for typed tag reads.
pub trait FromTagValue: Sized {
    /// Kind a value must declare to convert into this type.
    const KIND: TagKind;

    fn from_tag_value(value: &TagValue) -> Option<Self>;
}

impl FromTagValue for i64 {
    const KIND: TagKind = TagKind::Integer;

    fn from_tag_value(value: &TagValue) -> Option<Self> {
        value.as_integer()
    }
}

impl FromTagValue for f64 {
    const KIND: TagKind = TagKind::Double;

    fn from_tag_value(value: &TagValue) -> Option<Self> {
        value.as_double()
    }
}

impl FromTagValue for String {
    const KIND: TagKind = TagKind::String;

    fn from_tag_value(value: &TagValue) -> Option<Self> {
        value.as_str().map(|s| s.to_string())
    }
}

impl FromTagValue for bool {
    const KIND: TagKind = TagKind::Boolean;

    fn from_tag_value(value: &TagValue) -> Option<Self> {
        value.as_boolean()
    }
}

impl FromTagValue for DateTime<Utc> {
    const KIND: TagKind = TagKind::Timestamp;

    fn from_tag_value(value: &TagValue) -> Option<Self> {
        value.as_timestamp()
    }
}

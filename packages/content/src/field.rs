//! # Typed Field Values
//!
//! Every binding declares a [`FieldType`]. Stored content is plain JSON,
//! so values are decoded into a [`FieldValue`] on read and encoded back
//! on write.
//!
//! ## Encodings
//!
//! | Type | Stored as |
//! |---|---|
//! | text, richtext, image | string |
//! | list | array of strings |
//! | link | `{"label": .., "url": ..}` (legacy `"label|url"` strings still decode) |
//! | number | finite JSON number |
//! | object | any JSON object or array |

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Declared content type of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    RichText,
    Image,
    List,
    Link,
    Number,
    #[serde(alias = "array")]
    Object,
}

impl FieldType {
    pub const ALL: [FieldType; 7] = [
        FieldType::Text,
        FieldType::RichText,
        FieldType::Image,
        FieldType::List,
        FieldType::Link,
        FieldType::Number,
        FieldType::Object,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::RichText => "richtext",
            FieldType::Image => "image",
            FieldType::List => "list",
            FieldType::Link => "link",
            FieldType::Number => "number",
            FieldType::Object => "object",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(FieldType::Text),
            "richtext" => Ok(FieldType::RichText),
            "image" => Ok(FieldType::Image),
            "list" => Ok(FieldType::List),
            "link" => Ok(FieldType::Link),
            "number" => Ok(FieldType::Number),
            "object" | "array" => Ok(FieldType::Object),
            other => Err(FieldError::UnknownType(other.to_string())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("Unknown field type: {0}")]
    UnknownType(String),

    #[error("Expected {expected} value, found {found}")]
    TypeMismatch { expected: FieldType, found: &'static str },

    #[error("Not a number: {0:?}")]
    InvalidNumber(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
}

/// Anchor label and target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Link {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }

    /// Decode the legacy single-string form. Splits on the first `|`;
    /// a string without one is all label.
    pub fn from_legacy(encoded: &str) -> Self {
        match encoded.split_once('|') {
            Some((label, url)) => Self::new(label, url),
            None => Self::new(encoded, ""),
        }
    }
}

/// A decoded content value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    RichText(String),
    Image(String),
    List(Vec<String>),
    Link(Link),
    Number(f64),
    Object(Value),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::RichText(_) => FieldType::RichText,
            FieldValue::Image(_) => FieldType::Image,
            FieldValue::List(_) => FieldType::List,
            FieldValue::Link(_) => FieldType::Link,
            FieldValue::Number(_) => FieldType::Number,
            FieldValue::Object(_) => FieldType::Object,
        }
    }

    /// Checked constructor for numbers; `NaN` and infinities are rejected
    pub fn number(n: f64) -> Result<Self, FieldError> {
        if n.is_finite() {
            Ok(FieldValue::Number(n))
        } else {
            Err(FieldError::InvalidNumber(n.to_string()))
        }
    }

    /// Decode stored JSON as `field_type`
    pub fn from_json(field_type: FieldType, value: &Value) -> Result<Self, FieldError> {
        let mismatch = || FieldError::TypeMismatch {
            expected: field_type,
            found: json_kind(value),
        };

        match field_type {
            FieldType::Text | FieldType::RichText | FieldType::Image => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return Err(mismatch()),
                };
                Ok(match field_type {
                    FieldType::Text => FieldValue::Text(text),
                    FieldType::RichText => FieldValue::RichText(text),
                    _ => FieldValue::Image(text),
                })
            }

            FieldType::List => match value {
                Value::Array(items) => Ok(FieldValue::List(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                )),
                _ => Err(mismatch()),
            },

            FieldType::Link => match value {
                Value::String(s) => Ok(FieldValue::Link(Link::from_legacy(s))),
                Value::Object(map) => {
                    let label = map.get("label").and_then(Value::as_str).unwrap_or_default();
                    let url = map.get("url").and_then(Value::as_str).unwrap_or_default();
                    Ok(FieldValue::Link(Link::new(label, url)))
                }
                _ => Err(mismatch()),
            },

            FieldType::Number => match value {
                Value::Number(n) => n.as_f64().ok_or_else(mismatch).and_then(Self::number),
                Value::String(s) => parse_number(s).map(FieldValue::Number),
                _ => Err(mismatch()),
            },

            FieldType::Object => match value {
                Value::Object(_) | Value::Array(_) => Ok(FieldValue::Object(value.clone())),
                _ => Err(mismatch()),
            },
        }
    }

    /// Encode for storage
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) | FieldValue::RichText(s) | FieldValue::Image(s) => {
                Value::String(s.clone())
            }
            FieldValue::List(items) => json!(items),
            FieldValue::Link(link) => {
                let mut map = Map::new();
                map.insert("label".to_string(), Value::String(link.label.clone()));
                map.insert("url".to_string(), Value::String(link.url.clone()));
                Value::Object(map)
            }
            FieldValue::Number(n) => number_to_json(*n),
            FieldValue::Object(v) => v.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) | FieldValue::RichText(s) | FieldValue::Image(s) => f.write_str(s),
            FieldValue::List(items) => f.write_str(&items.join(", ")),
            FieldValue::Link(link) => write!(f, "{} <{}>", link.label, link.url),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Object(v) => {
                let pretty = serde_json::to_string_pretty(v).map_err(|_| fmt::Error)?;
                f.write_str(&pretty)
            }
        }
    }
}

/// Parse user input for a number field
pub fn parse_number(input: &str) -> Result<f64, FieldError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(FieldError::InvalidNumber(input.to_string())),
    }
}

// Whole numbers keep their integer JSON form
fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

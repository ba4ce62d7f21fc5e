//! # Edit Drafts
//!
//! Transient editor state for one field, shaped per type. A draft is
//! created from the resolved value when editing starts and converted back
//! to a [`FieldValue`] on commit.
//!
//! Object drafts keep the raw text apart from the last successfully
//! parsed value, so unparsed text can never be committed.

use crate::field::{parse_number, FieldError, FieldType, FieldValue, Link};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    Text(String),
    RichText(String),
    Image(ImageDraft),
    List(ListDraft),
    Link { label: String, url: String },
    Number(String),
    Json(JsonDraft),
}

impl Draft {
    /// Blank draft for a field with no value yet
    pub fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => Draft::Text(String::new()),
            FieldType::RichText => Draft::RichText(String::new()),
            FieldType::Image => Draft::Image(ImageDraft::default()),
            FieldType::List => Draft::List(ListDraft::default()),
            FieldType::Link => Draft::Link {
                label: String::new(),
                url: String::new(),
            },
            FieldType::Number => Draft::Number(String::new()),
            FieldType::Object => Draft::Json(JsonDraft::new(Value::Object(Default::default()))),
        }
    }

    /// Pre-populate from a resolved value
    pub fn from_value(value: &FieldValue) -> Self {
        match value {
            FieldValue::Text(s) => Draft::Text(s.clone()),
            FieldValue::RichText(s) => Draft::RichText(s.clone()),
            FieldValue::Image(src) => Draft::Image(ImageDraft { source: src.clone() }),
            FieldValue::List(items) => Draft::List(ListDraft {
                items: items.clone(),
            }),
            FieldValue::Link(link) => Draft::Link {
                label: link.label.clone(),
                url: link.url.clone(),
            },
            FieldValue::Number(n) => Draft::Number(n.to_string()),
            FieldValue::Object(v) => Draft::Json(JsonDraft::new(v.clone())),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Draft::Text(_) => FieldType::Text,
            Draft::RichText(_) => FieldType::RichText,
            Draft::Image(_) => FieldType::Image,
            Draft::List(_) => FieldType::List,
            Draft::Link { .. } => FieldType::Link,
            Draft::Number(_) => FieldType::Number,
            Draft::Json(_) => FieldType::Object,
        }
    }

    /// Convert to a committable value. Object drafts are applied first;
    /// unparsable text or non-numeric input fails.
    pub fn to_value(&mut self) -> Result<FieldValue, FieldError> {
        match self {
            Draft::Text(s) => Ok(FieldValue::Text(s.clone())),
            Draft::RichText(s) => Ok(FieldValue::RichText(s.clone())),
            Draft::Image(image) => Ok(FieldValue::Image(image.source.clone())),
            Draft::List(list) => Ok(FieldValue::List(list.items.clone())),
            Draft::Link { label, url } => Ok(FieldValue::Link(Link::new(label.clone(), url.clone()))),
            Draft::Number(text) => parse_number(text).map(FieldValue::Number),
            Draft::Json(json) => json.apply().map(|v| FieldValue::Object(v.clone())),
        }
    }
}

/// Image source: a URL typed in, or a data URI built from an uploaded file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDraft {
    pub source: String,
}

impl ImageDraft {
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.source = url.into();
    }

    /// Embed file bytes directly as the field value
    pub fn load_bytes(&mut self, bytes: &[u8], mime: &str) {
        self.source = data_uri(mime, bytes);
    }

    pub fn load_file(&mut self, path: &Path) -> std::io::Result<()> {
        let bytes = std::fs::read(path)?;
        self.load_bytes(&bytes, mime_for_path(path));
        Ok(())
    }

    pub fn is_embedded(&self) -> bool {
        self.source.starts_with("data:")
    }
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// One input per list item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDraft {
    pub items: Vec<String>,
}

impl ListDraft {
    pub fn push(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    /// Out-of-range indexes are ignored
    pub fn set(&mut self, index: usize, item: impl Into<String>) {
        if let Some(slot) = self.items.get_mut(index) {
            *slot = item.into();
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }
}

/// JSON text area with an explicit apply step
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDraft {
    text: String,
    applied: Value,
    error: Option<String>,
}

impl JsonDraft {
    pub fn new(value: Value) -> Self {
        let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
        Self {
            text,
            applied: value,
            error: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Last successfully parsed value
    pub fn applied(&self) -> &Value {
        &self.applied
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Parse the text. Only objects and arrays are accepted; on failure the
    /// previously applied value is kept and the error is recorded.
    pub fn apply(&mut self) -> Result<&Value, FieldError> {
        let parsed = serde_json::from_str::<Value>(&self.text)
            .map_err(|e| e.to_string())
            .and_then(|v| match v {
                Value::Object(_) | Value::Array(_) => Ok(v),
                _ => Err("expected an object or array".to_string()),
            });

        match parsed {
            Ok(value) => {
                self.applied = value;
                self.error = None;
                Ok(&self.applied)
            }
            Err(message) => {
                self.error = Some(message.clone());
                Err(FieldError::InvalidJson(message))
            }
        }
    }
}

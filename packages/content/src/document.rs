//! # Content Document
//!
//! All edited site content, organized as `section → field-path → value`.
//!
//! The serialized form is exactly the `"siteContent"` record: a JSON
//! object whose values are JSON objects.

use crate::path::{self, PathError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Section reserved for feature toggles
pub const FEATURES_SECTION: &str = "features";

/// Per-section show/hide flag
pub const VISIBLE_FIELD: &str = "visible";

/// Per-section removal flag
pub const REMOVED_FIELD: &str = "removed";

pub type SectionId = String;

/// Schema-less field mapping of one section
pub type SectionRecord = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDocument {
    sections: BTreeMap<SectionId, SectionRecord>,
}

impl ContentDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored document. Anything but an object of objects fails.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.sections
                .iter()
                .map(|(id, record)| (id.clone(), Value::Object(record.clone())))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, section: &str) -> Option<&SectionRecord> {
        self.sections.get(section)
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &SectionRecord)> {
        self.sections.iter().map(|(id, record)| (id.as_str(), record))
    }

    /// Shallow merge into a section: top-level keys of `partial` replace
    /// existing ones wholesale, nested values are not deep-merged.
    pub fn merge_section(&mut self, section: &str, partial: SectionRecord) {
        let record = self.sections.entry(section.to_string()).or_default();
        for (key, value) in partial {
            record.insert(key, value);
        }
    }

    pub fn remove_section(&mut self, section: &str) -> Option<SectionRecord> {
        self.sections.remove(section)
    }

    /// Value at `field_path` within `section`
    pub fn field(&self, section: &str, field_path: &str) -> Option<&Value> {
        path::get_in(self.sections.get(section)?, field_path)
    }

    /// Value at a full `section.field.path`
    pub fn get(&self, full_path: &str) -> Option<&Value> {
        let (section, field_path) = full_path.split_once('.')?;
        self.field(section, field_path)
    }

    /// Assign `value` at `field_path` within `section`, creating both as needed
    pub fn set_field(&mut self, section: &str, field_path: &str, value: Value) -> Result<(), PathError> {
        path::segments(field_path)?;
        let record = self.sections.entry(section.to_string()).or_default();
        path::set_in(record, field_path, value)
    }

    /// Assign at a full `section.field.path`
    pub fn set(&mut self, full_path: &str, value: Value) -> Result<(), PathError> {
        let (section, field_path) = split_full_path(full_path)?;
        self.set_field(section, field_path, value)
    }

    pub fn remove_field(&mut self, section: &str, field_path: &str) -> Result<Option<Value>, PathError> {
        match self.sections.get_mut(section) {
            Some(record) => path::remove_in(record, field_path),
            None => {
                path::segments(field_path)?;
                Ok(None)
            }
        }
    }

    /// Boolean flag stored at `field` in `section`, if it is a boolean
    pub fn flag(&self, section: &str, field: &str) -> Option<bool> {
        self.field(section, field).and_then(Value::as_bool)
    }
}

/// Split `section.field.path` into its section and field path
pub fn split_full_path(full_path: &str) -> Result<(&str, &str), PathError> {
    path::segments(full_path)?;
    full_path
        .split_once('.')
        .ok_or_else(|| PathError::EmptySegment(full_path.to_string()))
}

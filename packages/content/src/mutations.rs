//! # Content Mutations
//!
//! Serializable edits to a [`ContentDocument`]. Bindings, overlay controls
//! and remote clients all describe their writes this way.
//!
//! ## Semantics
//!
//! - `SetField` writes one value at a field path (intermediates created)
//! - `MergeSection` is the shallow section-level merge: top-level keys
//!   replace existing ones wholesale
//! - Flags (`visible`, `removed`, features) are ordinary boolean fields
//! - Last write wins; there is no merge between competing edits

use crate::document::{
    ContentDocument, SectionRecord, FEATURES_SECTION, REMOVED_FIELD, VISIBLE_FIELD,
};
use crate::path::PathError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentMutation {
    /// Write a value at a field path inside a section
    SetField {
        section: String,
        path: String,
        value: Value,
    },

    /// Shallow-merge a partial record into a section
    MergeSection {
        section: String,
        record: SectionRecord,
    },

    /// Delete the value at a field path
    RemoveField { section: String, path: String },

    /// Show or hide a whole section
    SetSectionVisibility { section: String, visible: bool },

    /// Mark a section removed (never rendered) or bring it back
    SetSectionRemoved { section: String, removed: bool },

    /// Turn a feature toggle on or off
    SetFeature { feature: String, enabled: bool },
}

impl ContentMutation {
    /// Section this mutation writes into
    pub fn section(&self) -> &str {
        match self {
            ContentMutation::SetField { section, .. }
            | ContentMutation::MergeSection { section, .. }
            | ContentMutation::RemoveField { section, .. }
            | ContentMutation::SetSectionVisibility { section, .. }
            | ContentMutation::SetSectionRemoved { section, .. } => section,
            ContentMutation::SetFeature { .. } => FEATURES_SECTION,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContentMutation::SetField { .. } => "setField",
            ContentMutation::MergeSection { .. } => "mergeSection",
            ContentMutation::RemoveField { .. } => "removeField",
            ContentMutation::SetSectionVisibility { .. } => "setSectionVisibility",
            ContentMutation::SetSectionRemoved { .. } => "setSectionRemoved",
            ContentMutation::SetFeature { .. } => "setFeature",
        }
    }

    /// Apply to a document. Paths are validated before anything is written.
    pub fn apply(&self, doc: &mut ContentDocument) -> Result<(), PathError> {
        match self {
            ContentMutation::SetField { section, path, value } => {
                doc.set_field(section, path, value.clone())
            }

            ContentMutation::MergeSection { section, record } => {
                doc.merge_section(section, record.clone());
                Ok(())
            }

            ContentMutation::RemoveField { section, path } => {
                doc.remove_field(section, path).map(|_| ())
            }

            ContentMutation::SetSectionVisibility { section, visible } => {
                doc.set_field(section, VISIBLE_FIELD, Value::Bool(*visible))
            }

            ContentMutation::SetSectionRemoved { section, removed } => {
                doc.set_field(section, REMOVED_FIELD, Value::Bool(*removed))
            }

            ContentMutation::SetFeature { feature, enabled } => {
                doc.set_field(FEATURES_SECTION, feature, Value::Bool(*enabled))
            }
        }
    }
}

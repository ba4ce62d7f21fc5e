//! # Editable Bindings
//!
//! A binding ties one piece of page content to a `(section, field path)`
//! in the store. It never holds stored data itself, only the default and
//! fallback supplied by the page that renders it.
//!
//! Resolution order: stored value → default value → fallback markup.

use crate::document::{
    ContentDocument, SectionRecord, FEATURES_SECTION, REMOVED_FIELD, VISIBLE_FIELD,
};
use crate::field::{FieldError, FieldType, FieldValue};
use crate::{path, ContentError, ContentStore, SessionGate};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Caller-supplied check run before a value is written
pub type Validator = Arc<dyn Fn(&FieldValue) -> Result<(), String> + Send + Sync>;

#[derive(Clone)]
pub struct Binding {
    pub section: String,
    pub field_path: String,
    pub field_type: FieldType,
    pub default: Option<FieldValue>,
    /// Static markup shown when nothing else resolves
    pub fallback: Option<String>,
    /// Text fields: multi-line input instead of a single line
    pub multiline: bool,
    /// List fields: numbered rather than bulleted
    pub ordered: bool,
    validator: Option<Validator>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("section", &self.section)
            .field("field_path", &self.field_path)
            .field("field_type", &self.field_type)
            .field("default", &self.default)
            .field("fallback", &self.fallback)
            .field("multiline", &self.multiline)
            .field("ordered", &self.ordered)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Where a binding's value came from
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Stored(FieldValue),
    Default(FieldValue),
    Fallback(String),
    Empty,
}

impl Resolved {
    pub fn value(&self) -> Option<&FieldValue> {
        match self {
            Resolved::Stored(v) | Resolved::Default(v) => Some(v),
            _ => None,
        }
    }
}

impl Binding {
    pub fn new(section: impl Into<String>, field_path: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            section: section.into(),
            field_path: field_path.into(),
            field_type,
            default: None,
            fallback: None,
            multiline: false,
            ordered: false,
            validator: None,
        }
    }

    pub fn text(section: impl Into<String>, field_path: impl Into<String>) -> Self {
        Self::new(section, field_path, FieldType::Text)
    }

    pub fn with_default(mut self, default: FieldValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_fallback(mut self, markup: impl Into<String>) -> Self {
        self.fallback = Some(markup.into());
        self
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn ordered(mut self) -> Self {
        self.ordered = true;
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&FieldValue) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// `section.field.path` as used by the store
    pub fn full_path(&self) -> String {
        format!("{}.{}", self.section, self.field_path)
    }

    /// Resolve against a document. A stored value that does not decode as
    /// this binding's type is skipped in favor of the default.
    pub fn resolve(&self, doc: &ContentDocument) -> Resolved {
        if let Some(stored) = doc.field(&self.section, &self.field_path) {
            match FieldValue::from_json(self.field_type, stored) {
                Ok(value) => return Resolved::Stored(value),
                Err(e) => warn!(path = %self.full_path(), error = %e, "Ignoring stored value"),
            }
        }

        if let Some(default) = &self.default {
            return Resolved::Default(default.clone());
        }

        match &self.fallback {
            Some(markup) => Resolved::Fallback(markup.clone()),
            None => Resolved::Empty,
        }
    }

    /// Clicking this binding opens an editor
    pub fn is_editable(&self, gate: &SessionGate) -> bool {
        gate.is_edit_mode()
    }

    pub fn validate(&self, value: &FieldValue) -> Result<(), ContentError> {
        match &self.validator {
            Some(validator) => validator(value).map_err(ContentError::Validation),
            None => Ok(()),
        }
    }

    /// Write `value` through the store: the section record is updated at
    /// the field path and merged back as a whole.
    pub fn commit(
        &self,
        store: &mut ContentStore,
        gate: &SessionGate,
        value: &FieldValue,
    ) -> Result<(), ContentError> {
        gate.authorize_edit()?;

        if value.field_type() != self.field_type {
            return Err(FieldError::TypeMismatch {
                expected: self.field_type,
                found: value.field_type().as_str(),
            }
            .into());
        }
        self.validate(value)?;

        let mut record = store.section(&self.section).cloned().unwrap_or_default();
        let encoded = self.encode(&record, value);
        path::set_in(&mut record, &self.field_path, encoded)?;
        store.update_content(gate, &self.section, record)
    }

    /// A value that decodes to exactly what is already stored keeps its
    /// stored JSON, so mixed-type lists and integers beyond `f64`
    /// precision survive an unchanged save. Legacy link strings are
    /// always rewritten as records.
    fn encode(&self, record: &SectionRecord, value: &FieldValue) -> Value {
        match path::get_in(record, &self.field_path) {
            Some(Value::String(_)) if self.field_type == FieldType::Link => value.to_json(),
            Some(stored) if FieldValue::from_json(self.field_type, stored).as_ref() == Ok(value) => {
                stored.clone()
            }
            _ => value.to_json(),
        }
    }
}

/// Feature toggle read from the reserved `"features"` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureGate {
    pub feature: String,
    pub default_enabled: bool,
}

impl FeatureGate {
    pub fn new(feature: impl Into<String>, default_enabled: bool) -> Self {
        Self {
            feature: feature.into(),
            default_enabled,
        }
    }

    pub fn is_enabled(&self, doc: &ContentDocument) -> bool {
        doc.flag(FEATURES_SECTION, &self.feature)
            .unwrap_or(self.default_enabled)
    }

    /// `children` when enabled, otherwise `fallback`
    pub fn select<T>(&self, doc: &ContentDocument, children: T, fallback: T) -> T {
        if self.is_enabled(doc) {
            children
        } else {
            fallback
        }
    }
}

/// Whole-section display state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionVisibility {
    Shown,
    /// Rendered only in edit mode, so it can be shown again
    Hidden,
    /// Never rendered
    Removed,
}

impl SectionVisibility {
    pub fn of(doc: &ContentDocument, section: &str) -> Self {
        if doc.flag(section, REMOVED_FIELD).unwrap_or(false) {
            SectionVisibility::Removed
        } else if !doc.flag(section, VISIBLE_FIELD).unwrap_or(true) {
            SectionVisibility::Hidden
        } else {
            SectionVisibility::Shown
        }
    }

    pub fn should_render(self, edit_mode: bool) -> bool {
        match self {
            SectionVisibility::Shown => true,
            SectionVisibility::Hidden => edit_mode,
            SectionVisibility::Removed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SectionRecord;
    use crate::AdminCredentials;
    use folio_common::MemoryStorage;
    use serde_json::{json, Value};

    fn record(value: Value) -> SectionRecord {
        value.as_object().cloned().unwrap()
    }

    fn setup() -> (ContentStore, SessionGate) {
        let store = ContentStore::load(Box::new(MemoryStorage::new())).unwrap();
        let mut gate = SessionGate::new(AdminCredentials::new("me@site.dev", "pw"));
        gate.login("me@site.dev", "pw").unwrap();
        gate.toggle_edit_mode();
        (store, gate)
    }

    #[test]
    fn test_resolution_order() {
        let mut doc = ContentDocument::new();
        let binding = Binding::text("about", "title")
            .with_default(FieldValue::Text("Default".to_string()))
            .with_fallback("<h1>Static</h1>");

        assert_eq!(
            binding.resolve(&doc),
            Resolved::Default(FieldValue::Text("Default".to_string()))
        );

        doc.set("about.title", json!("Stored")).unwrap();
        assert_eq!(
            binding.resolve(&doc),
            Resolved::Stored(FieldValue::Text("Stored".to_string()))
        );

        let bare = Binding::text("about", "missing").with_fallback("<h1>Static</h1>");
        assert_eq!(bare.resolve(&doc), Resolved::Fallback("<h1>Static</h1>".to_string()));
        assert_eq!(Binding::text("about", "missing").resolve(&doc), Resolved::Empty);
    }

    #[test]
    fn test_mistyped_stored_value_falls_back() {
        let mut doc = ContentDocument::new();
        doc.set("stats.years", json!({ "oops": true })).unwrap();

        let binding = Binding::new("stats", "years", FieldType::Number)
            .with_default(FieldValue::Number(5.0));
        assert_eq!(binding.resolve(&doc), Resolved::Default(FieldValue::Number(5.0)));
    }

    #[test]
    fn test_commit_writes_nested_path() {
        let (mut store, gate) = setup();
        store
            .update_content(&gate, "about", record(json!({ "hero": { "subtitle": "Keep" } })))
            .unwrap();

        let binding = Binding::text("about", "hero.title");
        binding
            .commit(&mut store, &gate, &FieldValue::Text("New".to_string()))
            .unwrap();

        assert_eq!(store.get("about.hero.title"), Some(&json!("New")));
        assert_eq!(store.get("about.hero.subtitle"), Some(&json!("Keep")));
    }

    #[test]
    fn test_commit_runs_validator() {
        let (mut store, gate) = setup();
        let binding = Binding::text("contact", "email").with_validator(|v| match v {
            FieldValue::Text(s) if s.contains('@') => Ok(()),
            _ => Err("Enter a valid email".to_string()),
        });

        let result = binding.commit(&mut store, &gate, &FieldValue::Text("nope".to_string()));
        assert!(matches!(result, Err(ContentError::Validation(ref m)) if m == "Enter a valid email"));
        assert!(store.document().is_empty());

        binding
            .commit(&mut store, &gate, &FieldValue::Text("a@b.com".to_string()))
            .unwrap();
        assert_eq!(store.get("contact.email"), Some(&json!("a@b.com")));
    }

    #[test]
    fn test_commit_rejects_wrong_type() {
        let (mut store, gate) = setup();
        let binding = Binding::new("stats", "years", FieldType::Number);

        let result = binding.commit(&mut store, &gate, &FieldValue::Text("ten".to_string()));
        assert!(matches!(
            result,
            Err(ContentError::Field(FieldError::TypeMismatch { .. }))
        ));
    }

    #[test]
    fn test_commit_requires_edit_mode() {
        let (mut store, mut gate) = setup();
        gate.toggle_edit_mode();

        let binding = Binding::text("about", "title");
        assert!(!binding.is_editable(&gate));
        let result = binding.commit(&mut store, &gate, &FieldValue::Text("x".to_string()));
        assert!(matches!(result, Err(ContentError::EditModeInactive)));
    }

    #[test]
    fn test_feature_gate_uses_stored_flag() {
        let (mut store, gate) = setup();
        let whatsapp = FeatureGate::new("whatsapp", true);

        assert_eq!(whatsapp.select(store.document(), "children", "fallback"), "children");

        store
            .update_content(&gate, FEATURES_SECTION, record(json!({ "whatsapp": false })))
            .unwrap();
        assert!(!whatsapp.is_enabled(store.document()));
        assert_eq!(whatsapp.select(store.document(), "children", "fallback"), "fallback");
    }

    #[test]
    fn test_section_visibility_states() {
        let mut doc = ContentDocument::new();
        assert_eq!(SectionVisibility::of(&doc, "blog"), SectionVisibility::Shown);

        doc.set("blog.visible", json!(false)).unwrap();
        let hidden = SectionVisibility::of(&doc, "blog");
        assert_eq!(hidden, SectionVisibility::Hidden);
        assert!(!hidden.should_render(false));
        assert!(hidden.should_render(true));

        doc.set("blog.removed", json!(true)).unwrap();
        let removed = SectionVisibility::of(&doc, "blog");
        assert_eq!(removed, SectionVisibility::Removed);
        assert!(!removed.should_render(true));
    }
}

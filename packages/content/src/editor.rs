//! # Field Editor
//!
//! Display ⇄ Editing state machine for one binding.
//!
//! - Display → Editing only while the session is admin with edit mode on;
//!   otherwise the click is ignored
//! - Editing → Display on a successful commit or on cancel
//! - A failed commit (bad number, unparsable JSON, validator rejection,
//!   lost authorization) stays in Editing with an inline error

use crate::binding::Binding;
use crate::draft::Draft;
use crate::{ContentError, ContentStore, SessionGate};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Display,
    Editing(Draft),
}

#[derive(Debug, Clone)]
pub struct FieldEditor {
    binding: Binding,
    state: EditorState,
    error: Option<String>,
}

impl FieldEditor {
    pub fn new(binding: Binding) -> Self {
        Self {
            binding,
            state: EditorState::Display,
            error: None,
        }
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditorState::Editing(_))
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            EditorState::Editing(draft) => Some(draft),
            EditorState::Display => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match &mut self.state {
            EditorState::Editing(draft) => Some(draft),
            EditorState::Display => None,
        }
    }

    /// Inline error from the last failed commit
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Open the editor pre-populated with the resolved value.
    /// Returns whether editing started.
    pub fn begin_edit(&mut self, store: &ContentStore, gate: &SessionGate) -> bool {
        if !self.binding.is_editable(gate) {
            return false;
        }
        if self.is_editing() {
            return true;
        }

        let draft = match self.binding.resolve(store.document()).value() {
            Some(value) => Draft::from_value(value),
            None => Draft::empty(self.binding.field_type),
        };
        debug!(path = %self.binding.full_path(), "Editing field");

        self.state = EditorState::Editing(draft);
        self.error = None;
        true
    }

    /// Discard the draft
    pub fn cancel(&mut self) {
        self.state = EditorState::Display;
        self.error = None;
    }

    /// Write the draft through the binding
    pub fn commit(&mut self, store: &mut ContentStore, gate: &SessionGate) -> Result<(), ContentError> {
        let result = match &mut self.state {
            EditorState::Display => return Err(ContentError::NotEditing),
            EditorState::Editing(draft) => draft
                .to_value()
                .map_err(ContentError::from)
                .and_then(|value| self.binding.commit(store, gate, &value)),
        };

        match result {
            Ok(()) => {
                self.state = EditorState::Display;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(match &e {
                    ContentError::Validation(message) => message.clone(),
                    other => other.to_string(),
                });
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldType, FieldValue};
    use crate::AdminCredentials;
    use folio_common::MemoryStorage;
    use serde_json::json;

    fn setup(edit_mode: bool) -> (ContentStore, SessionGate) {
        let store = ContentStore::load(Box::new(MemoryStorage::new())).unwrap();
        let mut gate = SessionGate::new(AdminCredentials::new("me@site.dev", "pw"));
        gate.login("me@site.dev", "pw").unwrap();
        if edit_mode {
            gate.toggle_edit_mode();
        }
        (store, gate)
    }

    #[test]
    fn test_click_is_noop_outside_edit_mode() {
        let (store, gate) = setup(false);
        let mut editor = FieldEditor::new(Binding::text("about", "title"));

        assert!(!editor.begin_edit(&store, &gate));
        assert_eq!(editor.state(), &EditorState::Display);
    }

    #[test]
    fn test_edit_prepopulates_from_default() {
        let (store, gate) = setup(true);
        let binding = Binding::text("about", "title").with_default(FieldValue::Text("Hi".to_string()));
        let mut editor = FieldEditor::new(binding);

        assert!(editor.begin_edit(&store, &gate));
        assert_eq!(editor.draft(), Some(&Draft::Text("Hi".to_string())));
    }

    #[test]
    fn test_commit_returns_to_display() {
        let (mut store, gate) = setup(true);
        let mut editor = FieldEditor::new(Binding::text("about", "title"));

        editor.begin_edit(&store, &gate);
        if let Some(Draft::Text(text)) = editor.draft_mut() {
            *text = "Saved".to_string();
        }
        editor.commit(&mut store, &gate).unwrap();

        assert!(!editor.is_editing());
        assert_eq!(store.get("about.title"), Some(&json!("Saved")));
    }

    #[test]
    fn test_cancel_discards_draft() {
        let (mut store, gate) = setup(true);
        let mut editor = FieldEditor::new(Binding::text("about", "title"));

        editor.begin_edit(&store, &gate);
        if let Some(Draft::Text(text)) = editor.draft_mut() {
            *text = "Unsaved".to_string();
        }
        editor.cancel();

        assert!(matches!(editor.commit(&mut store, &gate), Err(ContentError::NotEditing)));
        assert!(store.document().is_empty());
    }

    #[test]
    fn test_invalid_number_keeps_editing() {
        let (mut store, gate) = setup(true);
        let mut editor = FieldEditor::new(Binding::new("stats", "years", FieldType::Number));

        editor.begin_edit(&store, &gate);
        if let Some(Draft::Number(text)) = editor.draft_mut() {
            *text = "lots".to_string();
        }

        assert!(editor.commit(&mut store, &gate).is_err());
        assert!(editor.is_editing());
        assert!(editor.error().is_some());
        assert!(store.document().is_empty());
    }

    #[test]
    fn test_unparsed_json_is_never_saved() {
        let (mut store, gate) = setup(true);
        let binding = Binding::new("projects", "items", FieldType::Object)
            .with_default(FieldValue::Object(json!([])));
        let mut editor = FieldEditor::new(binding);

        editor.begin_edit(&store, &gate);
        if let Some(Draft::Json(json)) = editor.draft_mut() {
            json.set_text("[{\"name\": ");
        }

        assert!(editor.commit(&mut store, &gate).is_err());
        assert!(editor.is_editing());
        assert_eq!(store.get("projects.items"), None);

        if let Some(Draft::Json(json)) = editor.draft_mut() {
            json.set_text("[{\"name\": \"folio\"}]");
        }
        editor.commit(&mut store, &gate).unwrap();
        assert_eq!(store.get("projects.items"), Some(&json!([{ "name": "folio" }])));
    }

    #[test]
    fn test_validation_message_is_inline() {
        let (mut store, gate) = setup(true);
        let binding = Binding::text("about", "title").with_validator(|v| match v {
            FieldValue::Text(s) if !s.is_empty() => Ok(()),
            _ => Err("Title is required".to_string()),
        });
        let mut editor = FieldEditor::new(binding);

        editor.begin_edit(&store, &gate);
        assert!(editor.commit(&mut store, &gate).is_err());
        assert_eq!(editor.error(), Some("Title is required"));
        assert!(editor.is_editing());
    }
}

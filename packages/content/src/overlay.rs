//! # Overlay Controls
//!
//! The admin-facing controls: toolbar, login, section show/hide/remove and
//! feature toggles. The overlay owns the one [`ContentStore`] and the one
//! [`SessionGate`] of a page and turns each [`OverlayAction`] into a
//! [`Notification`] for the user.
//!
//! The page's bindings are registered with the overlay. Any write that
//! lands on a bound field is decoded as the binding's declared type and
//! checked by its validator, whichever surface it came from.

use crate::binding::{Binding, FeatureGate, SectionVisibility};
use crate::editor::FieldEditor;
use crate::field::FieldValue;
use crate::store::ExportFile;
use crate::{ContentError, ContentMutation, ContentStore, SessionGate, SessionState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum OverlayAction {
    Login { email: String, password: String },
    Logout,
    ToggleEditMode,
    Save,
    Reset,
    Export,
    Import { json: String },
    SetSectionVisibility { section: String, visible: bool },
    RemoveSection { section: String },
    RestoreSection { section: String },
    SetFeature { feature: String, enabled: bool },
    /// Typed write to a bound field
    CommitField { section: String, path: String, value: Value },
    Mutate { mutation: ContentMutation },
}

/// Blocking message shown after an action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notification {
    Success { message: String },
    Error { message: String },
    Download { file: ExportFile },
}

impl Notification {
    fn success(message: impl Into<String>) -> Self {
        Notification::Success {
            message: message.into(),
        }
    }

    fn error(error: &ContentError) -> Self {
        Notification::Error {
            message: error.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolbarButton {
    ToggleEditMode,
    Save,
    Reset,
    Export,
    Import,
    Logout,
}

impl ToolbarButton {
    pub fn label(self) -> &'static str {
        match self {
            ToolbarButton::ToggleEditMode => "Edit",
            ToolbarButton::Save => "Save all",
            ToolbarButton::Reset => "Reset",
            ToolbarButton::Export => "Export",
            ToolbarButton::Import => "Import",
            ToolbarButton::Logout => "Logout",
        }
    }

    pub fn action_name(self) -> &'static str {
        match self {
            ToolbarButton::ToggleEditMode => "toggleEditMode",
            ToolbarButton::Save => "save",
            ToolbarButton::Reset => "reset",
            ToolbarButton::Export => "export",
            ToolbarButton::Import => "import",
            ToolbarButton::Logout => "logout",
        }
    }
}

pub struct Overlay {
    store: ContentStore,
    gate: SessionGate,
    bindings: Vec<Binding>,
}

impl Overlay {
    pub fn new(store: ContentStore, gate: SessionGate) -> Self {
        Self {
            store,
            gate,
            bindings: Vec::new(),
        }
    }

    /// Register the bindings of the page this overlay edits
    pub fn with_bindings(mut self, bindings: impl IntoIterator<Item = Binding>) -> Self {
        self.bindings.extend(bindings);
        self
    }

    pub fn binding(&self, section: &str, field_path: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|b| b.section == section && b.field_path == field_path)
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn session(&self) -> SessionState {
        self.gate.state()
    }

    /// Split borrow for editors and direct store access
    pub fn parts_mut(&mut self) -> (&mut ContentStore, &mut SessionGate) {
        (&mut self.store, &mut self.gate)
    }

    /// Document for the current viewer: the working copy for the admin,
    /// the published copy for everyone else
    pub fn view(&self) -> &crate::ContentDocument {
        if self.gate.is_admin() {
            self.store.document()
        } else {
            self.store.published()
        }
    }

    pub fn begin_edit(&self, editor: &mut FieldEditor) -> bool {
        editor.begin_edit(&self.store, &self.gate)
    }

    pub fn commit_edit(&mut self, editor: &mut FieldEditor) -> Notification {
        match editor.commit(&mut self.store, &self.gate) {
            Ok(()) => Notification::success("Change applied"),
            Err(e) => Notification::error(&e),
        }
    }

    /// Buttons shown for the current session
    pub fn toolbar(&self) -> Vec<ToolbarButton> {
        let state = self.gate.state();
        if state.is_edit_mode {
            vec![
                ToolbarButton::Save,
                ToolbarButton::Reset,
                ToolbarButton::Export,
                ToolbarButton::Import,
                ToolbarButton::Logout,
            ]
        } else if state.is_admin {
            vec![ToolbarButton::ToggleEditMode, ToolbarButton::Logout]
        } else {
            Vec::new()
        }
    }

    pub fn section_visibility(&self, section: &str) -> SectionVisibility {
        SectionVisibility::of(self.view(), section)
    }

    pub fn should_render_section(&self, section: &str) -> bool {
        self.section_visibility(section)
            .should_render(self.gate.is_edit_mode())
    }

    pub fn feature_enabled(&self, feature: &str, default_enabled: bool) -> bool {
        FeatureGate::new(feature, default_enabled).is_enabled(self.view())
    }

    /// Decode `value` as the bound field's type and commit it through the
    /// binding, validator included
    pub fn commit_field(&mut self, section: &str, field_path: &str, value: &Value) -> Result<(), ContentError> {
        self.gate.authorize_edit()?;

        let binding = self
            .bindings
            .iter()
            .find(|b| b.section == section && b.field_path == field_path)
            .ok_or_else(|| ContentError::UnboundField(format!("{}.{}", section, field_path)))?;

        let decoded = FieldValue::from_json(binding.field_type, value)?;
        binding.commit(&mut self.store, &self.gate, &decoded)
    }

    /// Apply a raw mutation. An exact write to a bound field goes through
    /// [`Overlay::commit_field`]; any other mutation that changes a bound
    /// field must leave a value the binding accepts.
    pub fn apply_mutation(&mut self, mutation: &ContentMutation) -> Result<(), ContentError> {
        if let ContentMutation::SetField { section, path, value } = mutation {
            if self.binding(section, path).is_some() {
                return self.commit_field(section, path, value);
            }
        }

        self.gate.authorize_edit()?;
        self.check_bound_fields(mutation)?;
        self.store.apply(&self.gate, mutation)
    }

    fn check_bound_fields(&self, mutation: &ContentMutation) -> Result<(), ContentError> {
        let section = mutation.section();
        let mut bound = self.bindings.iter().filter(|b| b.section == section).peekable();
        if bound.peek().is_none() {
            return Ok(());
        }

        let before = self.store.document();
        let mut after = before.clone();
        mutation.apply(&mut after)?;

        for binding in bound {
            let next = after.field(section, &binding.field_path);
            if next == before.field(section, &binding.field_path) {
                continue;
            }
            // Removing a bound value falls back to its default
            if let Some(value) = next {
                let decoded = FieldValue::from_json(binding.field_type, value).map_err(|e| {
                    warn!(path = %binding.full_path(), error = %e, "Rejected write to bound field");
                    ContentError::from(e)
                })?;
                binding.validate(&decoded)?;
            }
        }
        Ok(())
    }

    pub fn dispatch(&mut self, action: OverlayAction) -> Notification {
        match self.try_dispatch(action) {
            Ok(notification) => notification,
            Err(e) => Notification::error(&e),
        }
    }

    fn try_dispatch(&mut self, action: OverlayAction) -> Result<Notification, ContentError> {
        match action {
            OverlayAction::Login { email, password } => {
                self.gate.login(&email, &password)?;
                Ok(Notification::success("Signed in"))
            }

            OverlayAction::Logout => {
                self.gate.logout();
                Ok(Notification::success("Signed out"))
            }

            OverlayAction::ToggleEditMode => {
                self.gate.authorize_admin()?;
                let on = self.gate.toggle_edit_mode();
                Ok(Notification::success(if on {
                    "Edit mode on"
                } else {
                    "Edit mode off"
                }))
            }

            OverlayAction::Save => {
                self.store.save_changes(&mut self.gate)?;
                Ok(Notification::success("All changes saved"))
            }

            OverlayAction::Reset => {
                self.store.reset_changes(&mut self.gate)?;
                Ok(Notification::success("Changes discarded"))
            }

            OverlayAction::Export => {
                self.gate.authorize_admin()?;
                let file = self.store.export_content()?;
                Ok(Notification::Download { file })
            }

            OverlayAction::Import { json } => {
                self.store.import_content(&mut self.gate, &json)?;
                Ok(Notification::success("Content imported"))
            }

            OverlayAction::SetSectionVisibility { section, visible } => {
                self.mutate(ContentMutation::SetSectionVisibility { section, visible })
            }

            OverlayAction::RemoveSection { section } => self.mutate(ContentMutation::SetSectionRemoved {
                section,
                removed: true,
            }),

            OverlayAction::RestoreSection { section } => {
                self.mutate(ContentMutation::SetSectionRemoved {
                    section,
                    removed: false,
                })
            }

            OverlayAction::SetFeature { feature, enabled } => {
                self.mutate(ContentMutation::SetFeature { feature, enabled })
            }

            OverlayAction::CommitField {
                section,
                path,
                value,
            } => {
                self.commit_field(&section, &path, &value)?;
                Ok(Notification::success("Change applied"))
            }

            OverlayAction::Mutate { mutation } => self.mutate(mutation),
        }
    }

    fn mutate(&mut self, mutation: ContentMutation) -> Result<Notification, ContentError> {
        self.apply_mutation(&mutation)?;
        Ok(Notification::success("Change applied"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AdminCredentials;
    use folio_common::MemoryStorage;
    use serde_json::json;

    fn overlay() -> Overlay {
        let store = ContentStore::load(Box::new(MemoryStorage::new())).unwrap();
        Overlay::new(store, SessionGate::new(AdminCredentials::new("me@site.dev", "pw")))
    }

    fn sign_in(overlay: &mut Overlay) {
        let n = overlay.dispatch(OverlayAction::Login {
            email: "me@site.dev".to_string(),
            password: "pw".to_string(),
        });
        assert!(!n.is_error());
    }

    #[test]
    fn test_toolbar_follows_session() {
        let mut overlay = overlay();
        assert!(overlay.toolbar().is_empty());

        sign_in(&mut overlay);
        assert_eq!(
            overlay.toolbar(),
            vec![ToolbarButton::ToggleEditMode, ToolbarButton::Logout]
        );

        overlay.dispatch(OverlayAction::ToggleEditMode);
        assert!(overlay.toolbar().contains(&ToolbarButton::Save));
        assert!(overlay.toolbar().contains(&ToolbarButton::Import));
    }

    #[test]
    fn test_rejections_are_notifications() {
        let mut overlay = overlay();

        let n = overlay.dispatch(OverlayAction::Login {
            email: "me@site.dev".to_string(),
            password: "bad".to_string(),
        });
        assert!(n.is_error());

        let n = overlay.dispatch(OverlayAction::SetFeature {
            feature: "chat".to_string(),
            enabled: false,
        });
        assert!(n.is_error());
        assert!(overlay.store().document().is_empty());

        assert!(overlay.dispatch(OverlayAction::Save).is_error());
        assert!(overlay.dispatch(OverlayAction::ToggleEditMode).is_error());
    }

    #[test]
    fn test_hidden_section_visible_only_while_editing() {
        let mut overlay = overlay();
        sign_in(&mut overlay);
        overlay.dispatch(OverlayAction::ToggleEditMode);

        overlay.dispatch(OverlayAction::SetSectionVisibility {
            section: "blog".to_string(),
            visible: false,
        });
        assert_eq!(overlay.section_visibility("blog"), SectionVisibility::Hidden);
        assert!(overlay.should_render_section("blog"));

        overlay.dispatch(OverlayAction::Save);
        assert!(!overlay.should_render_section("blog"));
    }

    #[test]
    fn test_removed_section_never_renders() {
        let mut overlay = overlay();
        sign_in(&mut overlay);
        overlay.dispatch(OverlayAction::ToggleEditMode);

        overlay.dispatch(OverlayAction::RemoveSection {
            section: "services".to_string(),
        });
        assert!(!overlay.should_render_section("services"));

        overlay.dispatch(OverlayAction::RestoreSection {
            section: "services".to_string(),
        });
        assert!(overlay.should_render_section("services"));
    }

    #[test]
    fn test_visitors_see_published_features() {
        let mut overlay = overlay();
        sign_in(&mut overlay);
        overlay.dispatch(OverlayAction::ToggleEditMode);
        overlay.dispatch(OverlayAction::SetFeature {
            feature: "chat".to_string(),
            enabled: false,
        });

        assert!(!overlay.feature_enabled("chat", true));

        overlay.dispatch(OverlayAction::Logout);
        // Never saved, so visitors still get the default
        assert!(overlay.feature_enabled("chat", true));
    }

    #[test]
    fn test_export_is_a_download() {
        let mut overlay = overlay();
        assert!(overlay.dispatch(OverlayAction::Export).is_error());

        sign_in(&mut overlay);
        match overlay.dispatch(OverlayAction::Export) {
            Notification::Download { file } => {
                assert!(file.file_name.starts_with("site-content-"));
                assert_eq!(file.contents, "{}");
            }
            other => panic!("expected download, got {:?}", other),
        }
    }

    fn bound_overlay() -> Overlay {
        overlay().with_bindings([
            Binding::text("contact", "email").with_validator(|value| match value {
                FieldValue::Text(email) if email.contains('@') => Ok(()),
                _ => Err("Enter a valid email address".to_string()),
            }),
            Binding::new("projects", "items", crate::FieldType::Object),
            Binding::new("about", "years", crate::FieldType::Number),
        ])
    }

    fn editing(mut overlay: Overlay) -> Overlay {
        sign_in(&mut overlay);
        overlay.dispatch(OverlayAction::ToggleEditMode);
        overlay
    }

    fn set_field(section: &str, path: &str, value: Value) -> OverlayAction {
        OverlayAction::Mutate {
            mutation: ContentMutation::SetField {
                section: section.to_string(),
                path: path.to_string(),
                value,
            },
        }
    }

    #[test]
    fn test_raw_write_to_bound_field_runs_validator() {
        let mut overlay = editing(bound_overlay());

        let n = overlay.dispatch(set_field("contact", "email", json!("nope")));
        assert!(n.is_error());

        let n = overlay.dispatch(set_field("projects", "items", json!("{\"unparsed\": ")));
        assert!(n.is_error());

        overlay.dispatch(OverlayAction::Save);
        assert_eq!(overlay.store().published().get("contact.email"), None);
        assert_eq!(overlay.store().published().get("projects.items"), None);
    }

    #[test]
    fn test_commit_field_decodes_declared_type() {
        let mut overlay = editing(bound_overlay());

        let n = overlay.dispatch(OverlayAction::CommitField {
            section: "about".to_string(),
            path: "years".to_string(),
            value: json!("7"),
        });
        assert!(!n.is_error());
        assert_eq!(overlay.store().get("about.years"), Some(&json!(7)));

        let n = overlay.dispatch(OverlayAction::CommitField {
            section: "about".to_string(),
            path: "years".to_string(),
            value: json!("seven"),
        });
        assert!(n.is_error());
        assert_eq!(overlay.store().get("about.years"), Some(&json!(7)));

        assert!(matches!(
            overlay.commit_field("about", "nickname", &json!("x")),
            Err(ContentError::UnboundField(_))
        ));
    }

    #[test]
    fn test_merge_into_bound_section_is_checked() {
        let mut overlay = editing(bound_overlay());
        let merge = |record: Value| ContentMutation::MergeSection {
            section: "contact".to_string(),
            record: record.as_object().cloned().unwrap(),
        };

        assert!(matches!(
            overlay.apply_mutation(&merge(json!({ "email": "nope" }))),
            Err(ContentError::Validation(_))
        ));
        overlay
            .apply_mutation(&merge(json!({ "email": "me@site.dev", "phone": "555" })))
            .unwrap();

        assert_eq!(overlay.store().get("contact.email"), Some(&json!("me@site.dev")));
        assert_eq!(overlay.store().get("contact.phone"), Some(&json!("555")));
    }

    #[test]
    fn test_unbound_fields_accept_raw_values() {
        let mut overlay = editing(bound_overlay());

        let n = overlay.dispatch(set_field("contact", "notes", json!({ "any": ["shape"] })));
        assert!(!n.is_error());
        assert_eq!(overlay.store().get("contact.notes"), Some(&json!({ "any": ["shape"] })));
    }

    #[test]
    fn test_bound_write_needs_edit_mode() {
        let mut overlay = bound_overlay();
        sign_in(&mut overlay);

        assert!(matches!(
            overlay.commit_field("contact", "email", &json!("a@b.c")),
            Err(ContentError::EditModeInactive)
        ));
    }

    #[test]
    fn test_action_wire_format() {
        let action: OverlayAction =
            serde_json::from_str(r#"{"action":"removeSection","section":"blog"}"#).unwrap();
        assert_eq!(
            action,
            OverlayAction::RemoveSection {
                section: "blog".to_string()
            }
        );

        let action: OverlayAction = serde_json::from_str(
            r#"{"action":"commitField","section":"about","path":"title","value":"Hi"}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            OverlayAction::CommitField {
                section: "about".to_string(),
                path: "title".to_string(),
                value: json!("Hi"),
            }
        );
    }
}

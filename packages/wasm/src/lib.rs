use folio_content::{
    AdminCredentials, ContentStore, MemoryStorage, Overlay, OverlayAction, RefreshOutcome,
    SessionGate, Storage, SITE_CONTENT_KEY,
};
use folio_render::{portfolio_page, render_page, Page, RenderOptions};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// The editing overlay hosted in the page itself. The host mirrors
/// [`FolioOverlay::stored_content`] into `localStorage` after every action
/// and feeds `storage` events back through `syncFromStorage`.
#[wasm_bindgen]
pub struct FolioOverlay {
    overlay: Overlay,
    storage: MemoryStorage,
    page: Page,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionInfo {
    is_admin: bool,
    is_edit_mode: bool,
    dirty: bool,
}

#[wasm_bindgen]
impl FolioOverlay {
    /// `stored` is the current `siteContent` record, if any
    #[wasm_bindgen(constructor)]
    pub fn new(
        admin_email: &str,
        admin_password_sha256: &str,
        stored: Option<String>,
    ) -> Result<FolioOverlay, JsValue> {
        Self::create(admin_email, admin_password_sha256, stored).map_err(|e| JsValue::from_str(&e))
    }

    /// Run an action given as JSON (`{"action": "save"}`) and return the
    /// resulting notification as JSON
    pub fn dispatch(&mut self, action_json: &str) -> Result<String, JsValue> {
        self.try_dispatch(action_json).map_err(|e| JsValue::from_str(&e))
    }

    /// `{isAdmin, isEditMode, dirty}` as JSON
    pub fn session(&self) -> String {
        let state = self.overlay.session();
        let info = SessionInfo {
            is_admin: state.is_admin,
            is_edit_mode: state.is_edit_mode,
            dirty: self.overlay.store().is_dirty(),
        };
        serde_json::to_string(&info).unwrap_or_default()
    }

    /// Value at a full path as the current viewer sees it, as JSON
    pub fn get(&self, path: &str) -> Option<String> {
        self.overlay
            .view()
            .get(path)
            .and_then(|value| serde_json::to_string(value).ok())
    }

    #[wasm_bindgen(js_name = renderPage)]
    pub fn render_page_js(&self) -> Result<String, JsValue> {
        render_page(&self.page, &self.overlay, RenderOptions::default())
            .map_err(|e| JsValue::from_str(&format!("Render error: {}", e)))
    }

    /// The durable `siteContent` record to persist in the host
    #[wasm_bindgen(js_name = storedContent)]
    pub fn stored_content(&self) -> Option<String> {
        self.storage.read(SITE_CONTENT_KEY).ok().flatten()
    }

    /// Adopt a record another tab wrote. Returns `unchanged`, `adopted`
    /// or `diverged`.
    #[wasm_bindgen(js_name = syncFromStorage)]
    pub fn sync_from_storage(&mut self, raw: &str) -> Result<String, JsValue> {
        self.try_sync(raw).map_err(|e| JsValue::from_str(&e))
    }
}

impl FolioOverlay {
    fn create(email: &str, password_sha256: &str, stored: Option<String>) -> Result<Self, String> {
        let storage = match stored {
            Some(raw) => MemoryStorage::with_record(SITE_CONTENT_KEY, &raw),
            None => MemoryStorage::new(),
        };

        let store = ContentStore::load(Box::new(storage.clone())).map_err(|e| e.to_string())?;
        let credentials = AdminCredentials {
            email: email.to_string(),
            password_sha256: password_sha256.to_string(),
        };

        let page = portfolio_page();
        let overlay =
            Overlay::new(store, SessionGate::new(credentials)).with_bindings(page.bindings().cloned());

        Ok(Self {
            overlay,
            storage,
            page,
        })
    }

    fn try_dispatch(&mut self, action_json: &str) -> Result<String, String> {
        let action: OverlayAction =
            serde_json::from_str(action_json).map_err(|e| format!("Invalid action: {}", e))?;
        let notification = self.overlay.dispatch(action);
        serde_json::to_string(&notification).map_err(|e| format!("Serialization error: {}", e))
    }

    fn try_sync(&mut self, raw: &str) -> Result<String, String> {
        self.storage
            .write(SITE_CONTENT_KEY, raw)
            .map_err(|e| e.to_string())?;

        let (store, _) = self.overlay.parts_mut();
        let outcome = store.refresh_from_storage().map_err(|e| e.to_string())?;
        Ok(match outcome {
            RefreshOutcome::Unchanged => "unchanged",
            RefreshOutcome::Adopted => "adopted",
            RefreshOutcome::Diverged => "diverged",
        }
        .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_content::hash_password;
    use serde_json::{json, Value};

    fn overlay(stored: Option<&str>) -> FolioOverlay {
        FolioOverlay::create("me@site.dev", &hash_password("pw"), stored.map(str::to_string)).unwrap()
    }

    fn dispatch(overlay: &mut FolioOverlay, action: Value) -> Value {
        let out = overlay.try_dispatch(&action.to_string()).unwrap();
        serde_json::from_str(&out).unwrap()
    }

    #[test]
    fn test_edit_and_save_updates_stored_record() {
        let mut overlay = overlay(Some(r#"{"about":{"title":"Old"}}"#));

        let n = dispatch(&mut overlay, json!({ "action": "login", "email": "me@site.dev", "password": "pw" }));
        assert_eq!(n["kind"], json!("success"));
        dispatch(&mut overlay, json!({ "action": "toggleEditMode" }));
        dispatch(
            &mut overlay,
            json!({
                "action": "mutate",
                "mutation": { "type": "setField", "section": "about", "path": "title", "value": "New" }
            }),
        );

        assert_eq!(overlay.get("about.title"), Some("\"New\"".to_string()));
        assert!(overlay.stored_content().unwrap().contains("Old"));

        dispatch(&mut overlay, json!({ "action": "save" }));
        assert!(overlay.stored_content().unwrap().contains("New"));

        let session: Value = serde_json::from_str(&overlay.session()).unwrap();
        assert_eq!(session, json!({ "isAdmin": true, "isEditMode": false, "dirty": false }));
    }

    #[test]
    fn test_field_commits_follow_page_bindings() {
        let mut overlay = overlay(None);
        dispatch(&mut overlay, json!({ "action": "login", "email": "me@site.dev", "password": "pw" }));
        dispatch(&mut overlay, json!({ "action": "toggleEditMode" }));

        let n = dispatch(
            &mut overlay,
            json!({ "action": "commitField", "section": "contact", "path": "email", "value": "nope" }),
        );
        assert_eq!(n["kind"], json!("error"));

        let n = dispatch(
            &mut overlay,
            json!({
                "action": "mutate",
                "mutation": { "type": "setField", "section": "projects", "path": "items", "value": "{" }
            }),
        );
        assert_eq!(n["kind"], json!("error"));

        let n = dispatch(
            &mut overlay,
            json!({ "action": "commitField", "section": "contact", "path": "email", "value": "me@site.dev" }),
        );
        assert_eq!(n["kind"], json!("success"));
        assert_eq!(overlay.get("contact.email"), Some("\"me@site.dev\"".to_string()));
        assert_eq!(overlay.get("projects.items"), None);
    }

    #[test]
    fn test_rejected_action_is_error_notification() {
        let mut overlay = overlay(None);
        let n = dispatch(&mut overlay, json!({ "action": "save" }));
        assert_eq!(n["kind"], json!("error"));
        assert!(overlay.try_dispatch("{\"action\": \"fly\"}").is_err());
    }

    #[test]
    fn test_sync_from_another_tab() {
        let mut overlay = overlay(None);
        let outcome = overlay
            .try_sync(r#"{"contact":{"email":"a@b.com"}}"#)
            .unwrap();

        assert_eq!(outcome, "adopted");
        assert_eq!(overlay.get("contact.email"), Some("\"a@b.com\"".to_string()));

        let again = overlay
            .try_sync(r#"{"contact":{"email":"a@b.com"}}"#)
            .unwrap();
        assert_eq!(again, "unchanged");
    }
}

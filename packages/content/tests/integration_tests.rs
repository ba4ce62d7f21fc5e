//! Integration tests for the content crate

use folio_content::{
    AdminCredentials, Binding, ContentDocument, ContentStore, DirectoryStorage, FeatureGate,
    FieldValue, MemoryStorage, SectionRecord, SessionGate, Storage, FEATURES_SECTION,
    SITE_CONTENT_KEY,
};
use serde_json::{json, Value};

fn record(value: Value) -> SectionRecord {
    value.as_object().cloned().unwrap()
}

fn admin_gate() -> SessionGate {
    let mut gate = SessionGate::new(AdminCredentials::new("owner@folio.dev", "letmein"));
    gate.login("owner@folio.dev", "letmein").unwrap();
    gate
}

fn editing_gate() -> SessionGate {
    let mut gate = admin_gate();
    gate.toggle_edit_mode();
    gate
}

#[test]
fn test_scenario_update_then_get() {
    let mut store = ContentStore::load(Box::new(MemoryStorage::new())).unwrap();
    let gate = editing_gate();

    store
        .update_content(&gate, "about", record(json!({ "title": "About Me" })))
        .unwrap();

    assert_eq!(store.get("about.title"), Some(&json!("About Me")));
}

#[test]
fn test_scenario_disabled_feature_renders_fallback() {
    let mut store = ContentStore::load(Box::new(MemoryStorage::new())).unwrap();
    let gate = editing_gate();

    store
        .update_content(&gate, FEATURES_SECTION, record(json!({ "whatsapp": false })))
        .unwrap();

    let whatsapp = FeatureGate::new("whatsapp", true);
    let rendered = whatsapp.select(store.document(), "<a class=\"whatsapp\">", "<span></span>");
    assert_eq!(rendered, "<span></span>");
}

#[test]
fn test_scenario_import_then_reload() {
    let storage = MemoryStorage::new();
    let mut store = ContentStore::load(Box::new(storage.clone())).unwrap();
    let mut gate = editing_gate();

    store
        .import_content(&mut gate, r#"{"contact": {"email": "a@b.com"}}"#)
        .unwrap();

    assert_eq!(store.get("contact.email"), Some(&json!("a@b.com")));
    assert!(!store.is_dirty());
    assert!(!gate.is_edit_mode());

    // A fresh load sees the same document
    let reloaded = ContentStore::load(Box::new(storage)).unwrap();
    assert_eq!(reloaded.get("contact.email"), Some(&json!("a@b.com")));
}

#[test]
fn test_scenario_last_writer_wins() {
    let storage = MemoryStorage::new();
    let mut first = ContentStore::load(Box::new(storage.clone())).unwrap();
    let mut second = ContentStore::load(Box::new(storage.clone())).unwrap();
    let mut first_gate = editing_gate();
    let mut second_gate = editing_gate();

    first
        .update_content(&first_gate, "about", record(json!({ "title": "First", "bio": "B1" })))
        .unwrap();
    second
        .update_content(&second_gate, "about", record(json!({ "title": "Second" })))
        .unwrap();

    first.save_changes(&mut first_gate).unwrap();
    second.save_changes(&mut second_gate).unwrap();

    let persisted = ContentDocument::from_json_str(&storage.read(SITE_CONTENT_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(&persisted, second.document());
    // No merge: the first session's bio is gone
    assert_eq!(persisted.get("about.bio"), None);
}

#[test]
fn test_save_is_idempotent() {
    let storage = MemoryStorage::new();
    let mut store = ContentStore::load(Box::new(storage.clone())).unwrap();
    let mut gate = editing_gate();

    store
        .update_content(&gate, "skills", record(json!({ "items": ["Rust", "SQL"], "years": 7 })))
        .unwrap();

    store.save_changes(&mut gate).unwrap();
    let first = storage.read(SITE_CONTENT_KEY).unwrap();
    store.save_changes(&mut gate).unwrap();
    let second = storage.read(SITE_CONTENT_KEY).unwrap();

    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn test_reset_law_after_save() {
    let storage = MemoryStorage::with_record(SITE_CONTENT_KEY, r#"{"about":{"title":"Loaded"}}"#);
    let mut store = ContentStore::load(Box::new(storage)).unwrap();
    let mut gate = editing_gate();

    // Reset with no save restores the loaded state
    store
        .update_content(&gate, "about", record(json!({ "title": "Scratch" })))
        .unwrap();
    store.reset_changes(&mut gate).unwrap();
    assert_eq!(store.get("about.title"), Some(&json!("Loaded")));

    // Reset after a save restores the saved state
    gate.toggle_edit_mode();
    store
        .update_content(&gate, "about", record(json!({ "title": "Saved" })))
        .unwrap();
    store.save_changes(&mut gate).unwrap();
    let saved = store.document().clone();

    gate.toggle_edit_mode();
    store
        .update_content(&gate, "projects", record(json!({ "list": [] })))
        .unwrap();
    store.reset_changes(&mut gate).unwrap();

    assert_eq!(store.document(), &saved);
}

#[test]
fn test_directory_backed_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let storage = DirectoryStorage::open(dir.path()).unwrap();

    let mut store = ContentStore::load(Box::new(storage.clone())).unwrap();
    let mut gate = editing_gate();

    let binding = Binding::text("hero", "headline");
    binding
        .commit(&mut store, &gate, &FieldValue::Text("Building things".to_string()))
        .unwrap();
    store.save_changes(&mut gate).unwrap();

    let on_disk = std::fs::read_to_string(storage.record_path(SITE_CONTENT_KEY)).unwrap();
    assert_eq!(on_disk, r#"{"hero":{"headline":"Building things"}}"#);

    let reopened = ContentStore::load(Box::new(DirectoryStorage::open(dir.path()).unwrap())).unwrap();
    assert_eq!(reopened.published().get("hero.headline"), Some(&json!("Building things")));
}

#[test]
fn test_logout_blocks_further_writes() {
    let mut store = ContentStore::load(Box::new(MemoryStorage::new())).unwrap();
    let mut gate = editing_gate();

    gate.logout();
    let result = store.update_content(&gate, "about", record(json!({ "title": "x" })));

    assert!(result.unwrap_err().is_authorization());
    assert!(store.document().is_empty());
}

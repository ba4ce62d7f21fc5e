//! # Folio Content
//!
//! In-page content editing core for the folio site.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ pages: Binding per editable piece of copy   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ content: store + session gate + bindings    │
//! │  - Resolve values (stored → default → fallback)
//! │  - Gate every write on admin + edit mode    │
//! │  - Optimistic in-memory edits               │
//! │  - Save / reset against one snapshot        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ storage: "siteContent" record               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **One source of truth for authorization**: the [`SessionGate`]
//! 2. **Visitors see the last save**: unsaved edits live only in memory
//! 3. **Typed values**: stored JSON is decoded per declared [`FieldType`]
//! 4. **Last writer wins**: no merging between sessions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_content::{AdminCredentials, Binding, ContentStore, FieldEditor, SessionGate};
//! use folio_common::DirectoryStorage;
//!
//! let storage = DirectoryStorage::open(".folio")?;
//! let mut store = ContentStore::load(Box::new(storage))?;
//! let mut gate = SessionGate::new(AdminCredentials::new("me@site.dev", "secret"));
//!
//! gate.login("me@site.dev", "secret")?;
//! gate.toggle_edit_mode();
//!
//! let mut editor = FieldEditor::new(Binding::text("about", "title"));
//! editor.begin_edit(&store, &gate);
//! // ... mutate editor.draft_mut() ...
//! editor.commit(&mut store, &gate)?;
//!
//! store.save_changes(&mut gate)?;
//! ```

mod binding;
mod document;
mod draft;
mod editor;
mod errors;
mod field;
mod mutations;
mod overlay;
pub mod path;
mod session;
mod store;

pub use binding::{Binding, FeatureGate, Resolved, SectionVisibility, Validator};
pub use document::{
    split_full_path, ContentDocument, SectionId, SectionRecord, FEATURES_SECTION, REMOVED_FIELD,
    VISIBLE_FIELD,
};
pub use draft::{data_uri, mime_for_path, Draft, ImageDraft, JsonDraft, ListDraft};
pub use editor::{EditorState, FieldEditor};
pub use errors::ContentError;
pub use field::{parse_number, FieldError, FieldType, FieldValue, Link};
pub use mutations::ContentMutation;
pub use overlay::{Notification, Overlay, OverlayAction, ToolbarButton};
pub use path::PathError;
pub use session::{hash_password, AdminCredentials, SessionGate, SessionState};
pub use store::{ContentStore, ExportFile, RefreshOutcome, SITE_CONTENT_KEY};

// Re-export storage types for convenience
pub use folio_common::{DirectoryStorage, MemoryStorage, Storage, StorageError};

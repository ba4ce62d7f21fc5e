//! # Content Store
//!
//! Owns the working [`ContentDocument`] and the snapshot of what was last
//! persisted.
//!
//! ## Lifecycle
//!
//! ```text
//! load ──▶ edit (in memory) ──▶ save ──▶ storage + snapshot
//!               │
//!               └──▶ reset ──▶ working copy = snapshot
//! ```
//!
//! Edits apply to the working copy immediately; storage only changes on
//! save or import. Visitors read [`ContentStore::published`], the admin
//! reads [`ContentStore::document`].

use crate::document::{ContentDocument, SectionRecord};
use crate::{ContentError, ContentMutation, SessionGate};
use chrono::{Local, NaiveDate};
use folio_common::{Storage, StorageError};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Storage key of the content document
pub const SITE_CONTENT_KEY: &str = "siteContent";

/// A downloadable export of the working document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// What [`ContentStore::refresh_from_storage`] observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Storage matches the snapshot
    Unchanged,
    /// Storage changed and the clean working copy now follows it
    Adopted,
    /// Storage changed but unsaved edits were kept
    Diverged,
}

pub struct ContentStore {
    storage: Box<dyn Storage>,
    document: ContentDocument,
    snapshot: ContentDocument,
    /// Increments on every in-memory change
    version: u64,
}

impl ContentStore {
    /// Load from storage. A missing or unparsable record starts empty.
    pub fn load(storage: Box<dyn Storage>) -> Result<Self, ContentError> {
        let document = read_persisted(storage.as_ref())?;
        info!(sections = document.section_ids().count(), "Loaded site content");

        Ok(Self {
            storage,
            snapshot: document.clone(),
            document,
            version: 0,
        })
    }

    /// Working copy (what the admin sees while editing)
    pub fn document(&self) -> &ContentDocument {
        &self.document
    }

    /// Last persisted copy (what visitors see)
    pub fn published(&self) -> &ContentDocument {
        &self.snapshot
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Working copy differs from the last save
    pub fn is_dirty(&self) -> bool {
        self.document != self.snapshot
    }

    pub fn get(&self, full_path: &str) -> Option<&Value> {
        self.document.get(full_path)
    }

    pub fn section(&self, section: &str) -> Option<&SectionRecord> {
        self.document.section(section)
    }

    /// Shallow-merge `partial` into a section of the working copy
    pub fn update_content(
        &mut self,
        gate: &SessionGate,
        section: &str,
        partial: SectionRecord,
    ) -> Result<(), ContentError> {
        if let Err(e) = gate.authorize_edit() {
            warn!(section, error = %e, "Rejected content update");
            return Err(e);
        }

        self.document.merge_section(section, partial);
        self.version += 1;
        debug!(section, version = self.version, "Updated section");
        Ok(())
    }

    /// Apply a mutation to the working copy
    pub fn apply(&mut self, gate: &SessionGate, mutation: &ContentMutation) -> Result<(), ContentError> {
        if let Err(e) = gate.authorize_edit() {
            warn!(mutation = mutation.name(), error = %e, "Rejected mutation");
            return Err(e);
        }

        mutation.apply(&mut self.document)?;
        self.version += 1;
        debug!(
            mutation = mutation.name(),
            section = mutation.section(),
            version = self.version,
            "Applied mutation"
        );
        Ok(())
    }

    /// Persist the working copy and make it the snapshot. Ends edit mode.
    pub fn save_changes(&mut self, gate: &mut SessionGate) -> Result<(), ContentError> {
        gate.authorize_admin()?;

        let json = self.document.to_json_string()?;
        self.storage.write(SITE_CONTENT_KEY, &json)?;
        self.snapshot = self.document.clone();
        gate.end_edit_mode();

        info!(version = self.version, "Saved site content");
        Ok(())
    }

    /// Discard unsaved edits. Ends edit mode.
    pub fn reset_changes(&mut self, gate: &mut SessionGate) -> Result<(), ContentError> {
        gate.authorize_admin()?;

        if self.is_dirty() {
            self.document = self.snapshot.clone();
            self.version += 1;
        }
        gate.end_edit_mode();

        info!("Reset site content to last save");
        Ok(())
    }

    /// Pretty-printed export named with today's date
    pub fn export_content(&self) -> Result<ExportFile, ContentError> {
        self.export_content_on(Local::now().date_naive())
    }

    pub fn export_content_on(&self, date: NaiveDate) -> Result<ExportFile, ContentError> {
        Ok(ExportFile {
            file_name: format!("site-content-{}.json", date.format("%Y-%m-%d")),
            contents: self.document.to_json_pretty()?,
        })
    }

    /// Replace stored content with an imported document, then reload
    /// from storage. Rejected input changes nothing.
    pub fn import_content(&mut self, gate: &mut SessionGate, json: &str) -> Result<(), ContentError> {
        gate.authorize_admin()?;

        let imported = parse_import(json)?;
        self.storage.write(SITE_CONTENT_KEY, &imported.to_json_string()?)?;

        // Same effect as a page reload: everything re-initializes from storage
        self.document = read_persisted(self.storage.as_ref())?;
        self.snapshot = self.document.clone();
        self.version += 1;
        gate.end_edit_mode();

        info!(sections = self.document.section_ids().count(), "Imported site content");
        Ok(())
    }

    /// Re-read storage to pick up writes from another session.
    /// Unsaved edits are never overwritten.
    pub fn refresh_from_storage(&mut self) -> Result<RefreshOutcome, ContentError> {
        let persisted = read_persisted(self.storage.as_ref())?;
        if persisted == self.snapshot {
            return Ok(RefreshOutcome::Unchanged);
        }

        if self.is_dirty() {
            warn!("Stored content changed while unsaved edits are pending");
            self.snapshot = persisted;
            return Ok(RefreshOutcome::Diverged);
        }

        self.document = persisted.clone();
        self.snapshot = persisted;
        self.version += 1;
        info!("Picked up site content saved elsewhere");
        Ok(RefreshOutcome::Adopted)
    }
}

fn read_persisted(storage: &dyn Storage) -> Result<ContentDocument, StorageError> {
    let Some(raw) = storage.read(SITE_CONTENT_KEY)? else {
        return Ok(ContentDocument::new());
    };

    match ContentDocument::from_json_str(&raw) {
        Ok(document) => Ok(document),
        Err(e) => {
            warn!(error = %e, "Stored site content is unreadable, starting empty");
            Ok(ContentDocument::new())
        }
    }
}

fn parse_import(json: &str) -> Result<ContentDocument, ContentError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ContentError::Import(format!("not valid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(ContentError::Import("expected a JSON object".to_string()));
    }

    ContentDocument::from_value(value)
        .map_err(|e| ContentError::Import(format!("every section must be an object: {}", e)))
}

//! Error types for the content core

use crate::field::FieldError;
use crate::path::PathError;
use folio_common::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Not signed in as administrator")]
    NotAdmin,

    #[error("Edit mode is not active")]
    EditModeInactive,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Import rejected: {0}")]
    Import(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Field is not being edited")]
    NotEditing,

    #[error("No editable field at {0}")]
    UnboundField(String),
}

impl ContentError {
    /// Authorization failures are reported to the user and leave state untouched
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            ContentError::NotAdmin | ContentError::EditModeInactive | ContentError::InvalidCredentials
        )
    }
}

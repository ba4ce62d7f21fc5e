//! # Admin Session Gate
//!
//! Tracks whether this session belongs to the site administrator and
//! whether edit mode is on. Every content mutation is authorized here.
//!
//! ```text
//!            login ok               toggle
//! Visitor ──────────────▶ Admin ◀──────────▶ Admin + Editing
//!    ▲                      │                      │
//!    └──────── logout ──────┴────── logout ────────┘
//!                              save / reset / import end editing
//! ```
//!
//! Invariant: `is_edit_mode ⇒ is_admin`.

use crate::ContentError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_admin: bool,
    pub is_edit_mode: bool,
}

/// The single administrator account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCredentials {
    pub email: String,

    /// Lowercase hex SHA-256 of the password
    pub password_sha256: String,
}

impl AdminCredentials {
    /// Build credentials from a plaintext password
    pub fn new(email: impl Into<String>, password: &str) -> Self {
        Self {
            email: email.into(),
            password_sha256: hash_password(password),
        }
    }

    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
            && self.password_sha256.eq_ignore_ascii_case(&hash_password(password))
    }
}

pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct SessionGate {
    credentials: AdminCredentials,
    state: SessionState,
}

impl SessionGate {
    pub fn new(credentials: AdminCredentials) -> Self {
        Self {
            credentials,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_admin(&self) -> bool {
        self.state.is_admin
    }

    pub fn is_edit_mode(&self) -> bool {
        self.state.is_admin && self.state.is_edit_mode
    }

    pub fn credentials(&self) -> &AdminCredentials {
        &self.credentials
    }

    /// Check credentials; on mismatch nothing changes
    pub fn login(&mut self, email: &str, password: &str) -> Result<(), ContentError> {
        if !self.credentials.matches(email, password) {
            warn!(email, "Rejected admin login");
            return Err(ContentError::InvalidCredentials);
        }

        self.state.is_admin = true;
        info!(email, "Admin signed in");
        Ok(())
    }

    pub fn logout(&mut self) {
        if self.state.is_admin {
            info!("Admin signed out");
        }
        self.state = SessionState::default();
    }

    /// Flip edit mode. Returns the new value; a no-op for non-admins.
    pub fn toggle_edit_mode(&mut self) -> bool {
        if self.state.is_admin {
            self.state.is_edit_mode = !self.state.is_edit_mode;
            info!(edit_mode = self.state.is_edit_mode, "Edit mode toggled");
        }
        self.is_edit_mode()
    }

    pub(crate) fn end_edit_mode(&mut self) {
        self.state.is_edit_mode = false;
    }

    /// Admin with edit mode on: required for content writes
    pub fn authorize_edit(&self) -> Result<(), ContentError> {
        self.authorize_admin()?;
        if !self.state.is_edit_mode {
            return Err(ContentError::EditModeInactive);
        }
        Ok(())
    }

    /// Admin only: required for save, reset and import
    pub fn authorize_admin(&self) -> Result<(), ContentError> {
        if !self.state.is_admin {
            return Err(ContentError::NotAdmin);
        }
        Ok(())
    }
}

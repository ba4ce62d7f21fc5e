use crate::error::{ServerError, ServerResult};
use folio_content::{ContentError, Overlay, RefreshOutcome};
use folio_render::{Page, RenderOptions};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// The overlay plus the token of whoever signed into it
pub struct Session {
    pub overlay: Overlay,
    token: Option<String>,
}

impl Session {
    /// Issue a fresh admin token, replacing any previous one
    pub fn issue_token(&mut self) -> String {
        let token = Uuid::new_v4().to_string();
        self.token = Some(token.clone());
        token
    }

    pub fn revoke_token(&mut self) {
        self.token = None;
    }

    pub fn token_matches(&self, presented: Option<&str>) -> bool {
        match (&self.token, presented) {
            (Some(expected), Some(presented)) => expected == presented,
            _ => false,
        }
    }

    /// Bearer token must match the one issued on login
    pub fn require_token(&self, presented: Option<&str>) -> ServerResult<()> {
        if self.token_matches(presented) {
            Ok(())
        } else {
            Err(ServerError::Unauthorized)
        }
    }
}

/// Shared application state
pub struct AppState {
    session: Mutex<Session>,
    page: Page,
    render_options: RenderOptions,
}

impl AppState {
    /// The page's bindings are registered with the overlay
    pub fn new(overlay: Overlay, page: Page) -> Self {
        let overlay = overlay.with_bindings(page.bindings().cloned());
        Self {
            session: Mutex::new(Session {
                overlay,
                token: None,
            }),
            page,
            render_options: RenderOptions::default(),
        }
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    pub async fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn render_options(&self) -> RenderOptions {
        self.render_options.clone()
    }

    /// Pick up content another process saved to storage
    pub async fn refresh(&self) -> Result<RefreshOutcome, ContentError> {
        let mut session = self.session.lock().await;
        let (store, _) = session.overlay.parts_mut();
        let outcome = store.refresh_from_storage()?;
        match outcome {
            RefreshOutcome::Unchanged => debug!("Storage unchanged"),
            RefreshOutcome::Adopted => info!(version = store.version(), "Reloaded content from storage"),
            RefreshOutcome::Diverged => info!("Storage changed under unsaved edits"),
        }
        Ok(outcome)
    }
}

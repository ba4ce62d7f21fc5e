pub mod content;
pub mod init;
pub mod render;
pub mod serve;
pub mod transfer;

pub use content::{get, set, GetArgs, SetArgs};
pub use init::{init, InitArgs};
pub use render::{render, RenderArgs};
pub use serve::{serve, ServeArgs};
pub use transfer::{export, import, ExportArgs, ImportArgs};

use crate::config::Config;
use anyhow::{Context, Result};
use folio_content::{ContentStore, DirectoryStorage, Overlay, SessionGate};
use folio_render::portfolio_page;
use tracing::debug;

/// Overlay over the configured storage directory with the portfolio
/// page's bindings, nobody signed in
pub(crate) fn open_overlay(config: &Config, cwd: &str) -> Result<Overlay> {
    let dir = config.get_storage_dir(cwd);
    debug!(storage = %dir.display(), "Opening content store");
    let storage = DirectoryStorage::open(&dir)
        .with_context(|| format!("Cannot open storage at {}", dir.display()))?;
    let store = ContentStore::load(Box::new(storage))?;
    let overlay = Overlay::new(store, SessionGate::new(config.admin.clone()))
        .with_bindings(portfolio_page().bindings().cloned());
    Ok(overlay)
}

/// Sign in as the configured admin and turn edit mode on
pub(crate) fn start_editing(overlay: &mut Overlay, config: &Config, password: &str) -> Result<()> {
    let (_, gate) = overlay.parts_mut();
    gate.login(&config.admin.email, password)?;
    if !gate.is_edit_mode() {
        gate.toggle_edit_mode();
    }
    Ok(())
}

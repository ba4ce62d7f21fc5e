//! # Folio Server
//!
//! HTTP surface for the editing overlay. One [`Overlay`] is shared by every
//! request; the signed-in admin holds a bearer token issued on login and
//! every other caller gets the published content.
//!
//! [`Overlay`]: folio_content::Overlay

pub mod error;
pub mod routes;
pub mod state;
pub mod watcher;

pub use error::{ServerError, ServerResult};
pub use routes::{router, serve};
pub use state::AppState;
pub use watcher::{spawn_storage_sync, StorageWatcher, WatcherError, WatcherResult};

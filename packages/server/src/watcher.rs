use crate::state::AppState;
use folio_content::SITE_CONTENT_KEY;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Failed to create watcher: {0}")]
    CreateError(#[from] notify::Error),
}

pub type WatcherResult<T> = Result<T, WatcherError>;

/// Change notifications for a storage directory
pub struct StorageWatcher {
    _watcher: RecommendedWatcher,
    receiver: UnboundedReceiver<notify::Result<Event>>,
}

impl StorageWatcher {
    pub fn new(dir: &Path) -> WatcherResult<Self> {
        let (tx, rx) = unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Next event, or `None` once the watcher has shut down
    pub async fn next_event(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await? {
                Ok(event) => return Some(event),
                Err(e) => warn!(error = %e, "Storage watch error"),
            }
        }
    }
}

/// Whether an event touched the file backing `key`
pub fn touches_record(event: &Event, key: &str) -> bool {
    let file_name = format!("{}.json", key);
    event
        .paths
        .iter()
        .any(|p| p.file_name().and_then(|n| n.to_str()) == Some(file_name.as_str()))
}

/// Keep the shared store in step with storage written by other processes:
/// refresh when the content record changes on disk, and on every poll tick
/// in case a change notification was missed.
pub fn spawn_storage_sync(
    state: Arc<AppState>,
    storage_dir: &Path,
    poll_interval: Duration,
) -> WatcherResult<JoinHandle<()>> {
    let mut watcher = StorageWatcher::new(storage_dir)?;

    Ok(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = watcher.next_event() => match event {
                    Some(event) if touches_record(&event, SITE_CONTENT_KEY) => {
                        debug!(kind = ?event.kind, "Content record changed");
                        refresh(&state).await;
                    }
                    Some(_) => {}
                    None => {
                        warn!("Storage watcher stopped, polling only");
                        break;
                    }
                },
                _ = ticker.tick() => refresh(&state).await,
            }
        }

        loop {
            ticker.tick().await;
            refresh(&state).await;
        }
    }))
}

async fn refresh(state: &AppState) {
    if let Err(e) = state.refresh().await {
        warn!(error = %e, "Failed to refresh content from storage");
    }
}

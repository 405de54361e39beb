//! File watcher for repository state changes.
//!
//! Watches the repository's git metadata rather than the working tree:
//! `HEAD` (checkouts), `refs` (branch tips), and `packed-refs`. Events are
//! debounced so one rebase does not trigger a rebuild per touched ref.
//!
//! `WatcherState` is shared between the watcher callback thread and the
//! panel server; it backs the `/api/health` endpoint.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use eyre::{Result, WrapErr};
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// How long to wait for a change batch to settle before reporting it.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Event sent from the watcher to the rebuild loop.
#[derive(Debug)]
pub enum WatcherEvent {
    /// Repository state changed - contains the paths from the debounced
    /// batch.
    RepoChanged(Vec<PathBuf>),
}

/// Shared state for monitoring watcher health.
pub struct WatcherState {
    /// Whether the watcher is currently active and running.
    active: AtomicBool,

    /// Timestamp of last change event (millis since UNIX epoch).
    last_event_ms: AtomicU64,

    /// Count of change events received.
    event_count: AtomicU64,

    /// Error message if the watcher failed (None if healthy).
    error: RwLock<Option<String>>,
}

impl WatcherState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Mark the watcher as active (called on successful startup).
    pub fn mark_active(&self) {
        self.active.store(true, Ordering::SeqCst);
        *self.error.write().unwrap() = None;
    }

    /// Mark the watcher as failed with an error message.
    pub fn mark_failed(&self, error: String) {
        self.active.store(false, Ordering::SeqCst);
        *self.error.write().unwrap() = Some(error);
    }

    /// Record that a change event was received.
    pub fn record_event(&self) {
        self.event_count.fetch_add(1, Ordering::SeqCst);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        self.last_event_ms.store(now, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Last event timestamp (millis since epoch), or None if no events yet.
    pub fn last_event_ms(&self) -> Option<u64> {
        let ms = self.last_event_ms.load(Ordering::SeqCst);
        if ms == 0 { None } else { Some(ms) }
    }

    pub fn event_count(&self) -> u64 {
        self.event_count.load(Ordering::SeqCst)
    }

    pub fn error(&self) -> Option<String> {
        self.error.read().unwrap().clone()
    }
}

impl Default for WatcherState {
    fn default() -> Self {
        Self {
            active: AtomicBool::new(false),
            last_event_ms: AtomicU64::new(0),
            event_count: AtomicU64::new(0),
            error: RwLock::new(None),
        }
    }
}

/// Owns the debounced watcher; dropping it stops all watches.
pub struct WatcherManager {
    // Held for its Drop impl.
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl WatcherManager {
    /// Start watching `repo_root`'s git metadata. Debounced change batches
    /// are sent to `events`; a full channel drops the batch (a rebuild is
    /// already pending).
    pub fn start(
        repo_root: &Path,
        events: mpsc::Sender<WatcherEvent>,
        state: Arc<WatcherState>,
    ) -> Result<Self> {
        let handler_state = state.clone();
        let mut debouncer = new_debouncer(
            DEBOUNCE_WINDOW,
            move |result: DebounceEventResult| match result {
                Ok(batch) => {
                    handler_state.record_event();
                    let paths: Vec<PathBuf> = batch.into_iter().map(|e| e.path).collect();
                    if let Err(err) = events.try_send(WatcherEvent::RepoChanged(paths)) {
                        debug!("Dropping watcher event: {}", err);
                    }
                }
                Err(err) => {
                    warn!("Watch error: {}", err);
                    handler_state.mark_failed(err.to_string());
                }
            },
        )
        .wrap_err("Failed to create file watcher")?;

        let git_dir = repo_root.join(".git");
        watch_if_present(&mut debouncer, &git_dir.join("HEAD"), RecursiveMode::NonRecursive)?;
        watch_if_present(&mut debouncer, &git_dir.join("refs"), RecursiveMode::Recursive)?;
        watch_if_present(
            &mut debouncer,
            &git_dir.join("packed-refs"),
            RecursiveMode::NonRecursive,
        )?;

        state.mark_active();

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

fn watch_if_present(
    debouncer: &mut Debouncer<RecommendedWatcher>,
    path: &Path,
    mode: RecursiveMode,
) -> Result<()> {
    if !path.exists() {
        debug!("Not watching absent path: {}", path.display());
        return Ok(());
    }

    debouncer
        .watcher()
        .watch(path, mode)
        .wrap_err_with(|| format!("Failed to watch {}", path.display()))?;
    info!("Watching {}", path.display());
    Ok(())
}

//! HTTP server for the stax panel
//!
//! Serves a JSON API + a static shell (no build step) for interactive stack
//! exploration with live reload.
//!
//! ## API Endpoints
//!
//! - `GET /` - Static HTML shell
//! - `GET /api/graph` - Current stack graph
//! - `GET /api/config` - Repository and tool info
//! - `GET /api/version` - Snapshot counter for live-reload polling
//! - `GET /api/health` - Watcher health

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use eyre::{Result, WrapErr};
use owo_colors::OwoColorize;
use stax_api::{ApiConfigInfo, ApiHealth, ApiVersion, GraphData};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::data;
use crate::watcher::{WatcherManager, WatcherState};

const PANEL_HTML: &str = include_str!("panel.html");

struct AppState {
    repo_root: PathBuf,
    config: Config,
    graph: RwLock<GraphData>,
    /// Bumped only when the graph content actually changed, so an idle
    /// repository does not cause panel reflows.
    version: AtomicU64,
    watcher_state: Arc<WatcherState>,
}

/// Run the panel server until the process is killed.
pub async fn serve(repo_root: PathBuf, config: Config, open_panel: bool) -> Result<()> {
    let graph = {
        let root = repo_root.clone();
        let cfg = config.clone();
        tokio::task::spawn_blocking(move || data::load_graph(&root, &cfg))
            .await
            .wrap_err("Initial graph build panicked")??
    };

    let watcher_state = WatcherState::new();
    let (events_tx, events_rx) = mpsc::channel(16);
    let _watcher = WatcherManager::start(&repo_root, events_tx, watcher_state.clone())?;

    let state = Arc::new(AppState {
        repo_root,
        config,
        graph: RwLock::new(graph),
        version: AtomicU64::new(1),
        watcher_state,
    });

    tokio::spawn(rebuild_loop(state.clone(), events_rx));

    let app = Router::new()
        .route("/", get(panel))
        .route("/api/graph", get(api_graph))
        .route("/api/config", get(api_config))
        .route("/api/version", get(api_version))
        .route("/api/health", get(api_health))
        .with_state(state.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.serve.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", addr))?;

    let url = format!("http://{}", addr);
    eprintln!("{} Panel at {}", "->".blue().bold(), url.cyan());

    if open_panel && let Err(err) = open::that(&url) {
        warn!("Failed to open {}: {}", url, err);
    }

    axum::serve(listener, app).await.wrap_err("Server error")
}

/// One rebuild per debounced change batch. Rebuild failures keep the last
/// good graph; the next change tries again.
async fn rebuild_loop(state: Arc<AppState>, mut events: mpsc::Receiver<crate::watcher::WatcherEvent>) {
    while let Some(event) = events.recv().await {
        debug!("Change detected: {:?}", event);

        let root = state.repo_root.clone();
        let cfg = state.config.clone();
        match tokio::task::spawn_blocking(move || data::load_graph(&root, &cfg)).await {
            Ok(Ok(graph)) => {
                let changed = *state.graph.read().unwrap() != graph;
                if changed {
                    *state.graph.write().unwrap() = graph;
                    let version = state.version.fetch_add(1, Ordering::SeqCst) + 1;
                    info!("Graph updated (version {})", version);
                }
            }
            Ok(Err(err)) => error!("Failed to rebuild graph: {:#}", err),
            Err(err) => error!("Rebuild task panicked: {}", err),
        }
    }
}

async fn panel() -> Html<&'static str> {
    Html(PANEL_HTML)
}

async fn api_graph(State(state): State<Arc<AppState>>) -> Json<GraphData> {
    Json(state.graph.read().unwrap().clone())
}

async fn api_config(State(state): State<Arc<AppState>>) -> Json<ApiConfigInfo> {
    Json(ApiConfigInfo {
        repo_root: state.repo_root.display().to_string(),
        tool_command: state.config.tool.command_line(),
        trunk: state.config.trunk.clone(),
    })
}

async fn api_version(State(state): State<Arc<AppState>>) -> Json<ApiVersion> {
    Json(ApiVersion {
        version: state.version.load(Ordering::SeqCst),
    })
}

async fn api_health(State(state): State<Arc<AppState>>) -> Json<ApiHealth> {
    let watcher = &state.watcher_state;
    Json(ApiHealth {
        watcher_active: watcher.is_active(),
        event_count: watcher.event_count(),
        last_event_ms: watcher.last_event_ms(),
        error: watcher.error(),
    })
}

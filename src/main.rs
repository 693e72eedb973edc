//! Wiring & DI. Entry point: bootstrap adapters, inject into the sync engine, render the strip.
//! No business logic here.

use dotenv::dotenv;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wwdc_companion::adapters::api::{HttpApiClient, MockApiClient};
use wwdc_companion::adapters::indexing::TranscriptIndexer;
use wwdc_companion::adapters::persistence::JsonStore;
use wwdc_companion::adapters::ui::{RelatedSessionsPanel, TerminalSurface, progress};
use wwdc_companion::domain::SessionViewModel;
use wwdc_companion::ports::{ApiClientPort, StoragePort, TranscriptIndexerPort};
use wwdc_companion::shared::config::AppConfig;
use wwdc_companion::usecases::{MainQueue, SyncEngine, SyncEvent};

/// Upper bound for one sync cycle before giving up on waiting for its event.
const SYNC_WAIT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = &env_loaded {
        info!(path = %path.display(), "loaded .env");
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration, using defaults");
        AppConfig::default()
    });

    let data_path = PathBuf::from(cfg.data_dir_or_default());
    let store = Arc::new(JsonStore::new(&data_path));
    store
        .load()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let storage: Arc<dyn StoragePort> = store;

    let client: Arc<dyn ApiClientPort> = if cfg.is_offline() {
        warn!("offline mode, serving fixture content");
        Arc::new(MockApiClient::new())
    } else {
        let base_url = cfg.api_base_url_or_default();
        info!(url = %base_url, "using content service");
        Arc::new(HttpApiClient::new(base_url, cfg.endpoints()))
    };

    let indexer: Arc<dyn TranscriptIndexerPort> = Arc::new(TranscriptIndexer::new(
        Arc::clone(&storage),
        &cfg.transcript_language_or_default(),
    ));

    let engine = SyncEngine::new(
        Arc::clone(&storage),
        client,
        indexer,
        None,
        MainQueue::spawn(),
    );

    // Subscribed before any sync so the indexing run started by the content event is not missed.
    let indexing_running = engine.is_indexing_transcripts();
    let indexing_progress = engine.transcript_indexing_progress();

    // --- Content, then featured sections (chained by the engine) ---
    let mut events = engine.subscribe();
    engine.sync_content();

    let content_event = wait_for_event(&mut events).await?;
    if let Some(e) = content_event.error() {
        anyhow::bail!("content sync failed: {}", e);
    }
    let featured_event = wait_for_event(&mut events).await?;
    if let Some(e) = featured_event.error() {
        warn!(error = %e, "featured sections unavailable");
    }

    // --- Live videos (no event; completion only) ---
    let (live_tx, live_rx) = oneshot::channel();
    engine.sync_live_videos(Some(Box::new(move || {
        let _ = live_tx.send(());
    })));
    let _ = tokio::time::timeout(SYNC_WAIT, live_rx).await;
    info!(
        live = storage.live_videos().await.len(),
        "live video sync finished"
    );

    // --- Transcript indexing was kicked off by the content event ---
    progress::track_indexing(indexing_progress, indexing_running).await;

    // --- Related sessions strip ---
    let panel = RelatedSessionsPanel::new();
    panel.set_title(Some("Related Sessions"));
    panel.set_sessions(related_view_models(&cfg, storage.as_ref()).await);
    panel.scroll_to_beginning();
    TerminalSurface::new().render(&mut stdout(), &panel)?;

    Ok(())
}

async fn wait_for_event(rx: &mut broadcast::Receiver<SyncEvent>) -> anyhow::Result<SyncEvent> {
    let event = tokio::time::timeout(SYNC_WAIT, rx.recv())
        .await
        .map_err(|_| anyhow::anyhow!("timed out waiting for sync"))??;
    Ok(event)
}

/// View-models for the configured session's related sessions, or for the first
/// featured session when none is configured.
async fn related_view_models(cfg: &AppConfig, storage: &dyn StoragePort) -> Vec<SessionViewModel> {
    let content = storage.content().await;
    let focus_id = match &cfg.session_id {
        Some(id) => Some(id.clone()),
        None => storage
            .featured_sections()
            .await
            .into_iter()
            .find_map(|section| section.session_ids.into_iter().next()),
    };
    let Some(focus) = focus_id.and_then(|id| content.sessions.iter().find(|s| s.id == id)) else {
        warn!("no session to show related sessions for");
        return Vec::new();
    };

    focus
        .related_ids
        .iter()
        .filter_map(|id| content.sessions.iter().find(|s| &s.id == id))
        .map(|s| SessionViewModel::from_session(s, &content))
        .collect()
}

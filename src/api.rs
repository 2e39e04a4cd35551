//! # HTTP Surface
//! Axum router wiring the engine to its collaborators: the acquisition side
//! POSTs article batches, the dashboard polls the published value and gauge
//! geometry, and operators can reload the index configuration at runtime.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::warn;

use crate::aggregate::AggregateError;
use crate::article::{Article, ArticleStore};
use crate::config::ConfigHandle;
use crate::gauge::{render_spec, GaugeSpec};
use crate::output::{self, GsiValuePayload};
use crate::pipeline::{self, IndexSnapshot};
use crate::scores::ScoreProvider;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ArticleStore>,
    pub config: ConfigHandle,
    pub provider: Arc<dyn ScoreProvider>,
    /// Last successful run; `/gsi` and `/gauge` read this.
    pub last: Arc<RwLock<Option<IndexSnapshot>>>,
}

impl AppState {
    pub fn new(config: ConfigHandle, provider: Arc<dyn ScoreProvider>) -> Self {
        Self {
            store: Arc::new(ArticleStore::new()),
            config,
            provider,
            last: Arc::new(RwLock::new(None)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/articles", post(ingest_articles).get(list_articles))
        .route("/refresh", post(refresh))
        .route("/gsi", get(current_gsi))
        .route("/gauge", get(current_gauge))
        .route("/admin/reload-config", get(admin_reload_config))
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct IngestResp {
    corpus_size: usize,
}

/// Merge a batch from the acquisition collaborator. Idempotent by design:
/// replaying the same batch leaves the corpus unchanged.
async fn ingest_articles(
    State(state): State<AppState>,
    Json(batch): Json<Vec<Article>>,
) -> Json<IngestResp> {
    let corpus_size = state.store.merge_batch(&batch);
    Json(IngestResp { corpus_size })
}

async fn list_articles(State(state): State<AppState>) -> Json<Vec<Article>> {
    Json(state.store.snapshot())
}

/// Run one aggregation pass over the current corpus.
async fn refresh(
    State(state): State<AppState>,
) -> Result<Json<GsiValuePayload>, (StatusCode, String)> {
    let articles = state.store.snapshot();
    let cfg = state.config.current();
    let now = Utc::now();

    let snapshot = pipeline::run_once(&articles, state.provider.as_ref(), &cfg, now)
        .await
        .map_err(|e| match e.downcast_ref::<AggregateError>() {
            Some(AggregateError::EmptyCorpus) => (StatusCode::CONFLICT, e.to_string()),
            None => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        })?;

    // Persist artifacts only when explicitly enabled; the API itself stays
    // side-effect free for tests and read-only deploys.
    if std::env::var("GSI_PERSIST").ok().as_deref() == Some("1") {
        if let Err(e) = output::write_results(&snapshot, &PathBuf::from(output::RESULTS_PATH)) {
            warn!(error = ?e, "failed to write results file");
        }
        if let Err(e) = output::write_gsi_value(&snapshot, &PathBuf::from(output::GSI_VALUE_PATH)) {
            warn!(error = ?e, "failed to write gsi value file");
        }
    }

    let payload = GsiValuePayload::from_snapshot(&snapshot);
    *state.last.write().expect("snapshot lock poisoned") = Some(snapshot);
    Ok(Json(payload))
}

async fn current_gsi(
    State(state): State<AppState>,
) -> Result<Json<GsiValuePayload>, (StatusCode, String)> {
    let guard = state.last.read().expect("snapshot lock poisoned");
    match guard.as_ref() {
        Some(snap) => Ok(Json(GsiValuePayload::from_snapshot(snap))),
        None => Err((
            StatusCode::NOT_FOUND,
            "no index computed yet; POST /refresh first".to_string(),
        )),
    }
}

async fn current_gauge(
    State(state): State<AppState>,
) -> Result<Json<GaugeSpec>, (StatusCode, String)> {
    let cfg = state.config.current();
    let guard = state.last.read().expect("snapshot lock poisoned");
    match guard.as_ref() {
        Some(snap) => Ok(Json(render_spec(snap.nw_norm, &cfg.thresholds))),
        None => Err((
            StatusCode::NOT_FOUND,
            "no index computed yet; POST /refresh first".to_string(),
        )),
    }
}

async fn admin_reload_config(
    State(state): State<AppState>,
) -> Result<&'static str, (StatusCode, String)> {
    state
        .config
        .reload()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("reload failed: {e:#}")))?;
    Ok("reloaded")
}

//! Gold Sentiment Index — Binary Entrypoint
//! Boots the Axum HTTP service: index configuration, score provider seam,
//! article store, and the Prometheus exporter.

use std::path::PathBuf;
use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gold_sentiment_index::api::{self, AppState};
use gold_sentiment_index::config::{ConfigHandle, IndexConfig, DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH};
use gold_sentiment_index::metrics::Metrics;
use gold_sentiment_index::scores::{HttpScoreProvider, ScoreProvider, StaticScoreProvider};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - GSI_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("GSI_DEV_LOG").ok().is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gsi=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Score provider from the environment: a remote FinBERT-style endpoint when
/// GSI_SCORE_ENDPOINT is set, otherwise an empty static provider (every text
/// scores neutral, so /refresh reports insufficient signal instead of lying).
fn build_provider() -> Arc<dyn ScoreProvider> {
    match std::env::var("GSI_SCORE_ENDPOINT") {
        Ok(endpoint) if !endpoint.trim().is_empty() => {
            Arc::new(HttpScoreProvider::new(endpoint))
        }
        _ => Arc::new(StaticScoreProvider::new()),
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    // Invalid configuration must stop the boot, not a later run.
    let cfg = IndexConfig::load_default().expect("failed to load index config");
    let cfg_path = std::env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = if cfg_path.exists() {
        ConfigHandle::with_path(cfg.clone(), cfg_path)
    } else {
        ConfigHandle::new(cfg.clone())
    };

    let metrics = Metrics::init(cfg.sensitivity);

    let state = AppState::new(config, build_provider());
    let router = api::create_router(state).merge(metrics.router());

    Ok(router.into())
}

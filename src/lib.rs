// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod api;
pub mod article;
pub mod classify;
pub mod config;
pub mod gauge;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod scores;
pub mod weights;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{aggregate as aggregate_scores, Aggregate, AggregateError};
pub use crate::api::{create_router, AppState};
pub use crate::article::{Article, ArticleStore};
pub use crate::classify::{classify, Regime, RegimeThresholds};
pub use crate::config::{ConfigHandle, IndexConfig};
pub use crate::gauge::{render_spec, GaugeSpec};
pub use crate::pipeline::{compute_snapshot, run_once, IndexSnapshot};
pub use crate::scores::{ScoreProvider, SentimentScores, StaticScoreProvider};

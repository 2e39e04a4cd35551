//! # Aggregation Pipeline
//! One synchronous batch pass over an article snapshot: look up scores by
//! URL, validate, weigh, aggregate, classify. Per-article failures (missing
//! or malformed scores) are counted and skipped; corpus-level failure
//! (EmptyCorpus) halts the run without emitting a snapshot.
//!
//! `now` is always an explicit argument so the whole pass is deterministic
//! and testable without clock tricks.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregate::{aggregate, Aggregate, AggregateError};
use crate::article::Article;
use crate::classify::{classify, Regime};
use crate::config::IndexConfig;
use crate::scores::{ScoreProvider, SentimentScores};
use crate::weights::{impact_weight, recency_weight};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("gsi_runs_total", "Aggregation runs attempted.");
        describe_counter!(
            "gsi_articles_scored_total",
            "Articles that contributed a (scores, weight) pair to a run."
        );
        describe_counter!(
            "gsi_missing_score_total",
            "Articles skipped because the classifier supplied no scores."
        );
        describe_counter!(
            "gsi_out_of_range_total",
            "Articles skipped because a score component was outside [0,1]."
        );
        describe_counter!(
            "gsi_empty_corpus_total",
            "Runs aborted because no article carried non-zero weight."
        );
        describe_gauge!("gsi_value", "Current Gold Sentiment Index (0-100).");
        describe_gauge!("gsi_last_run_ts", "Unix ts of the last successful run.");
    });
}

/// Anonymized article id for logs: short SHA-256 prefix of the URL.
/// Raw URLs and text never reach the log stream.
fn anon_id(url: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Per-article audit record: everything needed to explain the article's
/// contribution to the index.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentResult {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub scores: SentimentScores,
    pub recency_weight: f64,
    pub impact_weight: f64,
    pub effective_weight: f64,
}

/// Observable skip counters for one run.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct SkipCounts {
    pub missing_score: usize,
    pub out_of_range: usize,
}

/// The authoritative output of one aggregation run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IndexSnapshot {
    /// When the run was performed (the caller's `now`).
    pub timestamp: DateTime<Utc>,
    /// Articles that contributed a weight pair (including zero-weight ones).
    pub count: usize,
    pub documents: Vec<DocumentResult>,
    pub nw: f64,
    pub nw_norm: f64,
    /// Published value; numerically identical to `nw_norm`.
    pub gsi: f64,
    pub classification: Regime,
    pub skipped: SkipCounts,
}

/// Compute one IndexSnapshot from a stable article snapshot and per-URL
/// scores. Articles without usable scores are excluded (counted, logged with
/// anonymized ids); the run fails only when nothing carries weight.
pub fn compute_snapshot(
    articles: &[Article],
    scores_by_url: &HashMap<String, SentimentScores>,
    cfg: &IndexConfig,
    now: DateTime<Utc>,
) -> Result<IndexSnapshot, AggregateError> {
    ensure_metrics_described();
    counter!("gsi_runs_total").increment(1);

    let mut skipped = SkipCounts::default();
    let mut documents = Vec::with_capacity(articles.len());
    let mut pairs = Vec::with_capacity(articles.len());

    for article in articles {
        let Some(scores) = scores_by_url.get(&article.url) else {
            skipped.missing_score += 1;
            counter!("gsi_missing_score_total").increment(1);
            debug!(id = %anon_id(&article.url), "no scores for article; skipped");
            continue;
        };
        if let Err(e) = scores.validate() {
            skipped.out_of_range += 1;
            counter!("gsi_out_of_range_total").increment(1);
            warn!(id = %anon_id(&article.url), error = %e, "malformed scores; article excluded");
            continue;
        }

        let recency = recency_weight(article.timestamp, now, &cfg.recency_bands);
        let impact = impact_weight(scores, &article.text(), cfg);
        let effective = recency * impact;

        pairs.push((*scores, effective));
        documents.push(DocumentResult {
            url: article.url.clone(),
            timestamp: article.timestamp,
            scores: *scores,
            recency_weight: recency,
            impact_weight: impact,
            effective_weight: effective,
        });
    }

    let Aggregate {
        nw, nw_norm, ..
    } = match aggregate(&pairs, cfg.sensitivity) {
        Ok(agg) => agg,
        Err(e) => {
            counter!("gsi_empty_corpus_total").increment(1);
            return Err(e);
        }
    };

    gauge!("gsi_value").set(nw_norm);
    gauge!("gsi_last_run_ts").set(now.timestamp() as f64);
    counter!("gsi_articles_scored_total").increment(documents.len() as u64);

    Ok(IndexSnapshot {
        timestamp: now,
        count: documents.len(),
        documents,
        nw,
        nw_norm,
        gsi: nw_norm,
        classification: classify(nw_norm, &cfg.thresholds),
        skipped,
    })
}

/// Async wrapper: score the snapshot through the provider seam, then run the
/// pure pass. Articles whose text is empty get no score request and fall out
/// as `missing_score`.
pub async fn run_once(
    articles: &[Article],
    provider: &dyn ScoreProvider,
    cfg: &IndexConfig,
    now: DateTime<Utc>,
) -> anyhow::Result<IndexSnapshot> {
    let mut urls = Vec::new();
    let mut texts = Vec::new();
    for a in articles {
        let text = a.text();
        if text.is_empty() {
            continue;
        }
        urls.push(a.url.clone());
        texts.push(text);
    }

    let scores = provider.score_batch(&texts).await?;
    let scores_by_url: HashMap<String, SentimentScores> =
        urls.into_iter().zip(scores).collect();

    compute_snapshot(articles, &scores_by_url, cfg, now).map_err(Into::into)
}

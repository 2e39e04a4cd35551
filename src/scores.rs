//! # Sentiment Scores
//! Per-article `(positive, negative, neutral)` probabilities as produced by a
//! FinBERT-style classifier collaborator, plus the provider seam used to
//! obtain them. Components are each expected in [0,1]; the triple is not
//! required to sum to 1 and callers must not assume it does.

use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Classifier output for one document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SentimentScores {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl SentimentScores {
    pub fn new(positive: f64, negative: f64, neutral: f64) -> Self {
        Self {
            positive,
            negative,
            neutral,
        }
    }

    /// Directional confidence: |positive - negative| in [0,1].
    pub fn margin(&self) -> f64 {
        (self.positive - self.negative).abs()
    }

    /// Reject triples with any component outside [0,1] (or non-finite).
    /// Malformed scores exclude the article rather than corrupt the aggregate.
    pub fn validate(&self) -> std::result::Result<(), ScoreError> {
        for v in [self.positive, self.negative, self.neutral] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(ScoreError::OutOfRange(*self));
            }
        }
        Ok(())
    }
}

/// A score triple the aggregator refuses to consume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreError {
    /// Some component is outside [0,1] or non-finite.
    OutOfRange(SentimentScores),
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::OutOfRange(s) => write!(
                f,
                "sentiment scores out of range: positive={}, negative={}, neutral={}",
                s.positive, s.negative, s.neutral
            ),
        }
    }
}

impl std::error::Error for ScoreError {}

/// The classification collaborator behind a seam so the pipeline can be
/// exercised without a model. Scores come back in input order, one per text.
#[async_trait::async_trait]
pub trait ScoreProvider: Send + Sync {
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<SentimentScores>>;
    fn name(&self) -> &'static str;
}

/// HTTP provider for a remote scoring endpoint.
///
/// Wire format: POST `{"texts": [...]}` → `{"scores": [{"positive": ..}, ..]}`.
pub struct HttpScoreProvider {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    texts: &'a [String],
}

#[derive(Deserialize)]
struct ScoreResponse {
    scores: Vec<SentimentScores>,
}

impl HttpScoreProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait::async_trait]
impl ScoreProvider for HttpScoreProvider {
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<SentimentScores>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&ScoreRequest { texts })
            .send()
            .await
            .with_context(|| format!("posting {} texts to {}", texts.len(), self.endpoint))?
            .error_for_status()
            .context("scoring endpoint returned an error status")?;
        let body: ScoreResponse = resp
            .json()
            .await
            .context("decoding scoring endpoint response")?;
        anyhow::ensure!(
            body.scores.len() == texts.len(),
            "scoring endpoint returned {} scores for {} texts",
            body.scores.len(),
            texts.len()
        );
        Ok(body.scores)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Fixed lookup by exact text; unknown texts score fully neutral.
/// Used by tests and local runs without a model endpoint.
#[derive(Debug, Default, Clone)]
pub struct StaticScoreProvider {
    by_text: HashMap<String, SentimentScores>,
}

impl StaticScoreProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, text: impl Into<String>, scores: SentimentScores) -> Self {
        self.by_text.insert(text.into(), scores);
        self
    }
}

#[async_trait::async_trait]
impl ScoreProvider for StaticScoreProvider {
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<SentimentScores>> {
        Ok(texts
            .iter()
            .map(|t| {
                self.by_text
                    .get(t)
                    .copied()
                    .unwrap_or(SentimentScores::new(0.0, 0.0, 1.0))
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

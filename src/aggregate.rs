//! # Aggregator
//! Collapses per-article `(scores, weight)` pairs into one net-sentiment
//! scalar and its 0–100 normalization. Zero total weight is an explicit
//! `EmptyCorpus` failure, never a fabricated neutral 50 — callers decide how
//! to surface "insufficient signal".

use std::fmt;

use serde::Serialize;

use crate::scores::SentimentScores;

/// Result of one weighted aggregation pass.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Aggregate {
    pub avg_positive: f64,
    pub avg_negative: f64,
    pub avg_neutral: f64,
    /// Sensitivity-scaled, clipped net sentiment in [-1,1].
    pub nw: f64,
    /// Affine remap of `nw` to [0,100]; numerically identical to the GSI.
    pub nw_norm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateError {
    /// No input, or every article carried zero weight.
    EmptyCorpus,
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateError::EmptyCorpus => {
                write!(f, "no articles with non-zero weight; insufficient signal")
            }
        }
    }
}

impl std::error::Error for AggregateError {}

/// Weighted average of the score components, then
/// `nw = clip(sensitivity * (avg_pos - avg_neg), -1, 1)` and
/// `nw_norm = (nw + 1) * 50` clamped to [0,100].
///
/// Summation is a single in-order pass so identical inputs always reduce to
/// bit-identical output.
pub fn aggregate(
    items: &[(SentimentScores, f64)],
    sensitivity: f64,
) -> Result<Aggregate, AggregateError> {
    let mut total = 0.0;
    let mut sum_pos = 0.0;
    let mut sum_neg = 0.0;
    let mut sum_neu = 0.0;

    for (scores, weight) in items {
        total += weight;
        sum_pos += weight * scores.positive;
        sum_neg += weight * scores.negative;
        sum_neu += weight * scores.neutral;
    }

    if total <= 0.0 {
        return Err(AggregateError::EmptyCorpus);
    }

    let avg_positive = sum_pos / total;
    let avg_negative = sum_neg / total;
    let avg_neutral = sum_neu / total;

    let nw_raw = avg_positive - avg_negative;
    let nw = (sensitivity * nw_raw).clamp(-1.0, 1.0);
    // Already holds given nw ∈ [-1,1]; the clamp keeps float drift in range.
    let nw_norm = ((nw + 1.0) * 50.0).clamp(0.0, 100.0);

    Ok(Aggregate {
        avg_positive,
        avg_negative,
        avg_neutral,
        nw,
        nw_norm,
    })
}

//! # Weight Model
//! Pure per-article weighting: a piecewise-constant recency decay, a
//! super-linear confidence shaping of the sentiment margin, and multiplicative
//! keyword boost rules. Effective weight = recency × impact; zero means the
//! article is inert for aggregation but stays in storage.

use chrono::{DateTime, Utc};

use crate::config::{BoostRule, IndexConfig, RecencyBand};
use crate::scores::SentimentScores;

const SECS_PER_DAY: f64 = 86_400.0;

/// Fractional article age in days, clamped at 0 for clock skew.
pub fn age_days(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let secs = (now - timestamp).num_milliseconds() as f64 / 1_000.0;
    (secs / SECS_PER_DAY).max(0.0)
}

/// Recency weight in [0,1]: step function of age, non-increasing. Bands are
/// half-open on the upper bound; anything older than the last band weighs 0.
pub fn recency_weight(timestamp: DateTime<Utc>, now: DateTime<Utc>, bands: &[RecencyBand]) -> f64 {
    let age = age_days(timestamp, now);
    for band in bands {
        if age < band.max_age_days {
            return band.weight;
        }
    }
    0.0
}

/// Multiplier from the boost rule list: each rule fires at most once (binary
/// presence over the lowercased text), independent rules combine
/// multiplicatively. No rule fires → 1.0.
pub fn boost_multiplier(text: &str, rules: &[BoostRule]) -> f64 {
    let lower = text.to_lowercase();
    let mut mult = 1.0;
    for rule in rules {
        if rule.keywords.iter().any(|k| lower.contains(&k.to_lowercase())) {
            mult *= rule.multiplier;
        }
    }
    mult
}

/// Impact weight: `|positive - negative| ^ gamma` times the keyword boost.
/// Margin 0 yields 0 regardless of boost; a perfectly ambiguous headline
/// never moves the index even when macro-flagged.
pub fn impact_weight(scores: &SentimentScores, text: &str, cfg: &IndexConfig) -> f64 {
    let shaped = scores.margin().powf(cfg.gamma);
    shaped * boost_multiplier(text, &cfg.boost)
}

/// Effective contribution of one article to aggregation.
pub fn effective_weight(
    timestamp: DateTime<Utc>,
    scores: &SentimentScores,
    text: &str,
    now: DateTime<Utc>,
    cfg: &IndexConfig,
) -> f64 {
    recency_weight(timestamp, now, &cfg.recency_bands) * impact_weight(scores, text, cfg)
}

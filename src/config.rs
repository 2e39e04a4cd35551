//! # Index Configuration
//! All tunables of the weighting/aggregation engine live here so none of them
//! are frozen in code: sensitivity, gamma, boost rules, recency bands, and
//! regime thresholds. Loaded from TOML (env path override → `config/gsi.toml`
//! → built-in defaults) and validated before any aggregation run.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::classify::RegimeThresholds;

pub const DEFAULT_CONFIG_PATH: &str = "config/gsi.toml";
pub const ENV_CONFIG_PATH: &str = "GSI_CONFIG_PATH";

/// One step of the recency decay table: articles younger than `max_age_days`
/// (and not caught by an earlier band) get `weight`. Anything older than the
/// last band weighs 0 and is inert.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct RecencyBand {
    pub max_age_days: f64,
    pub weight: f64,
}

/// One keyword rule: if any keyword occurs in the article text (case
/// insensitive substring), multiply the shaped margin by `multiplier`.
/// Presence is binary; a rule never compounds with itself.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BoostRule {
    pub keywords: Vec<String>,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Amplifies net sentiment before clipping to [-1,1].
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    /// Super-linear margin shaping exponent; must be > 0.
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    #[serde(default = "default_boost_rules")]
    pub boost: Vec<BoostRule>,
    #[serde(default = "default_recency_bands")]
    pub recency_bands: Vec<RecencyBand>,
    #[serde(default)]
    pub thresholds: RegimeThresholds,
}

fn default_sensitivity() -> f64 {
    2.2
}

fn default_gamma() -> f64 {
    1.5
}

/// Headlines that should be treated as high-impact macro events.
fn default_boost_rules() -> Vec<BoostRule> {
    let keywords = [
        "powell",
        "federal reserve",
        "fed",
        "rate hike",
        "rate cut",
        "rate hikes",
        "rate cuts",
        "interest rates",
        "monetary policy",
        "qe",
        "quantitative easing",
        "taper",
        "central bank",
        "central banks",
        "inflation shock",
        "stagflation",
        "recession",
        "crisis",
        "credit crunch",
        "de-dollarization",
        "brics",
    ];
    vec![BoostRule {
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        multiplier: 3.0,
    }]
}

fn default_recency_bands() -> Vec<RecencyBand> {
    [
        (1.0, 1.0),
        (3.0, 0.8),
        (7.0, 0.6),
        (14.0, 0.3),
        (30.0, 0.1),
    ]
    .iter()
    .map(|&(max_age_days, weight)| RecencyBand {
        max_age_days,
        weight,
    })
    .collect()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            gamma: default_gamma(),
            boost: default_boost_rules(),
            recency_bands: default_recency_bands(),
            thresholds: RegimeThresholds::default(),
        }
    }
}

impl IndexConfig {
    /// Fail fast on configuration outside sane domains, before any run.
    pub fn validate(&self) -> Result<()> {
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            bail!("sensitivity must be finite and > 0 (got {})", self.sensitivity);
        }
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            bail!("gamma must be finite and > 0 (got {})", self.gamma);
        }
        for rule in &self.boost {
            if rule.keywords.is_empty() {
                bail!("boost rule with empty keyword list");
            }
            if !rule.multiplier.is_finite() || rule.multiplier < 0.0 {
                bail!("boost multiplier must be finite and >= 0 (got {})", rule.multiplier);
            }
        }
        if self.recency_bands.is_empty() {
            bail!("recency band table must not be empty");
        }
        let mut prev_age = 0.0;
        let mut prev_weight = f64::INFINITY;
        for band in &self.recency_bands {
            if !(band.max_age_days > prev_age) {
                bail!(
                    "recency band bounds must be strictly increasing (got {} after {})",
                    band.max_age_days,
                    prev_age
                );
            }
            if !(0.0..=1.0).contains(&band.weight) {
                bail!("recency weight {} outside [0,1]", band.weight);
            }
            if band.weight > prev_weight {
                bail!(
                    "recency weights must be non-increasing (got {} after {})",
                    band.weight,
                    prev_weight
                );
            }
            prev_age = band.max_age_days;
            prev_weight = band.weight;
        }
        self.thresholds.validate()?;
        Ok(())
    }

    /// Load and validate a config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: IndexConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $GSI_CONFIG_PATH (must exist if set)
    /// 2) config/gsi.toml if present
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{} points to non-existent path", ENV_CONFIG_PATH);
            }
            return Self::load_from(&pb);
        }
        let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            return Self::load_from(&fallback);
        }
        Ok(Self::default())
    }
}

/// Shared, reloadable config used by the HTTP layer. Reads hand out owned
/// copies so a reload never changes a run mid-pass.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<IndexConfig>>,
    path: Option<PathBuf>,
}

impl ConfigHandle {
    pub fn new(cfg: IndexConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cfg)),
            path: None,
        }
    }

    pub fn with_path(cfg: IndexConfig, path: PathBuf) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cfg)),
            path: Some(path),
        }
    }

    pub fn current(&self) -> IndexConfig {
        self.inner.read().expect("config lock poisoned").clone()
    }

    /// Re-read the config file; keeps the previous config on any error so a
    /// bad edit can never poison a running service.
    pub fn reload(&self) -> Result<()> {
        let Some(path) = &self.path else {
            bail!("no config path attached; nothing to reload");
        };
        let fresh = IndexConfig::load_from(path)?;
        *self.inner.write().expect("config lock poisoned") = fresh;
        info!(path = %path.display(), "index config reloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        IndexConfig::default().validate().unwrap();
    }

    #[test]
    fn default_macro_rule_matches_original_set() {
        let cfg = IndexConfig::default();
        assert_eq!(cfg.boost.len(), 1);
        assert!((cfg.boost[0].multiplier - 3.0).abs() < 1e-12);
        assert!(cfg.boost[0].keywords.iter().any(|k| k == "de-dollarization"));
        assert!(cfg.boost[0].keywords.iter().any(|k| k == "brics"));
    }

    #[test]
    fn rejects_non_positive_gamma() {
        let cfg = IndexConfig {
            gamma: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = IndexConfig {
            gamma: -1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_non_monotonic_bands() {
        let mut cfg = IndexConfig::default();
        cfg.recency_bands[2].max_age_days = 2.0; // after 3.0
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_increasing_band_weights() {
        let mut cfg = IndexConfig::default();
        cfg.recency_bands[1].weight = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let cfg: IndexConfig = toml::from_str("sensitivity = 1.0").unwrap();
        cfg.validate().unwrap();
        assert!((cfg.sensitivity - 1.0).abs() < 1e-12);
        assert!((cfg.gamma - 1.5).abs() < 1e-12);
        assert_eq!(cfg.recency_bands.len(), 5);
    }

    #[test]
    fn reload_without_path_fails() {
        let handle = ConfigHandle::new(IndexConfig::default());
        assert!(handle.reload().is_err());
    }
}

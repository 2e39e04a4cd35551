//! # Result Writers
//! Persists the two artifacts the dashboard consumes: the full per-document
//! result file and the small published GSI payload. Output shape follows the
//! files the static dashboard already reads (`sentiment_results.json`,
//! `docs/gsi_value.json`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::classify::Regime;
use crate::pipeline::IndexSnapshot;

pub const RESULTS_PATH: &str = "sentiment_results.json";
pub const GSI_VALUE_PATH: &str = "docs/gsi_value.json";

#[derive(Debug, Serialize)]
struct ResultsPayload<'a> {
    timestamp: DateTime<Utc>,
    news: NewsSection<'a>,
    gsi: f64,
    classification: Regime,
}

#[derive(Debug, Serialize)]
struct NewsSection<'a> {
    count: usize,
    documents: &'a [crate::pipeline::DocumentResult],
    nw: f64,
    nw_norm: f64,
}

/// Published value payload, small enough to poll from the static page.
#[derive(Debug, Serialize)]
pub struct GsiValuePayload {
    pub timestamp: DateTime<Utc>,
    pub gsi: f64,
    pub classification: Regime,
    pub nw_norm: f64,
}

impl GsiValuePayload {
    pub fn from_snapshot(snap: &IndexSnapshot) -> Self {
        Self {
            timestamp: snap.timestamp,
            gsi: snap.gsi,
            classification: snap.classification,
            nw_norm: snap.nw_norm,
        }
    }
}

/// Write the full results file (audit list + index components).
pub fn write_results(snap: &IndexSnapshot, path: &Path) -> Result<()> {
    let payload = ResultsPayload {
        timestamp: snap.timestamp,
        news: NewsSection {
            count: snap.count,
            documents: &snap.documents,
            nw: snap.nw,
            nw_norm: snap.nw_norm,
        },
        gsi: snap.gsi,
        classification: snap.classification,
    };
    write_json(&payload, path)
}

/// Write the published GSI value file.
pub fn write_gsi_value(snap: &IndexSnapshot, path: &Path) -> Result<()> {
    write_json(&GsiValuePayload::from_snapshot(snap), path)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(value).context("serializing payload")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SkipCounts;

    fn snap() -> IndexSnapshot {
        IndexSnapshot {
            timestamp: "2026-08-25T12:00:00Z".parse().unwrap(),
            count: 0,
            documents: Vec::new(),
            nw: 0.5,
            nw_norm: 75.0,
            gsi: 75.0,
            classification: Regime::ExtremelyBullish,
            skipped: SkipCounts::default(),
        }
    }

    #[test]
    fn gsi_value_payload_round_trips_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gsi_value.json");
        write_gsi_value(&snap(), &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["gsi"], 75.0);
        assert_eq!(v["nw_norm"], 75.0);
        assert_eq!(v["classification"], "Extremely Bullish");
    }

    #[test]
    fn results_file_has_news_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/sentiment_results.json");
        write_results(&snap(), &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["news"]["count"], 0);
        assert_eq!(v["news"]["nw"], 0.5);
        assert_eq!(v["gsi"], 75.0);
    }
}

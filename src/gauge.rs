//! # Gauge Geometry
//! Deterministic render geometry for the semicircular GSI gauge: five
//! contiguous colored band arcs plus a needle angle. Pure numbers only; the
//! drawing backend (canvas dashboard) is a collaborator.
//!
//! The 0–100 value range maps linearly onto a 180° sweep with 0 on the left:
//! value v → angle `180 * (1 - v/100)` degrees, so 0→180°, 50→90°, 100→0°.

use serde::Serialize;

use crate::classify::{classify, Regime, RegimeThresholds};

/// Dashboard palette, darkest bearish to darkest bullish.
pub const BAND_COLORS: [&str; 5] = [
    "#ff0000", // red
    "#fee2e2", // light red
    "#e5e7eb", // gray
    "#bbf7d0", // light green
    "#22c55e", // green
];

/// One colored arc of the gauge background. Angles in degrees; `start_deg`
/// is the bearish (left) edge so start >= end on the semicircle.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BandArc {
    pub regime: Regime,
    pub from_value: f64,
    pub to_value: f64,
    pub start_deg: f64,
    pub end_deg: f64,
    pub color: &'static str,
}

/// Disposable render spec; recomputed on every render, never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GaugeSpec {
    pub value: f64,
    pub classification: Regime,
    pub needle_deg: f64,
    pub bands: Vec<BandArc>,
}

/// Angle in degrees for a value on the 0–100 scale.
pub fn angle_for(value: f64) -> f64 {
    180.0 * (1.0 - value.clamp(0.0, 100.0) / 100.0)
}

/// Build the full gauge geometry for a normalized index value.
/// The five arcs are contiguous and cover the whole sweep: each band starts
/// exactly where the previous one ends.
pub fn render_spec(nw_norm: f64, thresholds: &RegimeThresholds) -> GaugeSpec {
    let cuts = thresholds.cuts();
    let bounds = [0.0, cuts[0], cuts[1], cuts[2], cuts[3], 100.0];
    let regimes = [
        Regime::ExtremelyBearish,
        Regime::Bearish,
        Regime::Neutral,
        Regime::Bullish,
        Regime::ExtremelyBullish,
    ];

    let bands = (0..5)
        .map(|i| BandArc {
            regime: regimes[i],
            from_value: bounds[i],
            to_value: bounds[i + 1],
            start_deg: angle_for(bounds[i]),
            end_deg: angle_for(bounds[i + 1]),
            color: BAND_COLORS[i],
        })
        .collect();

    let value = nw_norm.clamp(0.0, 100.0);
    GaugeSpec {
        value,
        classification: classify(value, thresholds),
        needle_deg: angle_for(value),
        bands,
    }
}

//! # Regime Classifier
//! Maps the normalized index in [0,100] onto five discrete sentiment regimes.
//! Boundaries are lower-inclusive: exactly 25.0 is Bearish, exactly 75.0 is
//! Extremely Bullish. Total over every finite input and monotonic.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize, Serializer};

/// Discrete sentiment band. Serialized as the published human label
/// ("Extremely Bearish", ...) so downstream payloads match the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
pub enum Regime {
    ExtremelyBearish,
    Bearish,
    Neutral,
    Bullish,
    ExtremelyBullish,
}

impl Regime {
    pub fn label(&self) -> &'static str {
        match self {
            Regime::ExtremelyBearish => "Extremely Bearish",
            Regime::Bearish => "Bearish",
            Regime::Neutral => "Neutral",
            Regime::Bullish => "Bullish",
            Regime::ExtremelyBullish => "Extremely Bullish",
        }
    }
}

impl Serialize for Regime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The four cut points separating the five regimes on the 0–100 scale.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct RegimeThresholds {
    pub extremely_bearish: f64,
    pub bearish: f64,
    pub neutral: f64,
    pub bullish: f64,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            extremely_bearish: 25.0,
            bearish: 45.0,
            neutral: 55.0,
            bullish: 75.0,
        }
    }
}

impl RegimeThresholds {
    /// Cut points in ascending order, as used by the gauge geometry.
    pub fn cuts(&self) -> [f64; 4] {
        [
            self.extremely_bearish,
            self.bearish,
            self.neutral,
            self.bullish,
        ]
    }

    pub fn validate(&self) -> Result<()> {
        let cuts = self.cuts();
        let mut prev = 0.0;
        for c in cuts {
            if !c.is_finite() || c <= prev || c >= 100.0 {
                bail!(
                    "regime thresholds must be strictly increasing inside (0,100), got {:?}",
                    cuts
                );
            }
            prev = c;
        }
        Ok(())
    }
}

/// Pure threshold function on `nw_norm`.
pub fn classify(nw_norm: f64, thresholds: &RegimeThresholds) -> Regime {
    if nw_norm < thresholds.extremely_bearish {
        Regime::ExtremelyBearish
    } else if nw_norm < thresholds.bearish {
        Regime::Bearish
    } else if nw_norm < thresholds.neutral {
        Regime::Neutral
    } else if nw_norm < thresholds.bullish {
        Regime::Bullish
    } else {
        Regime::ExtremelyBullish
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(v: f64) -> Regime {
        classify(v, &RegimeThresholds::default())
    }

    #[test]
    fn boundaries_are_lower_inclusive() {
        assert_eq!(c(24.999), Regime::ExtremelyBearish);
        assert_eq!(c(25.0), Regime::Bearish);
        assert_eq!(c(44.999), Regime::Bearish);
        assert_eq!(c(45.0), Regime::Neutral);
        assert_eq!(c(55.0), Regime::Bullish);
        assert_eq!(c(74.999), Regime::Bullish);
        assert_eq!(c(75.0), Regime::ExtremelyBullish);
    }

    #[test]
    fn extremes() {
        assert_eq!(c(0.0), Regime::ExtremelyBearish);
        assert_eq!(c(100.0), Regime::ExtremelyBullish);
    }

    #[test]
    fn monotonic_over_the_whole_scale() {
        let mut prev = c(0.0);
        let mut v = 0.0;
        while v <= 100.0 {
            let cur = c(v);
            assert!(cur >= prev, "regime regressed at nw_norm={v}");
            prev = cur;
            v += 0.25;
        }
    }

    #[test]
    fn labels_match_published_strings() {
        assert_eq!(Regime::ExtremelyBullish.label(), "Extremely Bullish");
        assert_eq!(
            serde_json::to_string(&Regime::ExtremelyBearish).unwrap(),
            "\"Extremely Bearish\""
        );
    }

    #[test]
    fn thresholds_must_increase() {
        let t = RegimeThresholds {
            extremely_bearish: 45.0,
            bearish: 25.0,
            neutral: 55.0,
            bullish: 75.0,
        };
        assert!(t.validate().is_err());
        assert!(RegimeThresholds::default().validate().is_ok());
    }
}

//! Feature vectors and model outputs — the external collaborators' inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::candidate::Side;

/// Timestamp-aligned named feature values for one bar.
///
/// Produced by the feature pipeline collaborator. A bar without a feature
/// vector is skipped by candidate generation, not treated as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    pub timestamp: DateTime<Utc>,
    pub values: HashMap<String, f64>,
}

impl FeatureVector {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    /// Fetch a feature, filtering out non-finite values.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied().filter(|v| v.is_finite())
    }
}

/// Calibrated model output for one bar: probability of an upward move,
/// expected return magnitude, and opaque metadata the core never inspects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOutput {
    pub timestamp: DateTime<Utc>,
    /// P(favorable move is up), in [0, 1].
    pub prob_up: f64,
    /// Expected magnitude of the move, in price units.
    pub expected_return: f64,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ModelOutput {
    /// Win probability for a directional trade.
    pub fn p_win(&self, side: Side) -> f64 {
        match side {
            Side::Long => self.prob_up,
            Side::Short => 1.0 - self.prob_up,
        }
    }

    /// Probabilities outside [0, 1] or non-finite values are malformed.
    pub fn is_valid(&self) -> bool {
        self.prob_up.is_finite()
            && (0.0..=1.0).contains(&self.prob_up)
            && self.expected_return.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 15, 30, 0).unwrap()
    }

    #[test]
    fn feature_get_filters_non_finite() {
        let fv = FeatureVector::new(ts())
            .with("atr_14", 12.5)
            .with("broken", f64::NAN);
        assert_eq!(fv.get("atr_14"), Some(12.5));
        assert_eq!(fv.get("broken"), None);
        assert_eq!(fv.get("missing"), None);
    }

    #[test]
    fn p_win_mirrors_by_side() {
        let output = ModelOutput {
            timestamp: ts(),
            prob_up: 0.62,
            expected_return: 14.0,
            metadata: HashMap::new(),
        };
        assert!((output.p_win(Side::Long) - 0.62).abs() < 1e-12);
        assert!((output.p_win(Side::Short) - 0.38).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_probability_invalid() {
        let mut output = ModelOutput {
            timestamp: ts(),
            prob_up: 1.2,
            expected_return: 0.0,
            metadata: HashMap::new(),
        };
        assert!(!output.is_valid());
        output.prob_up = 0.5;
        assert!(output.is_valid());
    }
}

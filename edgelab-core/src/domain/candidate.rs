//! Candidate — a not-yet-sized proposed trade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short. PnL in points = (exit - entry) * sign.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

/// An ephemeral directional trade proposal.
///
/// Created by the candidate generator, consumed immediately by the scorer
/// and rule filter. Distances are positive price offsets from `entry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: Side,
    /// Entry reference price.
    pub entry: f64,
    /// Stop distance in price units (> 0).
    pub stop_distance: f64,
    /// Target distance in price units (> 0).
    pub target_distance: f64,
    /// Model win probability for this side.
    pub probability: f64,
}

impl Candidate {
    pub fn stop_price(&self) -> f64 {
        self.entry - self.side.sign() * self.stop_distance
    }

    pub fn target_price(&self) -> f64 {
        self.entry + self.side.sign() * self.target_distance
    }

    /// Reward multiple: target distance over stop distance.
    pub fn reward_multiple(&self) -> f64 {
        self.target_distance / self.stop_distance
    }
}

/// A candidate with its expected value attached.
///
/// `ev` is in risk multiples: `p_win * reward_multiple - (1 - p_win)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub reward_multiple: f64,
    pub ev: f64,
}

impl ScoredCandidate {
    /// Breakeven win probability for this geometry: `1 / (1 + R)`.
    pub fn required_probability(&self) -> f64 {
        1.0 / (1.0 + self.reward_multiple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(side: Side) -> Candidate {
        Candidate {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 15, 30, 0).unwrap(),
            symbol: "NQ".into(),
            side,
            entry: 18_000.0,
            stop_distance: 10.0,
            target_distance: 20.0,
            probability: 0.55,
        }
    }

    #[test]
    fn long_bracket_geometry() {
        let c = sample(Side::Long);
        assert_eq!(c.stop_price(), 17_990.0);
        assert_eq!(c.target_price(), 18_020.0);
        assert_eq!(c.reward_multiple(), 2.0);
    }

    #[test]
    fn short_bracket_geometry() {
        let c = sample(Side::Short);
        assert_eq!(c.stop_price(), 18_010.0);
        assert_eq!(c.target_price(), 17_980.0);
    }
}

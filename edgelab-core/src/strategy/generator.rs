//! Candidate generation — one directional proposal per bar, at most.
//!
//! The generator is a pure function of (bar, features, model output) plus
//! static configuration. Only one direction is considered per bar — the
//! side the model favors — so conflicting same-bar signals cannot occur.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, Candidate, FeatureVector, ModelOutput, Side};
use crate::session::SessionSpec;

/// Static configuration for candidate generation.
///
/// Bracket geometry is derived from the ATR feature: stop at
/// `stop_atr_mult * ATR`, target at `target_atr_mult * ATR`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    /// Minimum win probability for the favored side.
    pub min_edge: f64,
    /// Probabilities above this are treated as miscalibrated and skipped.
    pub max_prob: f64,
    /// Feature supplying the volatility unit for bracket geometry.
    pub atr_feature: String,
    /// Stop distance in ATR multiples.
    pub stop_atr_mult: f64,
    /// Target distance in ATR multiples.
    pub target_atr_mult: f64,
    /// Acceptable reward-multiple band for generated geometry.
    pub min_reward_multiple: f64,
    pub max_reward_multiple: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_edge: 0.55,
            max_prob: 0.95,
            atr_feature: "atr_14".into(),
            stop_atr_mult: 0.5,
            target_atr_mult: 1.0,
            min_reward_multiple: 1.5,
            max_reward_multiple: 5.0,
        }
    }
}

/// Turns a bar plus its aligned feature/model data into zero or one
/// trade proposal.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    config: GeneratorConfig,
}

impl CandidateGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Emit a candidate for this bar, or nothing.
    ///
    /// Emission requires: the bar inside a trading window, a usable ATR
    /// feature, a valid model output, and the favored side's win
    /// probability inside `(min_edge, max_prob]`.
    pub fn generate(
        &self,
        bar: &Bar,
        features: &FeatureVector,
        model: &ModelOutput,
        session: &SessionSpec,
    ) -> Option<Candidate> {
        if !session.in_trading_window(bar.timestamp) {
            return None;
        }
        if !model.is_valid() {
            return None;
        }

        let side = if model.prob_up >= 0.5 {
            Side::Long
        } else {
            Side::Short
        };
        let p_win = model.p_win(side);
        if p_win <= self.config.min_edge || p_win > self.config.max_prob {
            return None;
        }

        let atr = features.get(&self.config.atr_feature)?;
        if atr <= 0.0 {
            return None;
        }

        let stop_distance = self.config.stop_atr_mult * atr;
        let target_distance = self.config.target_atr_mult * atr;
        if stop_distance <= 0.0 {
            return None;
        }
        let rr = target_distance / stop_distance;
        if rr < self.config.min_reward_multiple || rr > self.config.max_reward_multiple {
            return None;
        }

        Some(Candidate {
            timestamp: bar.timestamp,
            symbol: bar.symbol.clone(),
            side,
            entry: bar.close,
            stop_distance,
            target_distance,
            probability: p_win,
        })
    }
}

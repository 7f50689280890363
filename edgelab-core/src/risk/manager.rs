//! RiskManager — turns an approved candidate into a sized order, or a
//! named breach.
//!
//! Sizing picks the largest integer contract count that satisfies every
//! limit simultaneously. If even one contract would violate any limit
//! the candidate is rejected outright — there is no partial acceptance
//! of a violating size.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ContractSpec, ScoredCandidate, SizedOrder};
use crate::risk::state::RiskState;

/// Account-level risk limits in account currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskConfig {
    /// Maximum worst-case loss of a single trade.
    pub max_risk_per_trade: f64,
    /// Maximum aggregate worst-case loss across all open positions.
    pub max_open_risk: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_risk_per_trade: 500.0,
            max_open_risk: 1_500.0,
        }
    }
}

/// The specific limit that rejected a candidate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskBreach {
    #[error("stop distance {0} is not a usable risk unit")]
    InvalidStopDistance(f64),
    #[error("one contract risks {risk_per_contract:.2} > per-trade cap {cap:.2}")]
    PerTradeCap { risk_per_contract: f64, cap: f64 },
    #[error("open risk {open_risk:.2} + {risk_per_contract:.2} > account cap {cap:.2}")]
    OpenRiskCap {
        open_risk: f64,
        risk_per_contract: f64,
        cap: f64,
    },
    #[error("margin/contract ceiling allows zero contracts at equity {equity:.2}")]
    MarginCap { equity: f64 },
}

/// Deterministic position sizer over explicit risk state.
#[derive(Debug, Clone)]
pub struct RiskManager {
    config: RiskConfig,
}

impl RiskManager {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Size a candidate against the current account state.
    ///
    /// The accepted quantity is the largest integer satisfying, at once:
    /// per-trade risk cap (boundary inclusive), remaining account open
    /// risk, the instrument's margin capacity, and its hard contract cap.
    pub fn size(
        &self,
        scored: &ScoredCandidate,
        spec: &ContractSpec,
        state: &RiskState,
    ) -> Result<SizedOrder, RiskBreach> {
        let stop_distance = scored.candidate.stop_distance;
        if stop_distance <= 0.0 || !stop_distance.is_finite() {
            return Err(RiskBreach::InvalidStopDistance(stop_distance));
        }

        let risk_per_contract = spec.risk_per_contract(stop_distance);

        let by_trade_cap = (self.config.max_risk_per_trade / risk_per_contract).floor() as u32;
        if by_trade_cap == 0 {
            return Err(RiskBreach::PerTradeCap {
                risk_per_contract,
                cap: self.config.max_risk_per_trade,
            });
        }

        let headroom = self.config.max_open_risk - state.open_risk();
        let by_open_risk = if headroom >= risk_per_contract {
            (headroom / risk_per_contract).floor() as u32
        } else {
            return Err(RiskBreach::OpenRiskCap {
                open_risk: state.open_risk(),
                risk_per_contract,
                cap: self.config.max_open_risk,
            });
        };

        let by_margin = spec.margin_capacity(state.equity());
        if by_margin == 0 {
            return Err(RiskBreach::MarginCap {
                equity: state.equity(),
            });
        }

        let quantity = by_trade_cap.min(by_open_risk).min(by_margin);
        Ok(SizedOrder {
            candidate: scored.clone(),
            quantity,
            risk_per_contract,
            total_risk: quantity as f64 * risk_per_contract,
        })
    }
}

//! SizedOrder — a risk-approved candidate with an integer quantity.

use serde::{Deserialize, Serialize};

use super::candidate::ScoredCandidate;

/// A candidate that passed every risk limit, sized in whole contracts.
///
/// Quantity is always >= 1: rejection is expressed as a `RiskBreach`, not
/// as a zero-quantity order, so a `SizedOrder` always carries the
/// invariant `total_risk <= per-trade cap` at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizedOrder {
    pub candidate: ScoredCandidate,
    pub quantity: u32,
    /// Worst-case loss of one contract at the stop, in account currency.
    pub risk_per_contract: f64,
    /// Worst-case loss of the whole order: `quantity * risk_per_contract`.
    pub total_risk: f64,
}

impl SizedOrder {
    pub fn symbol(&self) -> &str {
        &self.candidate.candidate.symbol
    }
}

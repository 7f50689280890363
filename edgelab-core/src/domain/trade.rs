//! Trade — a completed round-trip with full cost attribution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::candidate::Side;

/// How a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Stop level touched. When stop and target are both touched within
    /// one bar, the stop is assumed to trigger first.
    Stopped,
    /// Target level touched.
    Targeted,
    /// Maximum holding period elapsed; closed at that bar's close.
    TimedOut,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::Stopped => write!(f, "stopped"),
            ExitReason::Targeted => write!(f, "targeted"),
            ExitReason::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// A closed round-trip trade. Written once by the execution simulator,
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    // ── Identification ──
    pub symbol: String,
    pub side: Side,
    pub quantity: u32,

    // ── Entry ──
    pub entry_ts: DateTime<Utc>,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_ts: DateTime<Utc>,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    // ── Bracket ──
    pub stop_price: f64,
    pub target_price: f64,

    // ── PnL ──
    pub gross_pnl: f64,
    pub fees: f64,
    pub slippage: f64,
    pub net_pnl: f64,
    /// Net PnL expressed in multiples of initial risk.
    pub r_multiple: f64,

    // ── Duration ──
    pub bars_held: usize,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }
}

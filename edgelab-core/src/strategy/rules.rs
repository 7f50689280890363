//! Rule filter — hard eligibility gates between scoring and sizing.
//!
//! Rules are an ordered list of named predicates over the candidate, the
//! account risk state, and the session clock. Each rule is independently
//! togglable by configuration. A failing candidate is dropped with a
//! recorded reason; the record exists for observability, not control
//! flow.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ScoredCandidate;
use crate::risk::RiskState;
use crate::session::SessionSpec;

/// Why a candidate was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    OutsideWindow,
    MaxOpenPositions,
    Cooldown,
    DailyTradeCap,
    DailyLossHalt,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::OutsideWindow => write!(f, "OutsideWindow"),
            RejectReason::MaxOpenPositions => write!(f, "MaxOpenPositions"),
            RejectReason::Cooldown => write!(f, "Cooldown"),
            RejectReason::DailyTradeCap => write!(f, "DailyTradeCap"),
            RejectReason::DailyLossHalt => write!(f, "DailyLossHalt"),
        }
    }
}

/// A dropped candidate with the gate that dropped it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedCandidate {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub reason: RejectReason,
    pub context: String,
}

/// A named eligibility predicate.
pub trait Rule: Send + Sync {
    /// Returns `Some(rejection)` when the candidate fails this gate.
    fn evaluate(
        &self,
        scored: &ScoredCandidate,
        state: &RiskState,
        session: &SessionSpec,
    ) -> Option<RejectedCandidate>;

    /// Rule name for logging.
    fn name(&self) -> &str;
}

fn rejection(scored: &ScoredCandidate, reason: RejectReason, context: String) -> RejectedCandidate {
    RejectedCandidate {
        timestamp: scored.candidate.timestamp,
        symbol: scored.candidate.symbol.clone(),
        reason,
        context,
    }
}

/// Reject candidates stamped outside the configured trading windows.
#[derive(Debug)]
pub struct TradingWindowRule;

impl Rule for TradingWindowRule {
    fn evaluate(
        &self,
        scored: &ScoredCandidate,
        _state: &RiskState,
        session: &SessionSpec,
    ) -> Option<RejectedCandidate> {
        if session.in_trading_window(scored.candidate.timestamp) {
            None
        } else {
            Some(rejection(
                scored,
                RejectReason::OutsideWindow,
                format!("{} outside trading windows", scored.candidate.timestamp),
            ))
        }
    }

    fn name(&self) -> &str {
        "TradingWindowRule"
    }
}

/// Reject when the symbol already carries the maximum open positions.
#[derive(Debug)]
pub struct MaxOpenPositionsRule {
    pub max_open: usize,
}

impl Rule for MaxOpenPositionsRule {
    fn evaluate(
        &self,
        scored: &ScoredCandidate,
        state: &RiskState,
        _session: &SessionSpec,
    ) -> Option<RejectedCandidate> {
        let open = state.open_positions(&scored.candidate.symbol);
        if open >= self.max_open {
            Some(rejection(
                scored,
                RejectReason::MaxOpenPositions,
                format!("open={open}, max={}", self.max_open),
            ))
        } else {
            None
        }
    }

    fn name(&self) -> &str {
        "MaxOpenPositionsRule"
    }
}

/// Reject entries inside the cooldown window after the last entry on the
/// same symbol.
#[derive(Debug)]
pub struct CooldownRule {
    pub minutes: i64,
}

impl Rule for CooldownRule {
    fn evaluate(
        &self,
        scored: &ScoredCandidate,
        state: &RiskState,
        _session: &SessionSpec,
    ) -> Option<RejectedCandidate> {
        let last = state.last_entry(&scored.candidate.symbol)?;
        let elapsed = scored.candidate.timestamp - last;
        if elapsed < Duration::minutes(self.minutes) {
            Some(rejection(
                scored,
                RejectReason::Cooldown,
                format!(
                    "{}m since last entry, cooldown {}m",
                    elapsed.num_minutes(),
                    self.minutes
                ),
            ))
        } else {
            None
        }
    }

    fn name(&self) -> &str {
        "CooldownRule"
    }
}

/// Reject once the session's trade count reaches the cap.
#[derive(Debug)]
pub struct DailyTradeCapRule {
    pub max_trades: usize,
}

impl Rule for DailyTradeCapRule {
    fn evaluate(
        &self,
        scored: &ScoredCandidate,
        state: &RiskState,
        session: &SessionSpec,
    ) -> Option<RejectedCandidate> {
        let date = session.session_date(scored.candidate.timestamp);
        let trades = state.counters(date).trades;
        if trades >= self.max_trades {
            Some(rejection(
                scored,
                RejectReason::DailyTradeCap,
                format!("trades={trades}, max={}", self.max_trades),
            ))
        } else {
            None
        }
    }

    fn name(&self) -> &str {
        "DailyTradeCapRule"
    }
}

/// Kill switch: once the session's realized loss reaches the cap, halt
/// entries for the remainder of the session.
#[derive(Debug)]
pub struct DailyLossHaltRule {
    /// Halt when realized R this session <= -max_loss_r.
    pub max_loss_r: f64,
}

impl Rule for DailyLossHaltRule {
    fn evaluate(
        &self,
        scored: &ScoredCandidate,
        state: &RiskState,
        session: &SessionSpec,
    ) -> Option<RejectedCandidate> {
        let date = session.session_date(scored.candidate.timestamp);
        let realized = state.counters(date).realized_r;
        if realized <= -self.max_loss_r {
            Some(rejection(
                scored,
                RejectReason::DailyLossHalt,
                format!("realized {realized:.2}R <= -{:.2}R", self.max_loss_r),
            ))
        } else {
            None
        }
    }

    fn name(&self) -> &str {
        "DailyLossHaltRule"
    }
}

/// Rule toggles and parameters. `None` disables a gate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleConfig {
    pub trading_window: bool,
    pub max_open_positions: Option<usize>,
    pub cooldown_minutes: Option<i64>,
    pub max_trades_per_session: Option<usize>,
    pub daily_loss_halt_r: Option<f64>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            trading_window: true,
            max_open_positions: Some(1),
            cooldown_minutes: Some(15),
            max_trades_per_session: Some(10),
            daily_loss_halt_r: Some(5.0),
        }
    }
}

/// Build the enabled rules in their evaluation order.
pub fn build_rules(config: &RuleConfig) -> Vec<Box<dyn Rule>> {
    let mut rules: Vec<Box<dyn Rule>> = Vec::new();
    if config.trading_window {
        rules.push(Box::new(TradingWindowRule));
    }
    if let Some(max_open) = config.max_open_positions {
        rules.push(Box::new(MaxOpenPositionsRule { max_open }));
    }
    if let Some(minutes) = config.cooldown_minutes {
        rules.push(Box::new(CooldownRule { minutes }));
    }
    if let Some(max_trades) = config.max_trades_per_session {
        rules.push(Box::new(DailyTradeCapRule { max_trades }));
    }
    if let Some(max_loss_r) = config.daily_loss_halt_r {
        rules.push(Box::new(DailyLossHaltRule { max_loss_r }));
    }
    rules
}

/// Run a candidate through every rule; first failure wins.
pub fn apply_rules(
    rules: &[Box<dyn Rule>],
    scored: &ScoredCandidate,
    state: &RiskState,
    session: &SessionSpec,
) -> Option<RejectedCandidate> {
    rules
        .iter()
        .find_map(|rule| rule.evaluate(scored, state, session))
}

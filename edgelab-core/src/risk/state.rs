//! RiskState — the mutable account picture behind every sizing decision.
//!
//! One value per engine (or per walk-forward fold), passed explicitly
//! into rule and sizing calls. Never a process-wide singleton: parallel
//! folds each own their state, which makes concurrent evaluation safe by
//! construction.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

use crate::domain::{SizedOrder, Symbol, Trade};

/// Per-session-date counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCounters {
    pub trades: usize,
    pub realized_r: f64,
}

/// Account state: equity, open risk, per-symbol exposure, and session
/// counters for the daily caps.
#[derive(Debug, Clone)]
pub struct RiskState {
    equity: f64,
    open_risk: f64,
    open_positions: HashMap<Symbol, usize>,
    last_entry: HashMap<Symbol, DateTime<Utc>>,
    sessions: HashMap<NaiveDate, SessionCounters>,
}

impl RiskState {
    pub fn new(equity: f64) -> Self {
        Self {
            equity,
            open_risk: 0.0,
            open_positions: HashMap::new(),
            last_entry: HashMap::new(),
            sessions: HashMap::new(),
        }
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    /// Worst-case dollars at risk across all open positions.
    pub fn open_risk(&self) -> f64 {
        self.open_risk
    }

    pub fn open_positions(&self, symbol: &str) -> usize {
        self.open_positions.get(symbol).copied().unwrap_or(0)
    }

    pub fn total_open_positions(&self) -> usize {
        self.open_positions.values().sum()
    }

    pub fn last_entry(&self, symbol: &str) -> Option<DateTime<Utc>> {
        self.last_entry.get(symbol).copied()
    }

    pub fn counters(&self, session: NaiveDate) -> SessionCounters {
        self.sessions.get(&session).copied().unwrap_or_default()
    }

    /// Book a new entry: reserve its risk, bump exposure and the session
    /// trade count, and stamp the cooldown clock.
    pub fn record_entry(&mut self, order: &SizedOrder, session: NaiveDate) {
        self.open_risk += order.total_risk;
        *self
            .open_positions
            .entry(order.symbol().to_string())
            .or_insert(0) += 1;
        self.last_entry
            .insert(order.symbol().to_string(), order.candidate.candidate.timestamp);
        self.sessions.entry(session).or_default().trades += 1;
    }

    /// Book a close: release the reserved risk (clamped at zero), apply
    /// realized PnL to equity, and accumulate the session's realized R.
    pub fn record_close(&mut self, trade: &Trade, reserved_risk: f64, session: NaiveDate) {
        self.open_risk = (self.open_risk - reserved_risk.abs()).max(0.0);
        if let Some(count) = self.open_positions.get_mut(&trade.symbol) {
            *count = count.saturating_sub(1);
        }
        self.equity += trade.net_pnl;
        self.sessions.entry(session).or_default().realized_r += trade.r_multiple;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candidate, ExitReason, ScoredCandidate, Side};
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 15, 30, 0).unwrap()
    }

    fn order(total_risk: f64) -> SizedOrder {
        let candidate = Candidate {
            timestamp: ts(),
            symbol: "NQ".into(),
            side: Side::Long,
            entry: 18_000.0,
            stop_distance: 10.0,
            target_distance: 20.0,
            probability: 0.6,
        };
        SizedOrder {
            candidate: ScoredCandidate {
                candidate,
                reward_multiple: 2.0,
                ev: 0.8,
            },
            quantity: 1,
            risk_per_contract: total_risk,
            total_risk,
        }
    }

    fn closed_trade(net_pnl: f64, r_multiple: f64) -> Trade {
        Trade {
            symbol: "NQ".into(),
            side: Side::Long,
            quantity: 1,
            entry_ts: ts(),
            entry_price: 18_000.0,
            exit_ts: ts(),
            exit_price: 18_020.0,
            exit_reason: ExitReason::Targeted,
            stop_price: 17_990.0,
            target_price: 18_020.0,
            gross_pnl: net_pnl,
            fees: 0.0,
            slippage: 0.0,
            net_pnl,
            r_multiple,
            bars_held: 5,
        }
    }

    #[test]
    fn entry_reserves_risk_and_counts() {
        let mut state = RiskState::new(50_000.0);
        let session = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();

        state.record_entry(&order(200.0), session);
        assert_eq!(state.open_risk(), 200.0);
        assert_eq!(state.open_positions("NQ"), 1);
        assert_eq!(state.counters(session).trades, 1);
        assert_eq!(state.last_entry("NQ"), Some(ts()));
    }

    #[test]
    fn close_releases_risk_and_books_pnl() {
        let mut state = RiskState::new(50_000.0);
        let session = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        state.record_entry(&order(200.0), session);

        state.record_close(&closed_trade(380.0, 1.9), 200.0, session);
        assert_eq!(state.open_risk(), 0.0);
        assert_eq!(state.open_positions("NQ"), 0);
        assert_eq!(state.equity(), 50_380.0);
        assert!((state.counters(session).realized_r - 1.9).abs() < 1e-12);
    }

    #[test]
    fn risk_release_clamps_at_zero() {
        let mut state = RiskState::new(50_000.0);
        let session = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        state.record_entry(&order(100.0), session);

        // Releasing more than was reserved must not go negative
        state.record_close(&closed_trade(-120.0, -1.2), 150.0, session);
        assert_eq!(state.open_risk(), 0.0);
    }

    #[test]
    fn sessions_tracked_independently() {
        let mut state = RiskState::new(50_000.0);
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        state.record_entry(&order(100.0), monday);
        state.record_entry(&order(100.0), tuesday);
        assert_eq!(state.counters(monday).trades, 1);
        assert_eq!(state.counters(tuesday).trades, 1);
        assert_eq!(state.counters(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()).trades, 0);
    }
}

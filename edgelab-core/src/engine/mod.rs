//! BacktestEngine — one deterministic pass over an aligned series.
//!
//! Per-bar order of operations:
//! 1. Advance the broker: resolve fills and exits for orders submitted
//!    on earlier bars, and release their reserved risk.
//! 2. Record the equity point.
//! 3. Decide: generate → score/gate → rules → size → submit. Decisions
//!    at bar *t* see only data stamped ≤ *t*; submitted orders first
//!    touch the market at bar *t+1*.
//!
//! Re-running with identical input and configuration reproduces the
//! ledger bit for bit — nothing in the per-bar path draws randomness.

pub mod series;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{BarError, ContractSpec, Trade};
use crate::execution::{Broker, ExecutionConfig, SimBroker};
use crate::risk::{RiskConfig, RiskManager, RiskState};
use crate::strategy::{
    apply_rules, build_rules, CandidateGenerator, EvScorer, GeneratorConfig, RejectedCandidate,
    RuleConfig,
};

pub use series::AlignedSeries;

/// Fatal input violations. Everything else the engine can name and skip.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("series contains no bars")]
    EmptySeries,
    #[error("{symbol}: bar timestamps not strictly increasing at {timestamp}")]
    NonMonotonicTimestamps {
        symbol: String,
        timestamp: DateTime<Utc>,
    },
    #[error("series for '{expected}' contains a bar for '{found}'")]
    SymbolMismatch { expected: String, found: String },
    #[error(transparent)]
    MalformedBar(#[from] BarError),
}

/// Everything one backtest needs, besides the data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    pub initial_equity: f64,
    pub contract: ContractSpec,
    pub generator: GeneratorConfig,
    /// Minimum EV (in R) a candidate must clear.
    pub min_ev: f64,
    pub rules: RuleConfig,
    pub risk: RiskConfig,
    pub execution: ExecutionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_equity: 100_000.0,
            contract: ContractSpec::nq(),
            generator: GeneratorConfig::default(),
            min_ev: 0.0,
            rules: RuleConfig::default(),
            risk: RiskConfig::default(),
            execution: ExecutionConfig::default(),
        }
    }
}

/// One point of the running equity curve: cumulative net PnL after the
/// bar's exits were applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub cum_pnl: f64,
}

/// A candidate the risk manager refused, with the limit that refused it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBreachRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub detail: String,
}

/// The complete, immutable outcome of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub symbol: String,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub rejections: Vec<RejectedCandidate>,
    pub risk_breaches: Vec<RiskBreachRecord>,
    pub bar_count: usize,
    /// Bars skipped for missing feature/model data.
    pub skipped_bars: usize,
}

impl RunResult {
    pub fn final_pnl(&self) -> f64 {
        self.equity_curve.last().map(|p| p.cum_pnl).unwrap_or(0.0)
    }

    /// Trade outcomes in risk multiples, in close order.
    pub fn r_multiples(&self) -> Vec<f64> {
        self.trades.iter().map(|t| t.r_multiple).collect()
    }
}

/// Bar-by-bar backtest orchestrator.
pub struct BacktestEngine {
    config: EngineConfig,
}

impl BacktestEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline over a series.
    pub fn run(&self, series: &AlignedSeries) -> Result<RunResult, EngineError> {
        series.validate()?;

        let session = self.config.contract.session.clone();
        let generator = CandidateGenerator::new(self.config.generator.clone());
        let scorer = EvScorer::new(self.config.min_ev);
        let rules = build_rules(&self.config.rules);
        let risk_manager = RiskManager::new(self.config.risk.clone());
        let mut broker = SimBroker::new(
            self.config.execution.build(),
            self.config.contract.clone(),
        );
        let mut state = RiskState::new(self.config.initial_equity);

        let mut trades: Vec<Trade> = Vec::new();
        let mut equity_curve: Vec<EquityPoint> = Vec::with_capacity(series.len());
        let mut rejections: Vec<RejectedCandidate> = Vec::new();
        let mut risk_breaches: Vec<RiskBreachRecord> = Vec::new();
        let mut cum_pnl = 0.0;
        let mut skipped_bars = 0usize;

        for bar in &series.bars {
            // 1. Resolve orders submitted on earlier bars.
            for closed in broker.on_bar(bar) {
                let session_date = session.session_date(closed.trade.exit_ts);
                state.record_close(&closed.trade, closed.reserved_risk, session_date);
                cum_pnl += closed.trade.net_pnl;
                trades.push(closed.trade);
            }

            // 2. Mark the curve.
            equity_curve.push(EquityPoint {
                timestamp: bar.timestamp,
                cum_pnl,
            });

            // 3. Decide on this bar.
            let (features, output) = match (
                series.features.get(&bar.timestamp),
                series.outputs.get(&bar.timestamp),
            ) {
                (Some(f), Some(o)) => (f, o),
                _ => {
                    skipped_bars += 1;
                    tracing::debug!(
                        symbol = %bar.symbol,
                        timestamp = %bar.timestamp,
                        "missing feature/model data, skipping bar"
                    );
                    continue;
                }
            };

            let Some(candidate) = generator.generate(bar, features, output, &session) else {
                continue;
            };
            let Some(scored) = scorer.evaluate(candidate) else {
                continue;
            };

            if let Some(rejected) = apply_rules(&rules, &scored, &state, &session) {
                tracing::debug!(
                    symbol = %rejected.symbol,
                    reason = %rejected.reason,
                    context = %rejected.context,
                    "candidate rejected"
                );
                rejections.push(rejected);
                continue;
            }

            match risk_manager.size(&scored, &self.config.contract, &state) {
                Ok(order) => {
                    let session_date = session.session_date(bar.timestamp);
                    state.record_entry(&order, session_date);
                    broker.submit(order);
                }
                Err(breach) => {
                    tracing::debug!(
                        symbol = %bar.symbol,
                        %breach,
                        "candidate rejected by risk limits"
                    );
                    risk_breaches.push(RiskBreachRecord {
                        timestamp: bar.timestamp,
                        symbol: bar.symbol.clone(),
                        detail: breach.to_string(),
                    });
                }
            }
        }

        // End of data: discard unfilled orders, close filled positions at
        // the final bar so the ledger and risk accounting balance.
        if let Some(last) = series.bars.last() {
            for closed in broker.close_all(last) {
                let session_date = session.session_date(closed.trade.exit_ts);
                state.record_close(&closed.trade, closed.reserved_risk, session_date);
                cum_pnl += closed.trade.net_pnl;
                trades.push(closed.trade);
            }
            if let Some(point) = equity_curve.last_mut() {
                point.cum_pnl = cum_pnl;
            }
        }

        Ok(RunResult {
            symbol: series.symbol.clone(),
            trades,
            equity_curve,
            rejections,
            risk_breaches,
            bar_count: series.len(),
            skipped_bars,
        })
    }
}

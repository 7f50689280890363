//! Run orchestration — wires the engine, metrics, walk-forward, and
//! Monte Carlo stages together.
//!
//! Two entry points:
//! - `run_single_backtest()`: one full-series pass plus metrics.
//! - `run_validation()`: backtest, then walk-forward folds, then Monte
//!   Carlo over the ledger. Cooperative cancellation threads through to
//!   the fold/path boundaries.

use std::sync::atomic::AtomicBool;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use edgelab_core::engine::{AlignedSeries, BacktestEngine, EngineError, RunResult};

use crate::config::{RunConfig, RunId};
use crate::metrics::PerformanceMetrics;
use crate::monte_carlo::{resample, MonteCarloSummary};
use crate::walk_forward::{run_walk_forward, WalkForwardError, WalkForwardReport};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("walk-forward error: {0}")]
    WalkForward(#[from] WalkForwardError),
}

/// A single backtest plus its summary metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub run_id: RunId,
    pub symbol: String,
    pub metrics: PerformanceMetrics,
    pub result: RunResult,
}

/// The full validation picture for one configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub backtest: BacktestReport,
    pub walk_forward: WalkForwardReport,
    pub monte_carlo: MonteCarloSummary,
}

/// Run one backtest over the whole series.
pub fn run_single_backtest(
    series: &AlignedSeries,
    config: &RunConfig,
) -> Result<BacktestReport, RunError> {
    let engine = BacktestEngine::new(config.engine.clone());
    let result = engine.run(series)?;
    let metrics = PerformanceMetrics::compute(&result.trades);

    tracing::debug!(
        symbol = %series.symbol,
        trades = result.trades.len(),
        skipped = result.skipped_bars,
        "backtest complete"
    );

    Ok(BacktestReport {
        run_id: config.run_id(),
        symbol: series.symbol.clone(),
        metrics,
        result,
    })
}

/// Run the full validation pipeline: backtest, walk-forward, Monte Carlo.
pub fn run_validation(
    series: &AlignedSeries,
    config: &RunConfig,
    cancel: Option<&AtomicBool>,
) -> Result<ValidationReport, RunError> {
    let backtest = run_single_backtest(series, config)?;

    let walk_forward = run_walk_forward(series, &config.engine, &config.walk_forward, cancel)?;

    let r_multiples = backtest.result.r_multiples();
    let monte_carlo = resample(&r_multiples, &config.monte_carlo, cancel);

    Ok(ValidationReport {
        backtest,
        walk_forward,
        monte_carlo,
    })
}

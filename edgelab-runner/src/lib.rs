//! EdgeLab Runner — statistical validation on top of `edgelab-core`.
//!
//! This crate builds on the core engine to provide:
//! - R-multiple performance metrics
//! - Chronological walk-forward fold splitting and parallel evaluation
//! - Seeded Monte Carlo resampling of trade outcomes
//! - Single-run and full-validation orchestration
//! - The serializable run configuration surface

pub mod config;
pub mod metrics;
pub mod monte_carlo;
pub mod runner;
pub mod walk_forward;

pub use config::{ConfigError, RunConfig, RunId};
pub use metrics::PerformanceMetrics;
pub use monte_carlo::{resample, MonteCarloConfig, MonteCarloSummary, PercentileBand};
pub use runner::{run_single_backtest, run_validation, BacktestReport, RunError, ValidationReport};
pub use walk_forward::{
    folds, run_walk_forward, Fold, FoldIter, FoldResult, FoldStatus, WalkForwardConfig,
    WalkForwardError, WalkForwardReport,
};

//! Walk-forward validation — chronological train/test folds and their
//! out-of-sample evaluation.
//!
//! Folds are cut by calendar duration: each fold's test range starts
//! where its train range ends (plus an optional gap), successive test
//! ranges never overlap, and a final fold that would overrun the data
//! is dropped. Every out-of-sample number is therefore computed on data
//! strictly after the data the model trained on.
//!
//! Model training itself is an external collaborator: folds expose both
//! ranges, evaluation backtests the test slice only.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use edgelab_core::engine::{AlignedSeries, BacktestEngine, EngineConfig};

use crate::metrics::PerformanceMetrics;

// ─── Configuration ───────────────────────────────────────────────────

/// Walk-forward window lengths, in calendar days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WalkForwardConfig {
    pub train_days: i64,
    pub test_days: i64,
    pub step_days: i64,
    /// Buffer between train end and test start (default 0).
    pub gap_days: i64,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            train_days: 60,
            test_days: 20,
            step_days: 20,
            gap_days: 0,
        }
    }
}

/// Errors from fold construction or evaluation setup.
#[derive(Debug, Error)]
pub enum WalkForwardError {
    #[error("walk-forward windows must be positive: {0}")]
    InvalidConfig(String),
    #[error("no folds fit: {total_days} days of data < train {train_days} + test {test_days}")]
    InsufficientData {
        total_days: i64,
        train_days: i64,
        test_days: i64,
    },
}

// ─── Folds ───────────────────────────────────────────────────────────

/// One train/test split. Ranges are half-open: `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Fold {
    pub index: usize,
    pub train_start: DateTime<Utc>,
    pub train_end: DateTime<Utc>,
    pub test_start: DateTime<Utc>,
    pub test_end: DateTime<Utc>,
}

/// Lazy, restartable fold sequence. Cloning restarts iteration.
#[derive(Debug, Clone)]
pub struct FoldIter {
    config: WalkForwardConfig,
    range_end: DateTime<Utc>,
    cursor: DateTime<Utc>,
    index: usize,
}

impl Iterator for FoldIter {
    type Item = Fold;

    fn next(&mut self) -> Option<Fold> {
        let train_start = self.cursor;
        let train_end = train_start + Duration::days(self.config.train_days);
        let test_start = train_end + Duration::days(self.config.gap_days);
        let test_end = test_start + Duration::days(self.config.test_days);

        // Drop the trailing partial fold rather than test on short data.
        if test_end > self.range_end {
            return None;
        }

        let fold = Fold {
            index: self.index,
            train_start,
            train_end,
            test_start,
            test_end,
        };
        self.cursor = train_start + Duration::days(self.config.step_days);
        self.index += 1;
        Some(fold)
    }
}

/// Build the fold sequence over `[range_start, range_end)`.
pub fn folds(
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    config: &WalkForwardConfig,
) -> Result<FoldIter, WalkForwardError> {
    if config.train_days <= 0 || config.test_days <= 0 || config.step_days <= 0 {
        return Err(WalkForwardError::InvalidConfig(format!(
            "train={}, test={}, step={}",
            config.train_days, config.test_days, config.step_days
        )));
    }
    if config.gap_days < 0 {
        return Err(WalkForwardError::InvalidConfig(format!(
            "gap={}",
            config.gap_days
        )));
    }
    // A step shorter than the test window would overlap successive
    // out-of-sample ranges and double-count their data.
    if config.step_days < config.test_days {
        return Err(WalkForwardError::InvalidConfig(format!(
            "step {} < test window {}",
            config.step_days, config.test_days
        )));
    }

    let total_days = (range_end - range_start).num_days();
    if total_days < config.train_days + config.gap_days + config.test_days {
        return Err(WalkForwardError::InsufficientData {
            total_days,
            train_days: config.train_days,
            test_days: config.test_days,
        });
    }

    Ok(FoldIter {
        config: *config,
        range_end,
        cursor: range_start,
        index: 0,
    })
}

// ─── Evaluation ──────────────────────────────────────────────────────

/// Out-of-sample result for one completed fold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldResult {
    pub fold: Fold,
    pub metrics: PerformanceMetrics,
    pub trade_count: usize,
    pub bar_count: usize,
}

/// Per-fold outcome: a failing or cancelled fold never aborts the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FoldStatus {
    Completed(FoldResult),
    Failed { fold: Fold, error: String },
    Cancelled { fold: Fold },
}

/// Aggregate walk-forward report with partial-progress accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkForwardReport {
    pub outcomes: Vec<FoldStatus>,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Mean annualized Sharpe across completed folds' test slices.
    pub mean_test_sharpe: f64,
    /// Mean total R across completed folds' test slices.
    pub mean_test_total_r: f64,
}

/// Evaluate every fold's test slice, in parallel.
///
/// Each fold owns a private engine and risk state; no fold reads another
/// fold's in-progress data. Cancellation is cooperative, checked at fold
/// boundaries only.
pub fn run_walk_forward(
    series: &AlignedSeries,
    engine_config: &EngineConfig,
    wf_config: &WalkForwardConfig,
    cancel: Option<&AtomicBool>,
) -> Result<WalkForwardReport, WalkForwardError> {
    let (range_start, range_end) = match (series.bars.first(), series.bars.last()) {
        (Some(first), Some(last)) => (first.timestamp, last.timestamp + Duration::seconds(1)),
        _ => {
            return Err(WalkForwardError::InsufficientData {
                total_days: 0,
                train_days: wf_config.train_days,
                test_days: wf_config.test_days,
            })
        }
    };

    let fold_list: Vec<Fold> = folds(range_start, range_end, wf_config)?.collect();

    let outcomes: Vec<FoldStatus> = fold_list
        .par_iter()
        .map(|fold| {
            if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
                return FoldStatus::Cancelled { fold: *fold };
            }

            let test_slice = series.slice_range(fold.test_start, fold.test_end);
            if test_slice.is_empty() {
                return FoldStatus::Failed {
                    fold: *fold,
                    error: "no bars in test range".to_string(),
                };
            }

            let engine = BacktestEngine::new(engine_config.clone());
            match engine.run(&test_slice) {
                Ok(result) => FoldStatus::Completed(FoldResult {
                    fold: *fold,
                    metrics: PerformanceMetrics::compute(&result.trades),
                    trade_count: result.trades.len(),
                    bar_count: result.bar_count,
                }),
                Err(err) => {
                    tracing::warn!(fold = fold.index, error = %err, "fold evaluation failed");
                    FoldStatus::Failed {
                        fold: *fold,
                        error: err.to_string(),
                    }
                }
            }
        })
        .collect();

    Ok(summarize(outcomes))
}

fn summarize(outcomes: Vec<FoldStatus>) -> WalkForwardReport {
    let mut completed = 0;
    let mut failed = 0;
    let mut cancelled = 0;
    let mut sharpes = Vec::new();
    let mut total_rs = Vec::new();

    for outcome in &outcomes {
        match outcome {
            FoldStatus::Completed(result) => {
                completed += 1;
                sharpes.push(result.metrics.sharpe);
                total_rs.push(result.metrics.total_r);
            }
            FoldStatus::Failed { .. } => failed += 1,
            FoldStatus::Cancelled { .. } => cancelled += 1,
        }
    }

    WalkForwardReport {
        outcomes,
        completed,
        failed,
        cancelled,
        mean_test_sharpe: crate::metrics::mean(&sharpes),
        mean_test_total_r: crate::metrics::mean(&total_rs),
    }
}

//! Performance metrics — pure functions over the trade ledger.
//!
//! The natural unit here is the R-multiple: every trade's outcome as a
//! multiple of its initial risk. Metrics take the R stream (or the
//! trade list) in and produce scalars out; nothing reaches back into
//! the engine.

use serde::{Deserialize, Serialize};

use edgelab_core::domain::Trade;

/// Aggregate statistics for one run's ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_r: f64,
    pub win_rate: f64,
    pub avg_win_r: f64,
    pub avg_loss_r: f64,
    /// Mean R per trade.
    pub expectancy_r: f64,
    pub profit_factor: f64,
    /// Deepest drop of the cumulative R curve below its running peak
    /// (<= 0, in R).
    pub max_drawdown_r: f64,
    /// Annualized mean/std of the R stream (252 trading days).
    pub sharpe: f64,
    pub trade_count: usize,
}

impl PerformanceMetrics {
    pub fn compute(trades: &[Trade]) -> Self {
        let r: Vec<f64> = trades.iter().map(|t| t.r_multiple).collect();
        Self::from_r_multiples(&r)
    }

    pub fn from_r_multiples(r: &[f64]) -> Self {
        Self {
            total_r: r.iter().sum(),
            win_rate: win_rate(r),
            avg_win_r: avg_win_r(r),
            avg_loss_r: avg_loss_r(r),
            expectancy_r: mean(r),
            profit_factor: profit_factor(r),
            max_drawdown_r: max_drawdown_r(r),
            sharpe: sharpe(r),
            trade_count: r.len(),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Fraction of trades with positive R.
pub fn win_rate(r: &[f64]) -> f64 {
    if r.is_empty() {
        return 0.0;
    }
    r.iter().filter(|&&x| x > 0.0).count() as f64 / r.len() as f64
}

/// Mean R of winning trades, 0.0 if none.
pub fn avg_win_r(r: &[f64]) -> f64 {
    let wins: Vec<f64> = r.iter().copied().filter(|&x| x > 0.0).collect();
    mean(&wins)
}

/// Mean R of losing trades (negative), 0.0 if none.
pub fn avg_loss_r(r: &[f64]) -> f64 {
    let losses: Vec<f64> = r.iter().copied().filter(|&x| x < 0.0).collect();
    mean(&losses)
}

/// Gross positive R over gross negative R, capped at 100.
pub fn profit_factor(r: &[f64]) -> f64 {
    if r.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = r.iter().filter(|&&x| x > 0.0).sum();
    let gross_loss: f64 = r.iter().filter(|&&x| x < 0.0).map(|x| x.abs()).sum();
    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

/// Deepest excursion of the cumulative R curve below its running peak.
///
/// Absolute drawdown in R (<= 0), not a percentage: the curve starts
/// at zero, so relative drawdown is meaningless here.
pub fn max_drawdown_r(r: &[f64]) -> f64 {
    let mut equity = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;
    for &x in r {
        equity += x;
        if equity > peak {
            peak = equity;
        }
        let dd = equity - peak;
        if dd < max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

/// Annualized Sharpe of the per-trade R stream.
///
/// Returns 0.0 for fewer than 2 trades or zero variance.
pub fn sharpe(r: &[f64]) -> f64 {
    if r.len() < 2 {
        return 0.0;
    }
    let m = mean(r);
    let std = std_dev(r);
    if std < 1e-15 {
        return 0.0;
    }
    (m / std) * (252.0_f64).sqrt()
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Percentile of a sorted slice using linear interpolation.
pub(crate) fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

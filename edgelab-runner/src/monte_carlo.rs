//! Monte Carlo resampling — bootstrap the trade ledger to estimate the
//! distribution of terminal equity, drawdown, and risk of ruin.
//!
//! Each path draws a sequence of R-multiples, with replacement, of the
//! same length as the input ledger, then walks the cumulative curve.
//! Every path owns a private generator derived from the base seed and
//! its path index, so results are bit-identical regardless of how many
//! worker threads rayon schedules.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use edgelab_core::rng::SeedTree;

use crate::metrics::{mean, percentile_sorted};

// ─── Configuration ───────────────────────────────────────────────────

/// Resampling parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MonteCarloConfig {
    pub n_paths: usize,
    pub seed: u64,
    /// A path is ruined once its cumulative R falls below this floor.
    pub ruin_floor_r: f64,
    /// Confidence level for VaR/CVaR of terminal R (e.g. 0.95).
    pub var_confidence: f64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            n_paths: 1_000,
            seed: 42,
            ruin_floor_r: -5.0,
            var_confidence: 0.95,
        }
    }
}

// ─── Results ─────────────────────────────────────────────────────────

/// One resampled path's outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PathOutcome {
    pub terminal_r: f64,
    pub max_drawdown_r: f64,
    pub ruined: bool,
}

/// 5th/50th/95th percentile band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PercentileBand {
    pub p05: f64,
    pub p50: f64,
    pub p95: f64,
}

impl PercentileBand {
    fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Self {
            p05: percentile_sorted(&sorted, 5.0),
            p50: percentile_sorted(&sorted, 50.0),
            p95: percentile_sorted(&sorted, 95.0),
        }
    }

    fn zero() -> Self {
        Self {
            p05: 0.0,
            p50: 0.0,
            p95: 0.0,
        }
    }
}

/// Aggregate distribution across all completed paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub n_paths_requested: usize,
    pub n_paths_completed: usize,
    /// Input ledger length each path resamples.
    pub sample_size: usize,
    pub terminal: PercentileBand,
    pub max_drawdown: PercentileBand,
    pub mean_terminal_r: f64,
    /// Fraction of paths whose cumulative R ever crossed the ruin floor.
    pub ruin_probability: f64,
    /// Terminal-R value-at-risk at the configured confidence.
    pub var_r: f64,
    /// Mean terminal R of the paths at or below VaR.
    pub cvar_r: f64,
}

impl MonteCarloSummary {
    fn degenerate(config: &MonteCarloConfig, sample_size: usize) -> Self {
        Self {
            n_paths_requested: config.n_paths,
            n_paths_completed: 0,
            sample_size,
            terminal: PercentileBand::zero(),
            max_drawdown: PercentileBand::zero(),
            mean_terminal_r: 0.0,
            ruin_probability: 0.0,
            var_r: 0.0,
            cvar_r: 0.0,
        }
    }
}

// ─── Simulation ──────────────────────────────────────────────────────

/// Walk one resampled path.
fn simulate_path(r_multiples: &[f64], seeds: &SeedTree, index: u64, ruin_floor: f64) -> PathOutcome {
    let mut rng = seeds.rng_for("path", index);
    let mut equity = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;
    let mut ruined = false;

    for _ in 0..r_multiples.len() {
        let draw = r_multiples[rng.gen_range(0..r_multiples.len())];
        equity += draw;
        if equity > peak {
            peak = equity;
        }
        let dd = equity - peak;
        if dd < max_dd {
            max_dd = dd;
        }
        if equity < ruin_floor {
            ruined = true;
        }
    }

    PathOutcome {
        terminal_r: equity,
        max_drawdown_r: max_dd,
        ruined,
    }
}

/// Resample a closed-trade R-multiple ledger.
///
/// Zero-length input produces a degenerate summary, not an error.
/// Cancellation is checked at path boundaries; cancelled paths are
/// simply absent from the aggregate, which reports how many completed.
pub fn resample(
    r_multiples: &[f64],
    config: &MonteCarloConfig,
    cancel: Option<&AtomicBool>,
) -> MonteCarloSummary {
    if r_multiples.is_empty() || config.n_paths == 0 {
        return MonteCarloSummary::degenerate(config, r_multiples.len());
    }

    let seeds = SeedTree::new(config.seed);
    let outcomes: Vec<PathOutcome> = (0..config.n_paths as u64)
        .into_par_iter()
        .filter_map(|index| {
            if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
                return None;
            }
            Some(simulate_path(r_multiples, &seeds, index, config.ruin_floor_r))
        })
        .collect();

    if outcomes.is_empty() {
        return MonteCarloSummary::degenerate(config, r_multiples.len());
    }

    let terminals: Vec<f64> = outcomes.iter().map(|o| o.terminal_r).collect();
    let drawdowns: Vec<f64> = outcomes.iter().map(|o| o.max_drawdown_r).collect();
    let ruin_count = outcomes.iter().filter(|o| o.ruined).count();

    let mut sorted_terminals = terminals.clone();
    sorted_terminals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let var_r = percentile_sorted(&sorted_terminals, (1.0 - config.var_confidence) * 100.0);
    let tail: Vec<f64> = sorted_terminals
        .iter()
        .copied()
        .filter(|&t| t <= var_r)
        .collect();
    let cvar_r = if tail.is_empty() { var_r } else { mean(&tail) };

    MonteCarloSummary {
        n_paths_requested: config.n_paths,
        n_paths_completed: outcomes.len(),
        sample_size: r_multiples.len(),
        terminal: PercentileBand::from_values(&terminals),
        max_drawdown: PercentileBand::from_values(&drawdowns),
        mean_terminal_r: mean(&terminals),
        ruin_probability: ruin_count as f64 / outcomes.len() as f64,
        var_r,
        cvar_r,
    }
}

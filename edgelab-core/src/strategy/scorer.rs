//! Expected-value scoring — converts bracket geometry plus a calibrated
//! win probability into EV in risk multiples.
//!
//! `EV = p_win * R - (1 - p_win)` where `R = target_distance / stop_distance`.
//! A candidate risking 1R to make 2R at p = 0.55 scores
//! `0.55 * 2 - 0.45 = 0.65`.

use std::cmp::Ordering;

use crate::domain::{Candidate, ScoredCandidate};

/// Compute EV for a candidate, rejecting degenerate geometry.
///
/// Returns `None` when the stop distance is non-positive or the reward
/// multiple is not finite; such candidates have no meaningful risk unit.
pub fn score(candidate: Candidate) -> Option<ScoredCandidate> {
    if candidate.stop_distance <= 0.0 {
        return None;
    }
    let reward_multiple = candidate.reward_multiple();
    if !reward_multiple.is_finite() || reward_multiple <= 0.0 {
        return None;
    }
    let p = candidate.probability;
    let ev = p * reward_multiple - (1.0 - p);
    Some(ScoredCandidate {
        candidate,
        reward_multiple,
        ev,
    })
}

/// Scorer with a configurable minimum-EV gate.
#[derive(Debug, Clone, Copy)]
pub struct EvScorer {
    min_ev: f64,
}

impl EvScorer {
    pub fn new(min_ev: f64) -> Self {
        Self { min_ev }
    }

    /// Score a candidate and apply the EV gate.
    pub fn evaluate(&self, candidate: Candidate) -> Option<ScoredCandidate> {
        score(candidate).filter(|s| s.ev >= self.min_ev)
    }

    pub fn min_ev(&self) -> f64 {
        self.min_ev
    }
}

/// Ordering used to pick among candidates at the same timestamp:
/// higher EV first; ties broken by larger reward multiple, then by lower
/// required probability (the more conservative signal).
pub fn preference(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.ev
        .partial_cmp(&a.ev)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            b.reward_multiple
                .partial_cmp(&a.reward_multiple)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| {
            a.required_probability()
                .partial_cmp(&b.required_probability())
                .unwrap_or(Ordering::Equal)
        })
}

/// Sort scored candidates best-first.
pub fn rank(scored: &mut [ScoredCandidate]) {
    scored.sort_by(preference);
}

//! EdgeLab Core — the decision pipeline and its execution simulator.
//!
//! This crate turns a stream of (bar, feature vector, model probability)
//! tuples into risk-sized simulated trades:
//! - Domain types (bars, contracts, candidates, orders, trades)
//! - Candidate pipeline: generator → EV scorer → rule filter
//! - Risk manager over an explicit, engine-owned risk state
//! - Execution simulator with slippage/fee models behind a broker trait
//! - Bar-by-bar backtest engine with strict temporal causality
//! - Deterministic seed derivation for resampling collaborators

pub mod domain;
pub mod engine;
pub mod execution;
pub mod risk;
pub mod rng;
pub mod session;
pub mod strategy;

//! Position sizing and account-level risk limits.

pub mod manager;
pub mod state;

pub use manager::{RiskBreach, RiskConfig, RiskManager};
pub use state::{RiskState, SessionCounters};

//! Slippage models: the gap between a reference price and the fill.
//!
//! Market-style fills (entries, triggered stops, timeout closes) pay
//! slippage; target exits are limit-style and fill at their level.

use serde::{Deserialize, Serialize};

use crate::domain::ContractSpec;

/// Computes the adverse price adjustment for a market-style fill.
pub trait SlippageModel: Send + Sync {
    /// Slippage in price units (always >= 0; the caller applies the
    /// adverse direction).
    fn compute(&self, spec: &ContractSpec, reference_price: f64) -> f64;

    /// Name of this model.
    fn name(&self) -> &str;
}

/// Fixed slippage: a constant number of ticks per fill.
#[derive(Debug, Clone, Copy)]
pub struct FixedTicks {
    pub ticks: f64,
}

impl FixedTicks {
    pub fn new(ticks: f64) -> Self {
        Self { ticks }
    }
}

impl SlippageModel for FixedTicks {
    fn compute(&self, spec: &ContractSpec, _reference_price: f64) -> f64 {
        spec.ticks_to_price(self.ticks)
    }

    fn name(&self) -> &str {
        "FixedTicks"
    }
}

/// Proportional slippage: a fraction of the reference price, rounded to
/// the tick grid.
#[derive(Debug, Clone, Copy)]
pub struct Proportional {
    pub fraction: f64,
}

impl Proportional {
    pub fn new(fraction: f64) -> Self {
        Self { fraction }
    }
}

impl SlippageModel for Proportional {
    fn compute(&self, spec: &ContractSpec, reference_price: f64) -> f64 {
        spec.round_to_tick(reference_price * self.fraction)
    }

    fn name(&self) -> &str {
        "Proportional"
    }
}

/// Serializable slippage selection for the configuration surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlippageConfig {
    FixedTicks { ticks: f64 },
    Proportional { fraction: f64 },
}

impl SlippageConfig {
    pub fn build(&self) -> Box<dyn SlippageModel> {
        match *self {
            SlippageConfig::FixedTicks { ticks } => Box::new(FixedTicks::new(ticks)),
            SlippageConfig::Proportional { fraction } => Box::new(Proportional::new(fraction)),
        }
    }
}

impl Default for SlippageConfig {
    fn default() -> Self {
        SlippageConfig::FixedTicks { ticks: 0.5 }
    }
}

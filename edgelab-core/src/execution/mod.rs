//! Execution simulation: slippage, fees, the order state machine, and
//! the broker capability interface.

pub mod broker;
pub mod fees;
pub mod simulator;
pub mod slippage;

use serde::{Deserialize, Serialize};

pub use broker::{Broker, ClosedPosition, SimBroker};
pub use fees::FeeModel;
pub use simulator::{ExecutionSimulator, OpenOrder, OrderStatus};
pub use slippage::{FixedTicks, Proportional, SlippageConfig, SlippageModel};

/// Serializable execution settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionConfig {
    pub slippage: SlippageConfig,
    pub fee_per_contract: f64,
    pub max_holding_bars: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            slippage: SlippageConfig::default(),
            fee_per_contract: 2.5,
            max_holding_bars: 30,
        }
    }
}

impl ExecutionConfig {
    pub fn build(&self) -> ExecutionSimulator {
        ExecutionSimulator::new(
            self.slippage.build(),
            FeeModel::new(self.fee_per_contract),
            self.max_holding_bars,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builds_simulator() {
        let sim = ExecutionConfig::default().build();
        assert_eq!(sim.max_holding_bars(), 30);
    }

    #[test]
    fn config_serialization_roundtrip() {
        let config = ExecutionConfig {
            slippage: SlippageConfig::Proportional { fraction: 0.0001 },
            fee_per_contract: 1.25,
            max_holding_bars: 45,
        };
        let json = serde_json::to_string(&config).unwrap();
        let deser: ExecutionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deser);
    }
}

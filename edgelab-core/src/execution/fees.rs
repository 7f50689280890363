//! Exchange and broker fees: a flat per-contract cost on each side.

use serde::{Deserialize, Serialize};

/// Per-contract fee, charged on entry and again on exit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeeModel {
    pub per_contract: f64,
}

impl FeeModel {
    pub fn new(per_contract: f64) -> Self {
        Self { per_contract }
    }

    /// Cost of one side (entry or exit) for `quantity` contracts.
    pub fn side_cost(&self, quantity: u32) -> f64 {
        self.per_contract * quantity as f64
    }

    /// Round-trip cost for `quantity` contracts.
    pub fn round_trip(&self, quantity: u32) -> f64 {
        2.0 * self.side_cost(quantity)
    }
}

impl Default for FeeModel {
    fn default() -> Self {
        Self { per_contract: 2.5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_both_sides() {
        let fees = FeeModel::new(2.5);
        assert_eq!(fees.side_cost(4), 10.0);
        assert_eq!(fees.round_trip(4), 20.0);
    }
}

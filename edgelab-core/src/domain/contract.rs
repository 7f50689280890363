//! ContractSpec — static per-instrument trading parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::SessionSpec;

/// Static trading parameters for one futures contract.
///
/// `tick_value` is dollars per tick per contract; `point_value` is dollars
/// per full point (`tick_value / tick_size`). `max_contracts` is a hard
/// per-instrument position ceiling independent of the margin check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractSpec {
    pub symbol: String,
    pub tick_size: f64,
    pub tick_value: f64,
    pub point_value: f64,
    pub initial_margin: f64,
    pub max_contracts: u32,
    pub session: SessionSpec,
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("price {price} does not sit on the {tick_size} tick grid")]
    OffTickGrid { price: f64, tick_size: f64 },
}

impl ContractSpec {
    /// CME E-mini Nasdaq-100.
    pub fn nq() -> Self {
        Self {
            symbol: "NQ".into(),
            tick_size: 0.25,
            tick_value: 5.0,
            point_value: 20.0,
            initial_margin: 17_500.0,
            max_contracts: 10,
            session: SessionSpec::globex_rth(),
        }
    }

    /// CME Micro E-mini Nasdaq-100.
    pub fn mnq() -> Self {
        Self {
            symbol: "MNQ".into(),
            tick_size: 0.25,
            tick_value: 0.5,
            point_value: 2.0,
            initial_margin: 1_750.0,
            max_contracts: 100,
            session: SessionSpec::globex_rth(),
        }
    }

    /// Convert a price distance to ticks.
    pub fn price_to_ticks(&self, price: f64) -> f64 {
        price / self.tick_size
    }

    /// Convert ticks to a price distance.
    pub fn ticks_to_price(&self, ticks: f64) -> f64 {
        ticks * self.tick_size
    }

    /// Dollar risk of one contract for a given stop distance in price units.
    pub fn risk_per_contract(&self, stop_distance: f64) -> f64 {
        self.price_to_ticks(stop_distance) * self.tick_value
    }

    /// Round a price to the nearest tick.
    pub fn round_to_tick(&self, price: f64) -> f64 {
        (price / self.tick_size).round() * self.tick_size
    }

    /// Validate that a price sits on the tick grid.
    pub fn validate_price(&self, price: f64) -> Result<f64, ContractError> {
        let ticks = price / self.tick_size;
        if (ticks - ticks.round()).abs() > 1e-10 {
            return Err(ContractError::OffTickGrid {
                price,
                tick_size: self.tick_size,
            });
        }
        Ok(price)
    }

    /// Largest position the margin budget allows at the given equity.
    pub fn margin_capacity(&self, equity: f64) -> u32 {
        if equity <= 0.0 {
            return 0;
        }
        if self.initial_margin <= 0.0 {
            return self.max_contracts;
        }
        let by_margin = (equity / self.initial_margin).floor();
        (by_margin as u32).min(self.max_contracts)
    }
}

//! Bar — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for a single symbol at a single timestamp.
///
/// Bars arrive pre-aggregated from the ingestion collaborator. The engine
/// assumes strictly increasing timestamps per symbol; `validate` enforces
/// the shape invariants for a single bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Why a bar failed validation.
#[derive(Debug, Error)]
pub enum BarError {
    #[error("{symbol}@{timestamp}: non-finite OHLCV field")]
    NonFinite {
        symbol: String,
        timestamp: DateTime<Utc>,
    },
    #[error("{symbol}@{timestamp}: non-positive price")]
    NonPositivePrice {
        symbol: String,
        timestamp: DateTime<Utc>,
    },
    #[error("{symbol}@{timestamp}: high/low do not bracket open/close")]
    BrokenRange {
        symbol: String,
        timestamp: DateTime<Utc>,
    },
    #[error("{symbol}@{timestamp}: negative volume")]
    NegativeVolume {
        symbol: String,
        timestamp: DateTime<Utc>,
    },
}

impl Bar {
    /// Intrabar range in price units.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Sanity check: finite, positive prices, high >= max(open, close),
    /// low <= min(open, close), volume >= 0.
    pub fn is_sane(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validate shape invariants, returning the specific violation.
    pub fn validate(&self) -> Result<(), BarError> {
        let fields = [self.open, self.high, self.low, self.close, self.volume];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(BarError::NonFinite {
                symbol: self.symbol.clone(),
                timestamp: self.timestamp,
            });
        }
        if self.open <= 0.0 || self.high <= 0.0 || self.low <= 0.0 || self.close <= 0.0 {
            return Err(BarError::NonPositivePrice {
                symbol: self.symbol.clone(),
                timestamp: self.timestamp,
            });
        }
        if self.high < self.open.max(self.close) || self.low > self.open.min(self.close) {
            return Err(BarError::BrokenRange {
                symbol: self.symbol.clone(),
                timestamp: self.timestamp,
            });
        }
        if self.volume < 0.0 {
            return Err(BarError::NegativeVolume {
                symbol: self.symbol.clone(),
                timestamp: self.timestamp,
            });
        }
        Ok(())
    }
}

//! AlignedSeries — the validated, memory-resident input to one run.
//!
//! Bars, feature vectors, and model outputs are aligned by timestamp.
//! Feature/model gaps are tolerated (the engine skips those bars);
//! out-of-order or malformed bars are fatal.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::domain::{Bar, FeatureVector, ModelOutput};
use crate::engine::EngineError;

/// One symbol's bar stream plus its timestamp-aligned collaborator data.
#[derive(Debug, Clone, Default)]
pub struct AlignedSeries {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub features: BTreeMap<DateTime<Utc>, FeatureVector>,
    pub outputs: BTreeMap<DateTime<Utc>, ModelOutput>,
}

impl AlignedSeries {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
            features: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Append a bar with its aligned feature/model data.
    pub fn push(&mut self, bar: Bar, features: FeatureVector, output: ModelOutput) {
        self.features.insert(bar.timestamp, features);
        self.outputs.insert(bar.timestamp, output);
        self.bars.push(bar);
    }

    /// Append a bar with no collaborator data (a gap).
    pub fn push_bar_only(&mut self, bar: Bar) {
        self.bars.push(bar);
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Fatal input validation: every bar well-formed and owned by this
    /// symbol, timestamps strictly increasing.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.bars.is_empty() {
            return Err(EngineError::EmptySeries);
        }
        let mut prev: Option<DateTime<Utc>> = None;
        for bar in &self.bars {
            if bar.symbol != self.symbol {
                return Err(EngineError::SymbolMismatch {
                    expected: self.symbol.clone(),
                    found: bar.symbol.clone(),
                });
            }
            bar.validate()?;
            if let Some(prev_ts) = prev {
                if bar.timestamp <= prev_ts {
                    return Err(EngineError::NonMonotonicTimestamps {
                        symbol: self.symbol.clone(),
                        timestamp: bar.timestamp,
                    });
                }
            }
            prev = Some(bar.timestamp);
        }
        Ok(())
    }

    /// Sub-series over `[start, end)`, carrying the matching
    /// feature/model entries. Used to slice walk-forward folds.
    pub fn slice_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> AlignedSeries {
        let bars: Vec<Bar> = self
            .bars
            .iter()
            .filter(|b| b.timestamp >= start && b.timestamp < end)
            .cloned()
            .collect();
        let features = self
            .features
            .range(start..end)
            .map(|(k, v)| (*k, v.clone()))
            .collect();
        let outputs = self
            .outputs
            .range(start..end)
            .map(|(k, v)| (*k, v.clone()))
            .collect();
        AlignedSeries {
            symbol: self.symbol.clone(),
            bars,
            features,
            outputs,
        }
    }

    /// First `n` bars with their aligned data.
    pub fn truncate(&self, n: usize) -> AlignedSeries {
        if n == 0 {
            return AlignedSeries::new(self.symbol.clone());
        }
        match self.bars.get(n - 1) {
            Some(last) if n < self.bars.len() => {
                let end = last.timestamp + chrono::Duration::nanoseconds(1);
                let start = self.bars[0].timestamp;
                self.slice_range(start, end)
            }
            _ => self.clone(),
        }
    }
}

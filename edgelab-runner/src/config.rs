//! Serializable run configuration.
//!
//! The core consumes these options; it does not own their storage. A
//! `RunConfig` captures everything needed to reproduce a validation run
//! and hashes to a content-addressed id, so two identical configs can
//! share cached results downstream.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use edgelab_core::engine::EngineConfig;

use crate::monte_carlo::MonteCarloConfig;
use crate::walk_forward::WalkForwardConfig;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

/// Full configuration surface for one validation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub engine: EngineConfig,
    pub walk_forward: WalkForwardConfig,
    pub monte_carlo: MonteCarloConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            walk_forward: WalkForwardConfig::default(),
            monte_carlo: MonteCarloConfig::default(),
        }
    }
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl RunConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Deterministic hash id for this configuration.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Symbol this run trades, from the contract spec.
    pub fn symbol(&self) -> &str {
        &self.engine.contract.symbol
    }
}

//! Domain types for EdgeLab.

pub mod bar;
pub mod candidate;
pub mod contract;
pub mod feature;
pub mod order;
pub mod trade;

pub use bar::{Bar, BarError};
pub use candidate::{Candidate, ScoredCandidate, Side};
pub use contract::{ContractError, ContractSpec};
pub use feature::{FeatureVector, ModelOutput};
pub use order::SizedOrder;
pub use trade::{ExitReason, Trade};

/// Symbol type alias
pub type Symbol = String;

//! Candidate pipeline: generation, EV scoring, and rule filtering.

pub mod generator;
pub mod rules;
pub mod scorer;

pub use generator::{CandidateGenerator, GeneratorConfig};
pub use rules::{
    apply_rules, build_rules, RejectReason, RejectedCandidate, Rule, RuleConfig,
};
pub use scorer::{rank, score, EvScorer};

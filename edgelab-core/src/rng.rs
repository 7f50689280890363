//! Deterministic seed derivation for resampling work.
//!
//! A base seed expands into per-(label, index) sub-seeds via BLAKE3.
//! Derivation is hash-based rather than order-dependent, so path 17
//! gets the same generator whether paths run sequentially or across a
//! thread pool — reproducibility survives parallel execution.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Expands one base seed into independent per-unit generators.
#[derive(Debug, Clone, Copy)]
pub struct SeedTree {
    base_seed: u64,
}

impl SeedTree {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Deterministic sub-seed for a (label, index) pair.
    pub fn sub_seed(&self, label: &str, index: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.base_seed.to_le_bytes());
        hasher.update(label.as_bytes());
        hasher.update(&index.to_le_bytes());
        let hash = hasher.finalize();
        u64::from_le_bytes(hash.as_bytes()[..8].try_into().expect("8-byte prefix"))
    }

    /// Seeded generator for a (label, index) pair.
    pub fn rng_for(&self, label: &str, index: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.sub_seed(label, index))
    }
}

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

/// The seed used when a model does not configure one.
pub const DEFAULT_SEED: u64 = 42;

/// The uniform random number generator shared by every variate in a model.
/// A fixed seed and a fixed event insertion order make a run reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniformRNG {
    seed: u64,
    rng: Pcg64Mcg,
}

impl UniformRNG {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rng(&mut self) -> &mut Pcg64Mcg {
        &mut self.rng
    }
}

impl Default for UniformRNG {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

//! Local pseudo-random fallback (`StdRng`).
//!
//! Only used when quantum mode is not requested. Seeded runs are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PseudoRandom {
    rng: StdRng,
}

impl PseudoRandom {
    /// Seeds from `seed` when given, otherwise from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::from_seed(s),
            None => Self {
                rng: StdRng::from_os_rng(),
            },
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `count` uniform values in `[0, 2^bits)`; `bits` must be `1..=64`.
    pub fn draw(&mut self, count: usize, bits: u32) -> Vec<u64> {
        let max = if bits >= 64 {
            u64::MAX
        } else {
            (1u64 << bits) - 1
        };
        debug!(count, bits, "drawing pseudo-random values");
        (0..count).map(|_| self.rng.random_range(0..=max)).collect()
    }
}

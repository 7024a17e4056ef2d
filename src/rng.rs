//! Per-worker deterministic RNG streams.
//!
//! Every stochastic choice in the solver goes through a [Dice] stream. Each
//! worker owns exactly one stream, so a fixed global seed plus a fixed worker
//! count reproduces every draw of a run.
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A single worker's RNG stream.
#[derive(Clone, Debug)]
pub struct Dice {
    rng: SmallRng,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Uniform integer in `[0, ceiling)`. `ceiling` must be positive.
    pub fn roll(&mut self, ceiling: usize) -> usize {
        debug_assert!(ceiling > 0, "roll() needs a positive ceiling");
        self.rng.gen_range(0..ceiling)
    }

    pub fn coin(&mut self) -> bool {
        self.rng.gen::<bool>()
    }
}

/// One stream per worker. Stream `i` is seeded `global_seed + i`; a zero
/// global seed draws every stream from entropy instead.
pub fn spawn_streams(global_seed: u32, workers: usize) -> Vec<Dice> {
    (0..workers)
        .map(|i| {
            if global_seed == 0 {
                Dice::from_entropy()
            } else {
                Dice::from_seed(global_seed as u64 + i as u64)
            }
        })
        .collect()
}

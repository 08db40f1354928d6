use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Randomness source for the tag simulation.
///
/// The mutation process draws every random decision through this trait so
/// tests can inject fixed sequences and drive the simulation
/// deterministically.
pub trait SimulationRng: Send {
    /// Uniform integer in the inclusive range [lo, hi].
    fn int_between(&mut self, lo: i64, hi: i64) -> i64;

    /// Bernoulli trial with the given probability.
    fn chance(&mut self, probability: f64) -> bool;
}

/// Default entropy-seeded implementation.
pub struct ThreadSimulationRng {
    rng: SmallRng,
}

impl ThreadSimulationRng {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl Default for ThreadSimulationRng {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationRng for ThreadSimulationRng {
    fn int_between(&mut self, lo: i64, hi: i64) -> i64 {
        self.rng.gen_range(lo..=hi)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }
}

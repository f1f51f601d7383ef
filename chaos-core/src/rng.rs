use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::Normal;

/// Reproducible random stream shared by every mutation step of a run.
///
/// The stream is always threaded through explicitly (`&mut`), so two runs
/// with the same seed and the same processing order consume identical draws.
#[derive(Debug, Clone)]
pub struct SeededRandomStream {
    seed: u64,
    rng: StdRng,
}

impl SeededRandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in the inclusive range `[lo, hi]`. A reversed range
    /// collapses to `lo`.
    pub fn int_range(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Draw from a normal distribution. A non-finite or negative deviation
    /// yields the mean without consuming a draw.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        match Normal::new(mean, std_dev) {
            Ok(dist) => self.rng.sample(dist),
            Err(_) => mean,
        }
    }
}

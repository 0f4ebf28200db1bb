//! Random number generation for the toy event generator
//!
//! Each batch of events gets its own generator, seeded from the batch index,
//! so that the generated events do not depend on how batches are scheduled.

use crate::numeric::Float;

use prefix_num_ops::real::*;
use rand::{Rng, SeedableRng};

// Select random number generation engine in use
#[cfg(feature = "f32")]
type Engine = rand_xoshiro::Xoshiro128Plus;
#[cfg(not(feature = "f32"))]
type Engine = rand_xoshiro::Xoshiro256Plus;

/// Seed of the first batch of events
const BASE_SEED: u64 = 12345;

/// Facade over the random number generation engine
#[derive(Clone)]
pub struct RandomGenerator {
    rng: Engine,
}
//
impl RandomGenerator {
    /// Generator for the n-th batch of events
    pub fn for_batch(batch_id: usize) -> Self {
        Self {
            rng: Engine::seed_from_u64(BASE_SEED.wrapping_add(batch_id as u64)),
        }
    }

    /// Random floating-point number between 0 and 1
    pub fn random(&mut self) -> Float {
        self.rng.gen()
    }

    /// Uniformly distributed number between min and max
    pub fn range(&mut self, min: Float, max: Float) -> Float {
        min + (max - min) * self.random()
    }

    /// Uniformly distributed index below n
    pub fn index(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }

    /// Exponentially distributed number with a given mean
    pub fn exponential(&mut self, mean: Float) -> Float {
        // 1 - u lies in (0, 1], so the logarithm is finite
        -mean * ln(1. - self.random())
    }

    /// Truth of an event with a given probability
    pub fn chance(&mut self, probability: Float) -> bool {
        self.random() < probability
    }
}

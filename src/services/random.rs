//! Pluggable randomness for the recommendation diversity term.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of uniformly distributed values in `[0, 1)`
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// Thread-local generator, fresh entropy on every draw
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Deterministic generator for reproducible orderings
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&self) -> f64 {
        // A poisoned lock still holds a usable generator
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen::<f64>()
    }
}

/// Replays a fixed list of values, wrapping around at the end
pub struct FixedSequence {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl FixedSequence {
    /// Values are clamped into `[0, 1)`. An empty list always yields 0.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values = values
            .into()
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for FixedSequence {
    fn next_unit(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.values.len();
        self.values[index]
    }
}

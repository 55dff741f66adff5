//! Random source used by gameplay systems
//!
//! Systems never touch an RNG directly; they go through `RandomSource` so a
//! host can supply its own (seeded, predicted, scripted in tests).

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

use crate::core::types::Angle;

pub trait RandomSource {
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Uniform float in `[0, max)`
    fn next_float(&mut self, max: f32) -> f32;

    /// Uniform angle in `[0, 2π)`
    fn next_angle(&mut self) -> Angle;

    /// Uniform angle in `[min, max)`
    fn next_angle_between(&mut self, min: Angle, max: Angle) -> Angle;

    /// Uniform pick from a slice
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if items.is_empty() {
            return None;
        }
        let idx = self.pick_index(items.len());
        items.get(idx)
    }
}

/// Seeded deterministic random source
#[derive(Debug, Clone)]
pub struct SimRng(ChaCha8Rng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandomSource for SimRng {
    fn pick_index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }

    fn next_float(&mut self, max: f32) -> f32 {
        if max <= 0.0 {
            return 0.0;
        }
        self.0.gen_range(0.0..max)
    }

    fn next_angle(&mut self) -> Angle {
        Angle(self.0.gen_range(0.0..TAU))
    }

    fn next_angle_between(&mut self, min: Angle, max: Angle) -> Angle {
        if max.0 <= min.0 {
            return min;
        }
        Angle(self.0.gen_range(min.0..max.0))
    }
}

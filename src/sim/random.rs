//! Seeded random generation
//!
//! One PCG stream per game; the same seed always replays the same spawns.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::Color;
use crate::consts::COLOR_ALPHA;
use crate::settings::SampleRange;

/// Seeded uniform scalar/color source
#[derive(Debug, Clone)]
pub struct GameRng {
    seed: u64,
    rng: Pcg32,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[min(a, b), max(a, b)]`, both ends reachable
    pub fn uniform_float(&mut self, a: f32, b: f32) -> f32 {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        // u32 / u32::MAX keeps the upper bound inclusive
        let t = self.rng.random::<u32>() as f64 / u32::MAX as f64;
        let v = low as f64 + t * (high as f64 - low as f64);
        // A NaN bound yields the other bound
        (v as f32).max(low).min(high)
    }

    /// Uniform sample of a configured range
    pub fn sample(&mut self, range: SampleRange) -> f32 {
        self.uniform_float(range.min, range.max)
    }

    /// Random opaque-ish color (alpha fixed at 0.8)
    pub fn random_color(&mut self) -> Color {
        let r = self.uniform_float(0.0, 1.0);
        let g = self.uniform_float(0.0, 1.0);
        let b = self.uniform_float(0.0, 1.0);
        Color::rgba(r, g, b, COLOR_ALPHA)
    }

    /// Uniform index in `0..len`
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

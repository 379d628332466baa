//! Seeded, portable random source
//!
//! All stochastic choices in the crate flow through `SeededRng`, which wraps ChaCha8 so
//! that a given seed yields the same stream on every platform and toolchain.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Purpose tags used to split one settings seed into independent streams
pub mod stream {
    /// Noise octave phase offsets
    pub const NOISE_PHASE: u64 = 0x6e6f_6973_6550;
    /// Noise lattice permutation and feature points
    pub const NOISE_LATTICE: u64 = 0x6c61_7474_6963;
    /// Wang tile colours
    pub const WANG_COLORS: u64 = 0x7761_6e67_436f;
    /// Layout candidate shuffling
    pub const LAYOUT: u64 = 0x6c61_796f_7574;
    /// Patch placement for texture synthesis
    pub const QUILTING: u64 = 0x7175_696c_7473;
}

/// Deterministic random selector for reproducible stochastic choices
#[derive(Clone, Debug)]
pub struct SeededRng {
    rng: ChaCha8Rng,
}

impl SeededRng {
    /// Create a generator from a settings seed
    pub fn new(seed: i64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed as u64),
        }
    }

    /// Create a generator for an independent purpose derived from `seed`
    pub fn derived(seed: i64, purpose: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(derive_seed(seed as u64, purpose)),
        }
    }

    /// Uniform value in `[0, 1)`
    pub fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Uniform value in `[low, high)`; returns `low` for an empty range
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..high)
    }

    /// Uniform index in `[0, upper)`; returns 0 when `upper` is 0
    pub fn index(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        self.rng.random_range(0..upper)
    }

    /// Uniform byte
    pub fn byte(&mut self) -> u8 {
        self.rng.random::<u8>()
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

/// Mix a purpose tag into a seed to produce an independent sub-seed
pub const fn derive_seed(seed: u64, purpose: u64) -> u64 {
    let mut hash = seed ^ purpose;
    hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
    hash ^= hash >> 32;
    hash
}

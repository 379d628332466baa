//! Deterministic fractal noise fields
//!
//! A `NoiseField` sums octaves of a base function (gradient, simplex or cellular noise)
//! with per-octave phase offsets drawn from a seeded stream. Perlin and Worley lattices
//! wrap with an integer period per octave, so their fields tile exactly across the
//! sampled width and height.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::io::error::{Result, invalid_parameter};
use crate::math::random::{SeededRng, stream};

const PERMUTATION_SIZE: usize = 256;

/// Highest frequency, in lattice cells per pixel, any octave may reach
pub const MAX_OCTAVE_FREQUENCY: f64 = PERMUTATION_SIZE as f64;

// Skew factors for 2D simplex noise
const SIMPLEX_F2: f64 = 0.366_025_403_784_438_6;
const SIMPLEX_G2: f64 = 0.211_324_865_405_187_1;

const GRADIENTS: [[f64; 2]; 8] = [
    [1.0, 0.0],
    [-1.0, 0.0],
    [0.0, 1.0],
    [0.0, -1.0],
    [std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2],
    [-std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2],
    [std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2],
    [-std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2],
];

/// Base function summed by the fractal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NoiseKind {
    /// Lattice gradient noise
    #[default]
    Perlin,
    /// Simplex gradient noise (not periodic)
    Simplex,
    /// Cellular F1 distance noise
    Worley,
}

impl NoiseKind {
    /// Whether this kind tiles exactly across the sampled area
    pub const fn is_periodic(self) -> bool {
        matches!(self, Self::Perlin | Self::Worley)
    }
}

/// Octave parameters for fractal summation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalParams {
    /// Base frequency in lattice cells per pixel
    pub scale: f64,
    /// Number of octaves summed
    pub octaves: u32,
    /// Amplitude multiplier applied per octave
    pub persistence: f64,
    /// Frequency multiplier applied per octave
    pub lacunarity: f64,
}

impl FractalParams {
    /// Frequency of the busiest octave in lattice cells per pixel
    pub fn peak_frequency(&self) -> f64 {
        let exponent = self.octaves.saturating_sub(1).min(i32::MAX as u32) as i32;
        self.scale * self.lacunarity.powi(exponent).max(1.0)
    }

    /// Sum of the octave amplitudes used for normalization
    pub fn amplitude_total(&self) -> f64 {
        let mut amplitude = 1.0;
        let mut total = 0.0;
        for _ in 0..self.octaves {
            total += amplitude;
            amplitude *= self.persistence;
            if !total.is_finite() {
                break;
            }
        }
        total
    }
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            scale: 0.1,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Seeded noise generator for one base function
#[derive(Debug, Clone)]
pub struct NoiseField {
    kind: NoiseKind,
    seed: i64,
    permutation: Vec<u8>,
}

impl NoiseField {
    /// Build the permutation table for `seed`
    pub fn new(kind: NoiseKind, seed: i64) -> Self {
        let mut table: Vec<u8> = (0..PERMUTATION_SIZE).map(|i| i as u8).collect();
        let mut rng = SeededRng::derived(seed, stream::NOISE_LATTICE);
        rng.shuffle(&mut table);

        // Doubled so hash lookups never wrap
        let mut permutation = table.clone();
        permutation.extend_from_slice(&table);

        Self {
            kind,
            seed,
            permutation,
        }
    }

    /// Base function of this field
    pub const fn kind(&self) -> NoiseKind {
        self.kind
    }

    /// Sample a `height x width` field with every value in `[0, 1]`
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero, if the scale, persistence or
    /// lacunarity is not a positive finite number, if no octaves are requested, if an
    /// octave would exceed [`MAX_OCTAVE_FREQUENCY`] or if the amplitudes overflow
    pub fn sample(&self, width: usize, height: usize, params: &FractalParams) -> Result<Array2<f64>> {
        validate_params(width, height, params)?;

        let mut phase_rng = SeededRng::derived(self.seed, stream::NOISE_PHASE);
        let mut octaves = Vec::with_capacity(params.octaves as usize);
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        for _ in 0..params.octaves {
            let offset = (
                phase_rng.range_f64(0.0, PERMUTATION_SIZE as f64),
                phase_rng.range_f64(0.0, PERMUTATION_SIZE as f64),
            );
            let period_x = lattice_period(width, params.scale * frequency);
            let period_y = lattice_period(height, params.scale * frequency);
            octaves.push(Octave {
                amplitude,
                frequency,
                offset,
                period: (period_x, period_y),
            });
            amplitude *= params.persistence;
            frequency *= params.lacunarity;
        }
        let amplitude_total: f64 = octaves.iter().map(|octave| octave.amplitude).sum();

        let mut field = Array2::zeros((height, width));
        for ((row, col), value) in field.indexed_iter_mut() {
            let mut sum = 0.0;
            for octave in &octaves {
                sum += octave.amplitude * self.octave_value(col, row, width, height, octave, params);
            }
            let normalized = sum / amplitude_total;
            if !normalized.is_finite() {
                *value = 0.5;
                continue;
            }
            *value = f64::midpoint(normalized, 1.0).clamp(0.0, 1.0);
        }
        Ok(field)
    }

    fn octave_value(
        &self,
        col: usize,
        row: usize,
        width: usize,
        height: usize,
        octave: &Octave,
        params: &FractalParams,
    ) -> f64 {
        match self.kind {
            NoiseKind::Perlin | NoiseKind::Worley => {
                // Stretch so an integer number of lattice cells spans the field
                let u = col as f64 * octave.period.0 as f64 / width as f64 + octave.offset.0;
                let v = row as f64 * octave.period.1 as f64 / height as f64 + octave.offset.1;
                if self.kind == NoiseKind::Perlin {
                    self.perlin(u, v, octave.period)
                } else {
                    self.worley(u, v, octave.period)
                }
            }
            NoiseKind::Simplex => {
                let u = (col as f64).mul_add(params.scale * octave.frequency, octave.offset.0);
                let v = (row as f64).mul_add(params.scale * octave.frequency, octave.offset.1);
                self.simplex(u, v)
            }
        }
    }

    fn perm(&self, index: usize) -> usize {
        usize::from(self.permutation.get(index & 511).copied().unwrap_or(0))
    }

    fn hash(&self, x: usize, y: usize) -> usize {
        self.perm(self.perm(x & 255) + (y & 255))
    }

    fn gradient_dot(&self, x: usize, y: usize, dx: f64, dy: f64) -> f64 {
        let gradient = GRADIENTS
            .get(self.hash(x, y) & 7)
            .copied()
            .unwrap_or([1.0, 0.0]);
        gradient[0].mul_add(dx, gradient[1] * dy)
    }

    fn perlin(&self, u: f64, v: f64, period: (usize, usize)) -> f64 {
        let x0 = u.floor();
        let y0 = v.floor();
        let fx = u - x0;
        let fy = v - y0;

        let xi0 = wrap(x0 as i64, period.0);
        let xi1 = wrap((x0 as i64).wrapping_add(1), period.0);
        let yi0 = wrap(y0 as i64, period.1);
        let yi1 = wrap((y0 as i64).wrapping_add(1), period.1);

        let n00 = self.gradient_dot(xi0, yi0, fx, fy);
        let n10 = self.gradient_dot(xi1, yi0, fx - 1.0, fy);
        let n01 = self.gradient_dot(xi0, yi1, fx, fy - 1.0);
        let n11 = self.gradient_dot(xi1, yi1, fx - 1.0, fy - 1.0);

        let sx = fade(fx);
        let sy = fade(fy);
        let top = lerp(n00, n10, sx);
        let bottom = lerp(n01, n11, sx);
        (lerp(top, bottom, sy) * std::f64::consts::SQRT_2).clamp(-1.0, 1.0)
    }

    fn simplex(&self, u: f64, v: f64) -> f64 {
        let skew = (u + v) * SIMPLEX_F2;
        let i = (u + skew).floor();
        let j = (v + skew).floor();
        let unskew = (i + j) * SIMPLEX_G2;
        let x0 = u - (i - unskew);
        let y0 = v - (j - unskew);

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };
        let x1 = x0 - f64::from(i1) + SIMPLEX_G2;
        let y1 = y0 - f64::from(j1) + SIMPLEX_G2;
        let x2 = 2.0f64.mul_add(SIMPLEX_G2, x0 - 1.0);
        let y2 = 2.0f64.mul_add(SIMPLEX_G2, y0 - 1.0);

        let ii = wrap(i as i64, PERMUTATION_SIZE);
        let jj = wrap(j as i64, PERMUTATION_SIZE);

        let corner = |x: f64, y: f64, gi: usize, gj: usize| {
            let t = 0.5 - x.mul_add(x, y * y);
            if t < 0.0 {
                0.0
            } else {
                let t2 = t * t;
                t2 * t2 * self.gradient_dot(gi, gj, x, y)
            }
        };

        let n0 = corner(x0, y0, ii, jj);
        let n1 = corner(x1, y1, ii + i1 as usize, jj + j1 as usize);
        let n2 = corner(x2, y2, ii + 1, jj + 1);
        (70.0 * (n0 + n1 + n2)).clamp(-1.0, 1.0)
    }

    fn worley(&self, u: f64, v: f64, period: (usize, usize)) -> f64 {
        let cell_x = u.floor() as i64;
        let cell_y = v.floor() as i64;
        let mut nearest = f64::MAX;

        for dy in -1..=1 {
            for dx in -1..=1 {
                let cx = cell_x.wrapping_add(dx);
                let cy = cell_y.wrapping_add(dy);
                let wx = wrap(cx, period.0);
                let wy = wrap(cy, period.1);
                let jitter_x = self.hash(wx, wy) as f64 / 255.0;
                let jitter_y = self.hash(wx + 127, wy + 61) as f64 / 255.0;
                let feature_x = cx as f64 + jitter_x;
                let feature_y = cy as f64 + jitter_y;
                let distance = (u - feature_x).hypot(v - feature_y);
                nearest = nearest.min(distance);
            }
        }

        2.0f64.mul_add(nearest.min(1.0), -1.0)
    }
}

/// Sample a noise field in one call
///
/// # Errors
///
/// Returns an error under the same conditions as [`NoiseField::sample`]
pub fn sample(
    kind: NoiseKind,
    seed: i64,
    width: usize,
    height: usize,
    params: &FractalParams,
) -> Result<Array2<f64>> {
    NoiseField::new(kind, seed).sample(width, height, params)
}

struct Octave {
    amplitude: f64,
    frequency: f64,
    offset: (f64, f64),
    period: (usize, usize),
}

fn validate_params(width: usize, height: usize, params: &FractalParams) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(invalid_parameter(
            "size",
            &format!("{width}x{height}"),
            &"noise field dimensions must be positive",
        ));
    }
    if !(params.scale.is_finite() && params.scale > 0.0) {
        return Err(invalid_parameter(
            "noise_scale",
            &params.scale,
            &"scale must be a positive finite number",
        ));
    }
    if params.octaves == 0 {
        return Err(invalid_parameter(
            "octaves",
            &params.octaves,
            &"at least one octave is required",
        ));
    }
    for (name, value) in [
        ("persistence", params.persistence),
        ("lacunarity", params.lacunarity),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(invalid_parameter(
                name,
                &value,
                &"must be a positive finite number",
            ));
        }
    }
    let peak = params.peak_frequency();
    if !(peak.is_finite() && peak <= MAX_OCTAVE_FREQUENCY) {
        return Err(invalid_parameter(
            "lacunarity",
            &peak,
            &format!("octave frequency must stay within {MAX_OCTAVE_FREQUENCY} cells per pixel"),
        ));
    }
    if !params.amplitude_total().is_finite() {
        return Err(invalid_parameter(
            "persistence",
            &params.persistence,
            &"octave amplitudes overflow",
        ));
    }
    Ok(())
}

fn lattice_period(extent: usize, frequency: f64) -> usize {
    ((extent as f64 * frequency).round() as usize).max(1)
}

fn wrap(value: i64, period: usize) -> usize {
    let period = i64::try_from(period).unwrap_or(i64::MAX).max(1);
    value.rem_euclid(period) as usize
}

fn fade(t: f64) -> f64 {
    t * t * t * t.mul_add(t.mul_add(6.0, -15.0), 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    (b - a).mul_add(t, a)
}

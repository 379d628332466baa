//! Procedural noise tiles
//!
//! A fractal noise field is mapped through a colour ramp. Periodic noise kinds tile
//! exactly; simplex fields go through the seamless blend afterwards.

use ndarray::Array2;

use crate::algorithm::seamless::make_seamless;
use crate::io::error::{Result, invalid_parameter};
use crate::math::color::{Rgb, lerp_rgb, opaque};
use crate::math::noise::{FractalParams, NoiseField, NoiseKind};
use crate::spatial::buffer::PixelBuffer;
use crate::spatial::tiles::TileSet;

/// Default colour ramp from deep water to dark foliage
pub const DEFAULT_RAMP: [Rgb; 5] = [
    [64, 128, 255],
    [128, 200, 255],
    [255, 255, 200],
    [200, 255, 128],
    [128, 200, 64],
];

/// Inputs for a procedural tile set
#[derive(Debug, Clone, PartialEq)]
pub struct ProceduralParams {
    /// Base noise function
    pub kind: NoiseKind,
    /// Octave parameters of the first layer
    pub fractal: FractalParams,
    /// Edge length of each tile
    pub tile_size: usize,
    /// Generation seed
    pub seed: i64,
    /// Number of parallax layers, one tile each
    pub layers: usize,
    /// Seam blend taper for non-periodic noise
    pub continuity: f64,
}

/// Map every value in `[0, 1]` onto a piecewise-linear colour ramp
pub fn colorize(field: &Array2<f64>, ramp: &[Rgb]) -> PixelBuffer {
    let (height, width) = field.dim();
    let mut image = PixelBuffer::new(width, height);
    let last = ramp.len().saturating_sub(1);
    for ((y, x), &value) in field.indexed_iter() {
        let position = value.clamp(0.0, 1.0) * last as f64;
        let lower = (position.floor() as usize).min(last);
        let upper = (lower + 1).min(last);
        let (Some(&from), Some(&to)) = (ramp.get(lower), ramp.get(upper)) else {
            continue;
        };
        image.set_pixel(x, y, opaque(lerp_rgb(from, to, position - lower as f64)));
    }
    image
}

/// Generate one tile per parallax layer
///
/// Layer `k` uses seed `seed + k` and a scale multiplied by `lacunarity^k`, so deeper
/// layers carry finer detail.
///
/// # Errors
///
/// Returns `InvalidParameter` for a zero tile size or layer count and propagates noise
/// parameter errors.
pub fn generate_procedural(params: &ProceduralParams) -> Result<TileSet> {
    if params.tile_size == 0 {
        return Err(invalid_parameter("tile_size", &params.tile_size, &"must be positive"));
    }
    if params.layers == 0 {
        return Err(invalid_parameter("parallax_layers", &params.layers, &"at least one layer is required"));
    }

    let mut tile_set = TileSet::new(params.tile_size);
    let mut fractal = params.fractal;
    for layer in 0..params.layers {
        let field = NoiseField::new(params.kind, params.seed.wrapping_add(layer as i64)).sample(
            params.tile_size,
            params.tile_size,
            &fractal,
        )?;
        let mut tile = colorize(&field, &DEFAULT_RAMP);
        if !params.kind.is_periodic() {
            tile = make_seamless(&tile, params.continuity)?;
        }
        tile_set.push(tile);
        fractal.scale *= fractal.lacunarity;
    }
    Ok(tile_set)
}

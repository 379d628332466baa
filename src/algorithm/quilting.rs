//! Texture synthesis by toroidal patch quilting
//!
//! Square patches cut from the sample are laid on a grid that wraps around the output,
//! so the last patch of each row and column overlaps the first. Every placement picks,
//! from a handful of seeded candidate positions, the patch that best matches the pixels
//! already written in its overlap, then feathers it in.

use tracing::debug;

use crate::io::error::{Result, invalid_parameter};
use crate::math::color::{lerp_rgb, opaque, rgb_of};
use crate::math::random::{SeededRng, stream};
use crate::spatial::buffer::PixelBuffer;

/// Tunables for patch quilting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuiltingParams {
    /// Edge length of the output tile
    pub tile_size: usize,
    /// Edge length of each patch, clamped to the sample
    pub patch_size: usize,
    /// Width of the overlap between neighbouring patches
    pub overlap: usize,
    /// Random candidate positions scored per placement
    pub candidates: usize,
}

impl QuiltingParams {
    /// Patch size scaled to the tile with a sixth of it overlapping
    pub fn for_tile(tile_size: usize) -> Self {
        let patch_size = (tile_size / 8).max(8);
        Self {
            tile_size,
            patch_size,
            overlap: (patch_size / 6).max(1),
            candidates: 16,
        }
    }
}

/// Synthesize a seamless `tile_size` square from `sample`
///
/// # Errors
///
/// Returns `InvalidParameter` for an empty sample or zero tile size.
pub fn synthesize_texture(sample: &PixelBuffer, params: &QuiltingParams, seed: i64) -> Result<PixelBuffer> {
    let size = params.tile_size;
    if size == 0 {
        return Err(invalid_parameter("tile_size", &size, &"must be positive"));
    }
    if sample.is_empty() {
        return Err(invalid_parameter("sample", &"empty", &"texture sample has no pixels"));
    }

    let patch = params
        .patch_size
        .min(sample.width())
        .min(sample.height())
        .min(size)
        .max(1);
    let overlap = params.overlap.min(patch.saturating_sub(1));
    let step = patch - overlap;
    let per_axis = size.div_ceil(step);

    let mut rng = SeededRng::derived(seed, stream::QUILTING);
    let mut output = PixelBuffer::new(size, size);
    let mut written = vec![false; size * size];

    for row in 0..per_axis {
        for col in 0..per_axis {
            let origin = (col * step, row * step);
            let mut best = (0, 0);
            let mut best_cost = f64::MAX;
            for _ in 0..params.candidates.max(1) {
                let source = (
                    rng.index(sample.width() - patch + 1),
                    rng.index(sample.height() - patch + 1),
                );
                let cost = overlap_cost(sample, &output, &written, source, origin, patch);
                if cost < best_cost {
                    best_cost = cost;
                    best = source;
                }
            }
            place_patch(sample, &mut output, &mut written, best, origin, patch, overlap);
        }
    }

    debug!(size, patch, overlap, patches = per_axis * per_axis, "Quilted texture");
    Ok(output)
}

fn wrapped_index(origin: (usize, usize), dx: usize, dy: usize, size: usize) -> (usize, usize) {
    ((origin.0 + dx) % size, (origin.1 + dy) % size)
}

fn overlap_cost(
    sample: &PixelBuffer,
    output: &PixelBuffer,
    written: &[bool],
    source: (usize, usize),
    origin: (usize, usize),
    patch: usize,
) -> f64 {
    let size = output.width();
    let mut cost = 0.0;
    let mut count = 0usize;
    for dy in 0..patch {
        for dx in 0..patch {
            let (x, y) = wrapped_index(origin, dx, dy, size);
            if !written.get(y * size + x).copied().unwrap_or(false) {
                continue;
            }
            let (Some(existing), Some(candidate)) =
                (output.pixel(x, y), sample.pixel(source.0 + dx, source.1 + dy))
            else {
                continue;
            };
            cost += existing
                .iter()
                .zip(candidate)
                .take(3)
                .map(|(&a, b)| (f64::from(a) - f64::from(b)).powi(2))
                .sum::<f64>();
            count += 1;
        }
    }
    if count == 0 { 0.0 } else { cost / count as f64 }
}

fn place_patch(
    sample: &PixelBuffer,
    output: &mut PixelBuffer,
    written: &mut [bool],
    source: (usize, usize),
    origin: (usize, usize),
    patch: usize,
    overlap: usize,
) {
    let size = output.width();
    for dy in 0..patch {
        for dx in 0..patch {
            let (x, y) = wrapped_index(origin, dx, dy, size);
            let Some(incoming) = sample.pixel(source.0 + dx, source.1 + dy) else {
                continue;
            };
            let Some(flag) = written.get_mut(y * size + x) else {
                continue;
            };
            let color = match output.pixel(x, y) {
                Some(existing) if *flag => {
                    // Feather towards the existing pixels at the patch border
                    let border = dx.min(dy).min(patch - 1 - dx).min(patch - 1 - dy);
                    let alpha = ((border + 1) as f64 / (overlap + 1) as f64).min(1.0);
                    opaque(lerp_rgb(rgb_of(existing), rgb_of(incoming), alpha))
                }
                _ => opaque(rgb_of(incoming)),
            };
            output.set_pixel(x, y, color);
            *flag = true;
        }
    }
}

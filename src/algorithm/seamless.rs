//! Seamless conversion of arbitrary images
//!
//! The source is blended with a copy of itself rotated by half its size. A Tukey window
//! weights the original towards the centre and the rotated copy towards the borders.
//! The rotated copy is continuous across the wrap, so the result tiles. `continuity`
//! sets the taper fraction of the window: 1 gives a full Hann window, smaller values
//! keep more of the untouched original in the middle.

use crate::io::error::{Result, invalid_parameter};
use crate::math::color::{lerp_rgb, opaque, rgb_of};
use crate::spatial::buffer::PixelBuffer;

/// Tukey window sampled at pixel centres of an `n`-pixel axis
///
/// `taper` in `[0, 1]` is the fraction of the axis spent ramping; 1 is a Hann window.
/// A zero taper still zeroes the outermost pixels so the blend keeps a seam fix.
pub fn tukey_window(n: usize, taper: f64) -> Vec<f64> {
    let taper = taper.clamp(0.0, 1.0);
    (0..n)
        .map(|i| {
            let t = (i as f64 + 0.5) / n as f64;
            if taper <= f64::EPSILON {
                return if i == 0 || i + 1 == n { 0.0 } else { 1.0 };
            }
            let half = taper / 2.0;
            let edge = t.min(1.0 - t);
            if edge >= half {
                1.0
            } else {
                let phase = std::f64::consts::PI * edge / half;
                0.5 * (1.0 - phase.cos())
            }
        })
        .collect()
}

/// Hann window sampled at pixel centres
pub fn hann_window(n: usize) -> Vec<f64> {
    tukey_window(n, 1.0)
}

/// Blend `image` with its half-offset copy so opposite borders match
///
/// # Errors
///
/// Returns `InvalidParameter` when the image is empty.
pub fn make_seamless(image: &PixelBuffer, continuity: f64) -> Result<PixelBuffer> {
    if image.is_empty() {
        return Err(invalid_parameter("image", &"empty", &"cannot make an empty image seamless"));
    }
    let width = image.width();
    let height = image.height();
    let shifted = image.offset_wrapped((width / 2) as i64, (height / 2) as i64);
    let window_x = tukey_window(width, continuity);
    let window_y = tukey_window(height, continuity);

    let mut output = PixelBuffer::new(width, height);
    for (x, y, original) in image.pixels() {
        let weight = window_x.get(x).copied().unwrap_or(0.0) * window_y.get(y).copied().unwrap_or(0.0);
        let offset = shifted.pixel(x, y).unwrap_or(original);
        // Rotated copy dominates at the borders
        let blended = lerp_rgb(rgb_of(offset), rgb_of(original), weight);
        output.set_pixel(x, y, opaque(blended));
    }
    Ok(output)
}

/// Reflect the outer `border` pixels so each edge mirrors its inner neighbourhood
pub fn mirror_edges(image: &PixelBuffer, border: usize) -> PixelBuffer {
    let mut output = image.clone();
    let width = image.width();
    let height = image.height();
    let border = border.min(width / 2).min(height / 2);
    for y in 0..height {
        for x in 0..width {
            let mx = if x < border {
                2 * border - 1 - x
            } else if x + border >= width {
                (2 * (width - border)).saturating_sub(x + 1)
            } else {
                x
            };
            let my = if y < border {
                2 * border - 1 - y
            } else if y + border >= height {
                (2 * (height - border)).saturating_sub(y + 1)
            } else {
                y
            };
            if (mx, my) != (x, y) {
                if let Some(pixel) = image.pixel(mx, my) {
                    output.set_pixel(x, y, pixel);
                }
            }
        }
    }
    output
}

/// Resize `image` to a `tile_size` square and make it seamless
///
/// # Errors
///
/// Returns `InvalidParameter` for an empty image or zero tile size.
pub fn seamless_tile(image: &PixelBuffer, tile_size: usize, continuity: f64) -> Result<PixelBuffer> {
    if tile_size == 0 {
        return Err(invalid_parameter("tile_size", &tile_size, &"must be positive"));
    }
    if image.is_empty() {
        return Err(invalid_parameter("image", &"empty", &"source image has no pixels"));
    }
    let resized = if image.width() >= tile_size && image.height() >= tile_size {
        image.downsample_box(tile_size, tile_size)
    } else {
        image.resize_nearest(tile_size, tile_size)
    };
    make_seamless(&resized, continuity)
}

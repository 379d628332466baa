//! Image geometrization into flat colour polygons
//!
//! The source is resampled, reduced to a small palette and split into colour regions.
//! Region boundaries are simplified and scanline-filled back into a square tile in
//! palette order, later regions painting over earlier ones.
//!
//! With tiling optimization on, a region with any point within the margin of an edge
//! also gets a copy mirrored across the tile centre (`x -> resolution - x`, and likewise
//! for y). Each point near an edge therefore has a counterpart at the same distance from
//! the opposite edge and at the same transverse coordinate. Mirrored copies paint only
//! inside the margin bands, so the two facing boundaries of the tile carry matching
//! content.

use tracing::debug;

use crate::analysis::contours::{BoundaryTracer, ContourTracer, Region};
use crate::analysis::palette::{PaletteExtractor, merge_similar};
use crate::analysis::simplify::simplify_closed;
use crate::io::configuration::TILING_MARGIN_FRACTION;
use crate::io::error::{Result, generation_failure, invalid_parameter};
use crate::math::color::{Rgb, opaque};
use crate::spatial::buffer::{PixelBuffer, Point};
use crate::spatial::tiles::TileSet;

/// Parameters for one geometrization run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometrizeParams {
    /// Palette size cap
    pub max_colors: usize,
    /// Fraction of the maximum RGB distance within which colours merge
    pub color_tolerance: f64,
    /// Douglas-Peucker tolerance in pixels
    pub simplification_tolerance: f64,
    /// Mirror near-edge regions into the opposite margin band
    pub optimize_for_tiling: bool,
    /// Edge length of the output tile
    pub resolution: usize,
}

impl Default for GeometrizeParams {
    fn default() -> Self {
        Self {
            max_colors: 16,
            color_tolerance: 0.15,
            simplification_tolerance: 1.0,
            optimize_for_tiling: true,
            resolution: 512,
        }
    }
}

/// Axis a region copy is mirrored across
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirror {
    /// `x -> resolution - x`
    Horizontal,
    /// `y -> resolution - y`
    Vertical,
    /// Both axes, for regions near a corner
    Both,
}

impl Mirror {
    fn apply(self, point: Point, resolution: f64) -> Point {
        match self {
            Self::Horizontal => Point::new(resolution - point.x, point.y),
            Self::Vertical => Point::new(point.x, resolution - point.y),
            Self::Both => Point::new(resolution - point.x, resolution - point.y),
        }
    }
}

/// Mirrored copies required by the wrap rule for one region's loops
pub fn mirrored_counterparts(loops: &[Vec<Point>], resolution: usize) -> Vec<(Mirror, Vec<Vec<Point>>)> {
    let size = resolution as f64;
    let margin = size * TILING_MARGIN_FRACTION;
    let points = || loops.iter().flatten();
    let near_x = points().any(|p| p.x < margin || p.x > size - margin);
    let near_y = points().any(|p| p.y < margin || p.y > size - margin);

    let mut mirrors = Vec::new();
    if near_x {
        mirrors.push(Mirror::Horizontal);
    }
    if near_y {
        mirrors.push(Mirror::Vertical);
    }
    if near_x && near_y {
        mirrors.push(Mirror::Both);
    }

    mirrors
        .into_iter()
        .map(|mirror| {
            let copies = loops
                .iter()
                .map(|ring| ring.iter().map(|&p| mirror.apply(p, size)).collect())
                .collect();
            (mirror, copies)
        })
        .collect()
}

/// Geometrizer generic over its contour tracing collaborator
#[derive(Debug, Clone, Default)]
pub struct Geometrizer<T = BoundaryTracer> {
    tracer: T,
    extractor: PaletteExtractor,
}

impl Geometrizer<BoundaryTracer> {
    /// Geometrizer with the default crack-edge tracer and even-stride palette
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: ContourTracer> Geometrizer<T> {
    /// Geometrizer with a custom tracer and palette extractor
    pub const fn with_tracer(tracer: T, extractor: PaletteExtractor) -> Self {
        Self { tracer, extractor }
    }

    /// Turn `image` into a single flat-colour tile of `params.resolution` pixels
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an empty image or zero resolution or palette size,
    /// and `GenerationFailure` when the palette or the region list comes out empty.
    pub fn geometrize(&self, image: &PixelBuffer, params: &GeometrizeParams) -> Result<TileSet> {
        let resolution = params.resolution;
        if image.is_empty() {
            return Err(invalid_parameter("image", &"empty", &"source image has no pixels"));
        }
        if resolution == 0 {
            return Err(invalid_parameter("resolution", &resolution, &"must be positive"));
        }
        if params.max_colors == 0 {
            return Err(invalid_parameter("max_colors", &0, &"must be positive"));
        }

        let resampled = image.resize_nearest(resolution, resolution);
        let colors = self.extractor.extract(&resampled);
        let merged = merge_similar(&colors, params.color_tolerance);
        let palette = self.extractor.reduce(&merged, params.max_colors);
        if palette.is_empty() {
            return Err(generation_failure("palette", &"no colours extracted from source"));
        }

        let (labels, _) = self.extractor.quantize(&resampled, &palette);
        let regions = self.tracer.trace(&labels);
        if regions.is_empty() {
            return Err(generation_failure("contours", &"no regions traced"));
        }

        let mut counts = vec![0usize; palette.len()];
        for &label in &labels {
            if let Some(count) = counts.get_mut(label) {
                *count += 1;
            }
        }
        let background = most_frequent(&palette, &counts);

        let mut canvas = PixelBuffer::filled(resolution, resolution, opaque(background));
        let mut polygon_count = 0usize;
        for region in &regions {
            let Some(&color) = palette.get(region.label) else {
                continue;
            };
            let loops = simplified_loops(region, params.simplification_tolerance);
            polygon_count += loops.len();
            fill_even_odd(&mut canvas, &loops, color, |_, _| true);

            if params.optimize_for_tiling {
                let margin = ((resolution as f64) * TILING_MARGIN_FRACTION).ceil() as usize;
                for (mirror, copies) in mirrored_counterparts(&loops, resolution) {
                    fill_even_odd(&mut canvas, &copies, color, |x, y| {
                        in_band(mirror, x, y, margin, resolution)
                    });
                }
            }
        }

        debug!(
            colors = palette.len(),
            regions = regions.len(),
            polygons = polygon_count,
            "Geometrized source image"
        );
        Ok(TileSet::from_tiles(resolution, vec![canvas]))
    }
}

fn most_frequent(palette: &[Rgb], counts: &[usize]) -> Rgb {
    let mut best = 0;
    for (index, &count) in counts.iter().enumerate() {
        if count > counts.get(best).copied().unwrap_or(0) {
            best = index;
        }
    }
    palette.get(best).copied().unwrap_or_default()
}

fn simplified_loops(region: &Region, tolerance: f64) -> Vec<Vec<Point>> {
    region
        .loops
        .iter()
        .map(|ring| simplify_closed(ring, tolerance))
        .filter(|ring| ring.len() >= 3)
        .collect()
}

const fn in_band(mirror: Mirror, x: usize, y: usize, margin: usize, resolution: usize) -> bool {
    let band_x = x < margin || x + margin >= resolution;
    let band_y = y < margin || y + margin >= resolution;
    match mirror {
        Mirror::Horizontal => band_x,
        Mirror::Vertical => band_y,
        Mirror::Both => band_x && band_y,
    }
}

/// Even-odd scanline fill sampling pixel centres
fn fill_even_odd<F>(canvas: &mut PixelBuffer, loops: &[Vec<Point>], color: Rgb, mask: F)
where
    F: Fn(usize, usize) -> bool,
{
    let width = canvas.width();
    let rgba = opaque(color);
    let mut crossings: Vec<f64> = Vec::new();

    for y in 0..canvas.height() {
        let scan = y as f64 + 0.5;
        crossings.clear();
        for ring in loops {
            let len = ring.len();
            for (i, a) in ring.iter().enumerate() {
                let Some(b) = ring.get((i + 1) % len) else {
                    continue;
                };
                if (a.y <= scan) != (b.y <= scan) {
                    crossings.push((scan - a.y).mul_add((b.x - a.x) / (b.y - a.y), a.x));
                }
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let &[start, end] = span else {
                continue;
            };
            let first = (start - 0.5).ceil().max(0.0) as usize;
            let last = ((end - 0.5).ceil().max(0.0) as usize).min(width);
            for x in first..last {
                if mask(x, y) {
                    canvas.set_pixel(x, y, rgba);
                }
            }
        }
    }
}

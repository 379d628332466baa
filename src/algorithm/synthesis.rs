//! Wang tile synthesis
//!
//! Each tile gets a seeded base colour and four edge classes. Edge colours come from a
//! per-class colour table, so two edges sharing a class have identical boundary pixels
//! and any two tiles whose facing classes agree can sit side by side without a seam.

use tracing::debug;

use crate::analysis::quality::edge_distance;
use crate::io::configuration::{
    EDGE_BAND_FRACTION, EDGE_CLASS_COUNT, EDGE_COMPATIBILITY_TOLERANCE, EDGE_SAMPLE_COUNT,
};
use crate::math::color::{Rgb, lerp_rgb, midpoint_rgb, opaque};
use crate::math::random::{SeededRng, stream};
use crate::spatial::buffer::PixelBuffer;
use crate::spatial::tiles::{Edge, EdgePattern, Tile, TileSet};

/// Edge classes of tile `index`: `[i, i + 1, i + 2, i + 3]` modulo the class count
pub const fn edge_pattern_for(index: usize) -> EdgePattern {
    EdgePattern([
        index % EDGE_CLASS_COUNT,
        (index + 1) % EDGE_CLASS_COUNT,
        (index + 2) % EDGE_CLASS_COUNT,
        (index + 3) % EDGE_CLASS_COUNT,
    ])
}

/// Width of the blend band for a tile edge, at least one pixel
pub fn edge_band(tile_size: usize) -> usize {
    ((tile_size as f64 * EDGE_BAND_FRACTION).round() as usize).max(1)
}

/// Sample boundary pixels of `a` on `edge` and of `b` on the opposite edge and compare
///
/// Compatible when the mean RGB distance over the sampled pixels is below `tolerance`.
pub fn check_edge_compatibility(a: &Tile, b: &Tile, edge: Edge, tolerance: f64) -> bool {
    edge_distance(a, b, edge, EDGE_SAMPLE_COUNT).is_some_and(|distance| distance < tolerance)
}

/// Seeded generator of edge-compatible tile sets
#[derive(Debug, Clone, Copy)]
pub struct WangTileSynthesizer {
    variety: f64,
    tolerance: f64,
}

impl Default for WangTileSynthesizer {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl WangTileSynthesizer {
    /// Create a synthesizer whose base colours spread by `variety` in `[0, 1]`
    pub const fn new(variety: f64) -> Self {
        Self {
            variety: variety.clamp(0.0, 1.0),
            tolerance: EDGE_COMPATIBILITY_TOLERANCE,
        }
    }

    /// Override the edge compatibility tolerance
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Edge compatibility tolerance in RGB distance units
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Build `count` tiles of `tile_size` pixels
    ///
    /// Returns an empty set when `count` or `tile_size` is zero.
    pub fn synthesize(&self, count: usize, tile_size: usize, seed: i64) -> TileSet {
        if count == 0 || tile_size == 0 {
            return TileSet::empty();
        }

        let mut rng = SeededRng::derived(seed, stream::WANG_COLORS);
        let class_colors: Vec<Rgb> = (0..EDGE_CLASS_COUNT)
            .map(|_| [rng.byte(), rng.byte(), rng.byte()])
            .collect();
        let anchor = mean_color(&class_colors);
        let band = edge_band(tile_size);

        let mut tile_set = TileSet::new(tile_size);
        for index in 0..count {
            let random: Rgb = [rng.byte(), rng.byte(), rng.byte()];
            let base = lerp_rgb(anchor, random, self.variety);
            let pattern = edge_pattern_for(index);
            let edges = pattern
                .classes()
                .map(|class| class_colors.get(class).copied().unwrap_or(anchor));
            tile_set.push_wang(rasterize(tile_size, band, base, edges), pattern);
        }

        debug!(count, tile_size, band, "Synthesized Wang tiles");
        tile_set
    }

    /// Check one edge pair with this synthesizer's tolerance
    pub fn check_edge_compatibility(&self, a: &Tile, b: &Tile, edge: Edge) -> bool {
        check_edge_compatibility(a, b, edge, self.tolerance)
    }
}

fn mean_color(colors: &[Rgb]) -> Rgb {
    let count = colors.len().max(1) as u32;
    let mut sums = [0u32; 3];
    for color in colors {
        for (sum, &channel) in sums.iter_mut().zip(color) {
            *sum += u32::from(channel);
        }
    }
    sums.map(|sum| (sum / count) as u8)
}

fn rasterize(tile_size: usize, band: usize, base: Rgb, edges: [Rgb; 4]) -> Tile {
    let mut tile = PixelBuffer::new(tile_size, tile_size);
    let last = tile_size - 1;
    for y in 0..tile_size {
        for x in 0..tile_size {
            // Distance to each boundary in pattern order: top, right, bottom, left
            let distances = [y, last - x, last - y, x];
            tile.set_pixel(x, y, opaque(blend_pixel(distances, band, base, edges)));
        }
    }
    tile
}

fn blend_pixel(distances: [usize; 4], band: usize, base: Rgb, edges: [Rgb; 4]) -> Rgb {
    let on_boundary: Vec<Rgb> = distances
        .iter()
        .zip(edges)
        .filter_map(|(&distance, color)| (distance == 0).then_some(color))
        .collect();
    match on_boundary.as_slice() {
        [single] => return *single,
        [first, second, ..] => return midpoint_rgb(*first, *second),
        [] => {}
    }

    let mut weight_total = 0.0;
    let mut strength: f64 = 0.0;
    let mut channels = [0.0f64; 3];
    for (&distance, color) in distances.iter().zip(edges) {
        if distance >= band {
            continue;
        }
        let weight = 1.0 - distance as f64 / band as f64;
        weight_total += weight;
        strength = strength.max(weight);
        for (sum, channel) in channels.iter_mut().zip(color) {
            *sum += weight * f64::from(channel);
        }
    }
    if weight_total <= 0.0 {
        return base;
    }
    let edge_mix = channels.map(|sum| (sum / weight_total).round().clamp(0.0, 255.0) as u8);
    lerp_rgb(base, edge_mix, strength)
}

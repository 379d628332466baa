//! Seam quality metrics and Wang border validation
//!
//! Single tiles are scored on their own wrap seams (right column against left column,
//! bottom row against top row). Wang sets are scored on every edge pair that the edge
//! classes declare compatible, since those are the seams a layout will produce.

use crate::math::color::{MAX_RGB_DISTANCE, delta_e, rgb_distance, rgb_of};
use crate::spatial::buffer::Rgba;
use crate::spatial::tiles::{Edge, Tile, TileQuality, TileSet, boundary_pixels};

/// Result of checking a Wang set's edge compatibility
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WangValidation {
    /// Consistency reached the configured threshold
    pub has_valid_borders: bool,
    /// At least one compatible pair differs visibly
    pub has_visual_cuts: bool,
    /// Fraction of compatible edge pairs that passed, in `[0, 1]`
    pub border_consistency: f64,
    /// Human-readable reasons for failed checks
    pub error_details: Vec<String>,
}

/// Evenly spaced indices into a boundary of `len` pixels
fn sample_positions(len: usize, count: usize) -> Vec<usize> {
    if len == 0 || count == 0 {
        return Vec::new();
    }
    if len <= count {
        return (0..len).collect();
    }
    if count == 1 {
        return vec![len / 2];
    }
    (0..count).map(|i| i * (len - 1) / (count - 1)).collect()
}

/// Mean RGB distance between `a` along `edge` and `b` along the opposite edge
///
/// Compares up to `samples` corresponding boundary pixels. Returns `None` when either
/// boundary is empty or the two differ in length.
pub fn edge_distance(a: &Tile, b: &Tile, edge: Edge, samples: usize) -> Option<f64> {
    let first = boundary_pixels(a, edge);
    let second = boundary_pixels(b, edge.opposite());
    if first.is_empty() || first.len() != second.len() {
        return None;
    }
    let positions = sample_positions(first.len(), samples);
    let total: f64 = positions
        .iter()
        .filter_map(|&i| Some(rgb_distance(rgb_of(*first.get(i)?), rgb_of(*second.get(i)?))))
        .sum();
    Some(total / positions.len().max(1) as f64)
}

fn pairwise<F>(first: &[Rgba], second: &[Rgba], metric: F) -> (f64, usize)
where
    F: Fn(Rgba, Rgba) -> f64,
{
    first
        .iter()
        .zip(second)
        .fold((0.0, 0), |(sum, n), (&a, &b)| (sum + metric(a, b), n + 1))
}

/// Wrap-seam quality of one tile
pub fn tile_quality(tile: &Tile) -> TileQuality {
    let seams = [
        (boundary_pixels(tile, Edge::Right), boundary_pixels(tile, Edge::Left)),
        (boundary_pixels(tile, Edge::Bottom), boundary_pixels(tile, Edge::Top)),
    ];
    score_seams(&seams)
}

fn score_seams(seams: &[(Vec<Rgba>, Vec<Rgba>)]) -> TileQuality {
    let mut delta_sum = 0.0;
    let mut distance_sum = 0.0;
    let mut count = 0;
    for (first, second) in seams {
        let (delta, n) = pairwise(first, second, |a, b| delta_e(rgb_of(a), rgb_of(b)));
        let (distance, _) = pairwise(first, second, |a, b| rgb_distance(rgb_of(a), rgb_of(b)));
        delta_sum += delta;
        distance_sum += distance;
        count += n;
    }
    if count == 0 {
        return TileQuality::default();
    }
    let mean_distance = distance_sum / count as f64;
    TileQuality {
        delta_e: delta_sum / count as f64,
        seamlessness: (1.0 - mean_distance / MAX_RGB_DISTANCE).clamp(0.0, 1.0),
    }
}

/// Quality of a whole set
///
/// Wang sets are scored across every compatible edge pair; other sets average the wrap
/// seams of their tiles. An empty set scores zero.
pub fn set_quality(tile_set: &TileSet) -> TileQuality {
    if tile_set.is_empty() {
        return TileQuality::default();
    }
    if !tile_set.is_wang() {
        let count = tile_set.len() as f64;
        let (delta, seam) = tile_set.tiles().iter().map(tile_quality).fold(
            (0.0, 0.0),
            |(delta, seam), quality| (delta + quality.delta_e, seam + quality.seamlessness),
        );
        return TileQuality {
            delta_e: delta / count,
            seamlessness: seam / count,
        };
    }

    let mut seams = Vec::new();
    for_each_compatible_pair(tile_set, |a, b, edge| {
        seams.push((boundary_pixels(a, edge), boundary_pixels(b, edge.opposite())));
    });
    score_seams(&seams)
}

fn for_each_compatible_pair<F>(tile_set: &TileSet, mut visit: F)
where
    F: FnMut(&Tile, &Tile, Edge),
{
    for (i, (a, pattern_a)) in tile_set.tiles().iter().zip(tile_set.edge_patterns()).enumerate() {
        for (b, pattern_b) in tile_set
            .tiles()
            .iter()
            .zip(tile_set.edge_patterns())
            .skip(i)
        {
            for edge in [Edge::Right, Edge::Bottom] {
                if pattern_a.class(edge) == pattern_b.class(edge.opposite()) {
                    visit(a, b, edge);
                }
                if pattern_b.class(edge) == pattern_a.class(edge.opposite()) {
                    visit(b, a, edge);
                }
            }
        }
    }
}

/// Check that every pair of edges sharing a class is visually compatible
///
/// A pair passes when the mean RGB distance over `samples` boundary pixels stays below
/// `tolerance`; the set has valid borders when the passing fraction reaches `threshold`.
pub fn validate_wang_borders(
    tile_set: &TileSet,
    tolerance: f64,
    threshold: f64,
    samples: usize,
) -> WangValidation {
    let mut validation = WangValidation::default();
    if tile_set.is_empty() {
        validation.error_details.push("tile set is empty".to_string());
        return validation;
    }
    if !tile_set.is_wang() {
        validation
            .error_details
            .push("tile set carries no edge patterns".to_string());
        return validation;
    }

    let mut checked = 0usize;
    let mut passed = 0usize;
    let mut failures = Vec::new();
    for_each_compatible_pair(tile_set, |a, b, edge| {
        checked += 1;
        match edge_distance(a, b, edge, samples) {
            Some(distance) if distance < tolerance => passed += 1,
            Some(distance) => failures.push(format!(
                "{edge:?} edge differs by {distance:.1} (tolerance {tolerance:.1})"
            )),
            None => failures.push(format!("{edge:?} edge has mismatched boundary lengths")),
        }
    });

    if checked == 0 {
        validation
            .error_details
            .push("no edge pairs share a class".to_string());
        return validation;
    }

    validation.border_consistency = (passed as f64 / checked as f64).clamp(0.0, 1.0);
    validation.has_valid_borders = validation.border_consistency >= threshold;
    validation.has_visual_cuts = passed < checked;
    validation.error_details = failures;
    validation
}

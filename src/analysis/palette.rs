//! Dominant colour extraction, palette reduction and quantization
//!
//! Colours are ordered by descending frequency with ties broken by colour value, so
//! every step here is deterministic for a fixed input image.

use std::collections::HashMap;

use ndarray::Array2;

use crate::math::color::{MAX_RGB_DISTANCE, Rgb, opaque, rgb_distance, rgb_of};
use crate::spatial::buffer::PixelBuffer;

/// How `reduce` picks at most `max_colors` entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReductionPolicy {
    /// Sample the frequency-ordered list at an even stride
    #[default]
    EvenStride,
    /// Lloyd refinement seeded from the even-stride picks
    KMeans {
        /// Refinement passes
        iterations: usize,
    },
}

/// Palette builder parameterised by its reduction policy
#[derive(Debug, Clone, Copy, Default)]
pub struct PaletteExtractor {
    policy: ReductionPolicy,
}

impl PaletteExtractor {
    /// Create an extractor with the given reduction policy
    pub const fn new(policy: ReductionPolicy) -> Self {
        Self { policy }
    }

    /// Reduction policy in use
    pub const fn policy(&self) -> ReductionPolicy {
        self.policy
    }

    /// Distinct colours of `image`, most frequent first
    pub fn extract(&self, image: &PixelBuffer) -> Vec<Rgb> {
        color_frequencies(image)
            .into_iter()
            .map(|(color, _)| color)
            .collect()
    }

    /// Select at most `max_colors` representatives from `colors`
    pub fn reduce(&self, colors: &[Rgb], max_colors: usize) -> Vec<Rgb> {
        let picks = even_stride(colors, max_colors);
        match self.policy {
            ReductionPolicy::EvenStride => picks,
            ReductionPolicy::KMeans { iterations } => {
                if colors.len() <= max_colors {
                    return picks;
                }
                refine_centroids(colors, picks, iterations)
            }
        }
    }

    /// Map every pixel to its nearest palette entry
    ///
    /// Returns the per-pixel palette index (rows = height) and the recoloured image.
    /// With an empty palette every label is 0 and the image is returned unchanged.
    pub fn quantize(&self, image: &PixelBuffer, palette: &[Rgb]) -> (Array2<usize>, PixelBuffer) {
        let mut labels = Array2::zeros((image.height(), image.width()));
        if palette.is_empty() {
            return (labels, image.clone());
        }

        let mut output = PixelBuffer::new(image.width(), image.height());
        let mut lookup: HashMap<Rgb, usize> = HashMap::new();
        for (x, y, pixel) in image.pixels() {
            let color = rgb_of(pixel);
            let index = *lookup
                .entry(color)
                .or_insert_with(|| nearest_index(palette, color));
            if let Some(label) = labels.get_mut((y, x)) {
                *label = index;
            }
            if let Some(&entry) = palette.get(index) {
                output.set_pixel(x, y, opaque(entry));
            }
        }
        (labels, output)
    }
}

/// Distinct colours with their pixel counts, most frequent first, ties by colour value
pub fn color_frequencies(image: &PixelBuffer) -> Vec<(Rgb, usize)> {
    let mut counts: HashMap<Rgb, usize> = HashMap::new();
    for (_, _, pixel) in image.pixels() {
        *counts.entry(rgb_of(pixel)).or_insert(0) += 1;
    }
    let mut ordered: Vec<(Rgb, usize)> = counts.into_iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ordered
}

/// Collapse colours lying within `tolerance * MAX_RGB_DISTANCE` of an earlier kept colour
pub fn merge_similar(colors: &[Rgb], tolerance: f64) -> Vec<Rgb> {
    let threshold = tolerance.max(0.0) * MAX_RGB_DISTANCE;
    let mut kept: Vec<Rgb> = Vec::with_capacity(colors.len());
    for &color in colors {
        if kept.iter().all(|&existing| rgb_distance(existing, color) > threshold) {
            kept.push(color);
        }
    }
    kept
}

/// Index of the palette entry closest to `color`; the first wins ties
pub fn nearest_index(palette: &[Rgb], color: Rgb) -> usize {
    let mut best = 0;
    let mut best_distance = f64::MAX;
    for (index, &entry) in palette.iter().enumerate() {
        let distance = rgb_distance(entry, color);
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    best
}

fn even_stride(colors: &[Rgb], max_colors: usize) -> Vec<Rgb> {
    if colors.len() <= max_colors {
        return colors.to_vec();
    }
    (0..max_colors)
        .filter_map(|i| colors.get(i * colors.len() / max_colors).copied())
        .collect()
}

fn refine_centroids(colors: &[Rgb], seeds: Vec<Rgb>, iterations: usize) -> Vec<Rgb> {
    let mut centroids = seeds;
    for _ in 0..iterations {
        let mut sums = vec![[0u64; 3]; centroids.len()];
        let mut counts = vec![0u64; centroids.len()];
        for &color in colors {
            let index = nearest_index(&centroids, color);
            if let (Some(sum), Some(count)) = (sums.get_mut(index), counts.get_mut(index)) {
                for (channel, value) in sum.iter_mut().zip(color) {
                    *channel += u64::from(value);
                }
                *count += 1;
            }
        }

        let mut changed = false;
        for ((centroid, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
            // Empty clusters keep their previous centroid
            if count == 0 {
                continue;
            }
            let updated = sum.map(|channel| ((channel + count / 2) / count) as u8);
            if updated != *centroid {
                *centroid = updated;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut unique = Vec::with_capacity(centroids.len());
    for centroid in centroids {
        if !unique.contains(&centroid) {
            unique.push(centroid);
        }
    }
    unique
}

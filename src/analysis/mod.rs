//! Image analysis used by the generators and the output checks

/// Region contour tracing over label maps
pub mod contours;
/// Palette extraction, reduction and quantization
pub mod palette;
/// Seam quality scores and Wang border validation
pub mod quality;
/// Douglas-Peucker polygon simplification
pub mod simplify;

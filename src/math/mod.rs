//! Numeric building blocks: seeded randomness, colour arithmetic and noise

/// CIE Lab conversion and RGB distance helpers
pub mod color;
/// Fractal Perlin, simplex and Worley noise fields
pub mod noise;
/// Portable seeded random streams
pub mod random;

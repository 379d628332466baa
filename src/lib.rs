//! Deterministic seamless background generation
//!
//! Tile sets come from one of five pipelines: fractal noise, Wang tiles with a
//! backtracking layout solver, palette geometrization of a source image, offset-and-blend
//! seamless conversion, or patch-based texture synthesis. The orchestrator validates
//! settings and output, keeps the last valid result, and exports preset bundles.

#![forbid(unsafe_code)]

/// Generation pipelines, the layout solver and the orchestrator
pub mod algorithm;
/// Palette, contour, simplification and seam quality analysis
pub mod analysis;
/// Settings, audit, export, image I/O, CLI and error handling
pub mod io;
/// Seeded randomness, colour math and noise
pub mod math;
/// Pixel buffers, tiles and layout grids
pub mod spatial;

pub use io::error::{GenerationError, Result};

//! Spatial data structures
//!
//! This module contains the engine-independent value types shared by every pipeline:
//! - RGBA pixel buffers and points
//! - Tiles, tile sets and Wang edge patterns
//! - Layout grids of tile indices

/// Pixel buffers and 2D points
pub mod buffer;
/// Layout grids and their edge consistency checks
pub mod grid;
/// Tile sets and edge patterns
pub mod tiles;

pub use buffer::{PixelBuffer, Point};
pub use grid::LayoutGrid;
pub use tiles::{Edge, EdgePattern, TileSet};

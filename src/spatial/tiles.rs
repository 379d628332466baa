//! Tiles, tile sets and Wang edge patterns
//!
//! A `TileSet` is the unit of output for every generation mode. Wang sets also carry
//! one `EdgePattern` per tile naming the edge class of each side, which is what the
//! layout solver matches on.

use serde::{Deserialize, Serialize};

use crate::spatial::buffer::{PixelBuffer, Rgba, TRANSPARENT};

/// A square pixel buffer whose edge equals its set's tile size
pub type Tile = PixelBuffer;

/// One side of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Upper boundary row
    Top,
    /// Rightmost boundary column
    Right,
    /// Lower boundary row
    Bottom,
    /// Leftmost boundary column
    Left,
}

impl Edge {
    /// Every edge in pattern order
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// The edge facing this one across a shared boundary
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    /// Position of this edge within an `EdgePattern`
    pub const fn index(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Right => 1,
            Self::Bottom => 2,
            Self::Left => 3,
        }
    }
}

/// Edge classes of one tile as `[top, right, bottom, left]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgePattern(pub [usize; 4]);

impl EdgePattern {
    /// Class assigned to `edge`
    pub const fn class(&self, edge: Edge) -> usize {
        let [top, right, bottom, left] = self.0;
        match edge {
            Edge::Top => top,
            Edge::Right => right,
            Edge::Bottom => bottom,
            Edge::Left => left,
        }
    }

    /// All four classes in pattern order
    pub const fn classes(&self) -> [usize; 4] {
        self.0
    }
}

/// Seam quality scores computed after a successful generation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileQuality {
    /// Mean CIE76 difference across wrapped tile seams
    pub delta_e: f64,
    /// Seam score in `[0, 1]`, 1 meaning invisible seams
    pub seamlessness: f64,
}

/// Ordered tiles plus optional Wang edge patterns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TileSet {
    tiles: Vec<Tile>,
    edge_patterns: Vec<EdgePattern>,
    tile_size: usize,
    quality: TileQuality,
}

impl TileSet {
    /// Create an empty set for tiles of `tile_size` pixels
    pub fn new(tile_size: usize) -> Self {
        Self {
            tile_size,
            ..Self::default()
        }
    }

    /// The empty, invalid set returned by failed generations
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set of plain tiles without edge patterns
    pub fn from_tiles(tile_size: usize, tiles: Vec<Tile>) -> Self {
        Self {
            tiles,
            tile_size,
            ..Self::default()
        }
    }

    /// Append a tile without an edge pattern
    pub fn push(&mut self, tile: Tile) {
        self.tiles.push(tile);
    }

    /// Append a Wang tile and its edge classes
    pub fn push_wang(&mut self, tile: Tile, pattern: EdgePattern) {
        self.tiles.push(tile);
        self.edge_patterns.push(pattern);
    }

    /// Tiles in insertion order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tile at `index`
    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Edge patterns, empty for non-Wang sets
    pub fn edge_patterns(&self) -> &[EdgePattern] {
        &self.edge_patterns
    }

    /// Edge pattern of tile `index`
    pub fn edge_pattern(&self, index: usize) -> Option<&EdgePattern> {
        self.edge_patterns.get(index)
    }

    /// True when every tile carries an edge pattern
    pub fn is_wang(&self) -> bool {
        !self.edge_patterns.is_empty() && self.edge_patterns.len() == self.tiles.len()
    }

    /// Edge length of each tile
    pub const fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True when the set holds no tiles
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Quality scores, zero until computed
    pub const fn quality(&self) -> TileQuality {
        self.quality
    }

    /// Replace the quality scores
    pub const fn set_quality(&mut self, quality: TileQuality) {
        self.quality = quality;
    }

    /// Non-empty, positive tile size, every tile square at tile size with a sound buffer
    pub fn is_valid(&self) -> bool {
        if self.tiles.is_empty() || self.tile_size == 0 {
            return false;
        }
        if !self.edge_patterns.is_empty() && self.edge_patterns.len() != self.tiles.len() {
            return false;
        }
        self.tiles.iter().all(|tile| {
            tile.width() == self.tile_size && tile.height() == self.tile_size && tile.is_well_formed()
        })
    }
}

/// Boundary pixels of `tile` along `edge`, ordered left-to-right or top-to-bottom
pub fn boundary_pixels(tile: &Tile, edge: Edge) -> Vec<Rgba> {
    let width = tile.width();
    let height = tile.height();
    if tile.is_empty() {
        return Vec::new();
    }
    let at = |x: usize, y: usize| tile.pixel(x, y).unwrap_or(TRANSPARENT);
    match edge {
        Edge::Top => (0..width).map(|x| at(x, 0)).collect(),
        Edge::Bottom => (0..width).map(|x| at(x, height - 1)).collect(),
        Edge::Left => (0..height).map(|y| at(0, y)).collect(),
        Edge::Right => (0..height).map(|y| at(width - 1, y)).collect(),
    }
}

//! Layout grids of tile indices
//!
//! Rows index the vertical axis, so `cells[(row, col)]` is the tile at `(x = col, y = row)`.

use ndarray::Array2;

use crate::spatial::buffer::PixelBuffer;
use crate::spatial::tiles::{Edge, TileSet};

/// A `width x height` arrangement of tile indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutGrid {
    cells: Array2<usize>,
}

impl LayoutGrid {
    /// Create a grid with every cell set to tile 0
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: Array2::zeros((height, width)),
        }
    }

    /// Wrap an existing `(rows, cols)` array
    pub const fn from_cells(cells: Array2<usize>) -> Self {
        Self { cells }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    /// Tile index at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<usize> {
        self.cells.get((y, x)).copied()
    }

    /// Assign a tile index; out-of-bounds writes are ignored
    pub fn set(&mut self, x: usize, y: usize, tile: usize) {
        if let Some(cell) = self.cells.get_mut((y, x)) {
            *cell = tile;
        }
    }

    /// Underlying `(rows, cols)` array
    pub const fn cells(&self) -> &Array2<usize> {
        &self.cells
    }

    /// Count interior adjacencies whose facing edge classes differ
    ///
    /// Indices outside the tile set count as violations. Sets without edge patterns
    /// impose no constraints.
    pub fn violations(&self, tile_set: &TileSet) -> usize {
        if !tile_set.is_wang() {
            return 0;
        }
        let mut count = 0;
        for y in 0..self.height() {
            for x in 0..self.width() {
                if x + 1 < self.width() && !self.pair_matches(tile_set, (x, y), (x + 1, y), Edge::Right) {
                    count += 1;
                }
                if y + 1 < self.height() && !self.pair_matches(tile_set, (x, y), (x, y + 1), Edge::Bottom) {
                    count += 1;
                }
            }
        }
        count
    }

    /// True when every index is in range and every adjacency matches
    pub fn is_consistent(&self, tile_set: &TileSet) -> bool {
        self.cells.iter().all(|&tile| tile < tile_set.len()) && self.violations(tile_set) == 0
    }

    fn pair_matches(
        &self,
        tile_set: &TileSet,
        first: (usize, usize),
        second: (usize, usize),
        facing: Edge,
    ) -> bool {
        let patterns = (
            self.get(first.0, first.1).and_then(|tile| tile_set.edge_pattern(tile)),
            self.get(second.0, second.1).and_then(|tile| tile_set.edge_pattern(tile)),
        );
        match patterns {
            (Some(a), Some(b)) => a.class(facing) == b.class(facing.opposite()),
            _ => false,
        }
    }

    /// Composite the grid into one raster with each tile scaled to `cell_size`
    pub fn render(&self, tile_set: &TileSet, cell_size: usize) -> PixelBuffer {
        let mut canvas = PixelBuffer::new(self.width() * cell_size, self.height() * cell_size);
        for ((y, x), &index) in self.cells.indexed_iter() {
            let Some(tile) = tile_set.tile(index) else {
                continue;
            };
            if tile.width() == cell_size && tile.height() == cell_size {
                canvas.blit(tile, x * cell_size, y * cell_size);
            } else {
                canvas.blit(
                    &tile.resize_nearest(cell_size, cell_size),
                    x * cell_size,
                    y * cell_size,
                );
            }
        }
        canvas
    }
}

//! Candidate tile sets for layout solving

use bitvec::prelude::*;
use std::fmt;

/// Fixed-size bitset of tile indices
///
/// Uses 0-based tile indices matching positions in a `TileSet`. The layout solver keeps
/// one bitset per (edge, class) and intersects them to find the tiles that fit a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileBitset {
    bits: BitVec,
}

impl TileBitset {
    /// Create a bitset with no tiles present
    pub fn new(tile_count: usize) -> Self {
        Self {
            bits: bitvec![0; tile_count],
        }
    }

    /// Create a bitset containing every tile
    pub fn all(tile_count: usize) -> Self {
        Self {
            bits: bitvec![1; tile_count],
        }
    }

    /// Build a bitset from the tiles satisfying `predicate`
    pub fn from_fn<F>(tile_count: usize, mut predicate: F) -> Self
    where
        F: FnMut(usize) -> bool,
    {
        let mut bitset = Self::new(tile_count);
        for tile in 0..tile_count {
            if predicate(tile) {
                bitset.insert(tile);
            }
        }
        bitset
    }

    /// Number of tiles this bitset can hold
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Insert a tile index; out-of-range indices are ignored
    pub fn insert(&mut self, tile: usize) {
        if tile < self.bits.len() {
            self.bits.set(tile, true);
        }
    }

    /// Test tile membership
    pub fn contains(&self, tile: usize) -> bool {
        self.bits.get(tile).as_deref() == Some(&true)
    }

    /// Intersect this bitset with another in place
    pub fn intersect_with(&mut self, other: &Self) {
        self.bits &= &other.bits;
    }

    /// Create a new bitset containing the intersection
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.intersect_with(other);
        result
    }

    /// Test if no tiles are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count tiles in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Tile indices in ascending order
    pub fn to_vec(&self) -> Vec<usize> {
        self.bits.iter_ones().collect()
    }
}

impl fmt::Display for TileBitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileBitset({} tiles: {:?})", self.count(), self.to_vec())
    }
}

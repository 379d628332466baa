//! Wang layout solving
//!
//! Cells are filled in row-major order. A cell's candidates are the tiles whose top class
//! matches the bottom class of the tile above and whose left class matches the right
//! class of the tile to the left, found by intersecting per-class bitsets. Candidates are
//! shuffled with a seeded stream and tried in turn; an exhausted cell backtracks.

use tracing::{debug, warn};

use crate::algorithm::bitset::TileBitset;
use crate::io::error::{GenerationError, Result, invalid_parameter};
use crate::math::random::{SeededRng, stream};
use crate::spatial::grid::LayoutGrid;
use crate::spatial::tiles::{Edge, TileSet};

/// Per-class candidate bitsets for the two constrained edges
struct ClassIndex {
    tile_count: usize,
    by_top: Vec<TileBitset>,
    by_left: Vec<TileBitset>,
}

impl ClassIndex {
    fn build(tile_set: &TileSet) -> Self {
        let tile_count = tile_set.len();
        let class_count = tile_set
            .edge_patterns()
            .iter()
            .flat_map(|pattern| pattern.classes())
            .max()
            .map_or(0, |max| max + 1);

        let index_for = |edge: Edge| -> Vec<TileBitset> {
            (0..class_count)
                .map(|class| {
                    TileBitset::from_fn(tile_count, |tile| {
                        tile_set
                            .edge_pattern(tile)
                            .is_some_and(|pattern| pattern.class(edge) == class)
                    })
                })
                .collect()
        };

        Self {
            tile_count,
            by_top: index_for(Edge::Top),
            by_left: index_for(Edge::Left),
        }
    }

    /// Tiles that fit cell `cell` of a `width`-wide grid given the assignments so far
    fn candidates(&self, tile_set: &TileSet, assignment: &[usize], cell: usize, width: usize) -> TileBitset {
        let mut candidates = TileBitset::all(self.tile_count);
        let x = cell % width;

        if cell >= width {
            let above = assignment
                .get(cell - width)
                .and_then(|&tile| tile_set.edge_pattern(tile));
            constrain(&mut candidates, &self.by_top, above.map(|p| p.class(Edge::Bottom)));
        }
        if x > 0 {
            let left = assignment
                .get(cell - 1)
                .and_then(|&tile| tile_set.edge_pattern(tile));
            constrain(&mut candidates, &self.by_left, left.map(|p| p.class(Edge::Right)));
        }
        candidates
    }
}

fn constrain(candidates: &mut TileBitset, index: &[TileBitset], class: Option<usize>) {
    match class.and_then(|class| index.get(class)) {
        Some(matching) => candidates.intersect_with(matching),
        None => *candidates = TileBitset::new(candidates.capacity()),
    }
}

struct Frame {
    candidates: Vec<usize>,
    next: usize,
}

/// Greedy layout produced when the solver gives up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackLayout {
    /// Filled grid
    pub grid: LayoutGrid,
    /// Interior adjacencies whose edge classes do not match
    pub violations: usize,
}

/// Backtracking solver with a node budget
#[derive(Debug, Clone, Copy)]
pub struct WangLayoutSolver {
    budget: u64,
}

impl WangLayoutSolver {
    /// Create a solver that expands at most `budget` search nodes
    pub const fn new(budget: u64) -> Self {
        Self { budget }
    }

    /// Node budget
    pub const fn budget(&self) -> u64 {
        self.budget
    }

    /// Find a layout where every interior adjacency matches
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an empty or pattern-less tile set or a zero
    /// dimension, `LayoutUnsatisfiable` when exhaustive search finds no layout, and
    /// `SearchBudgetExhausted` when the node budget runs out first.
    pub fn solve(&self, tile_set: &TileSet, width: usize, height: usize, seed: i64) -> Result<LayoutGrid> {
        check_inputs(tile_set, width, height)?;

        let index = ClassIndex::build(tile_set);
        let total = width * height;
        let mut rng = SeededRng::derived(seed, stream::LAYOUT);
        let mut assignment: Vec<usize> = Vec::with_capacity(total);
        let mut nodes_expanded = 0u64;
        let mut deepest_cell = 0usize;

        let mut first = index.candidates(tile_set, &assignment, 0, width).to_vec();
        rng.shuffle(&mut first);
        let mut stack = vec![Frame {
            candidates: first,
            next: 0,
        }];

        loop {
            let Some(depth) = stack.len().checked_sub(1) else {
                debug!(width, height, nodes_expanded, "Layout search exhausted");
                return Err(GenerationError::LayoutUnsatisfiable {
                    grid_dimensions: (width, height),
                    nodes_expanded,
                });
            };
            let Some(frame) = stack.last_mut() else {
                continue;
            };
            let Some(&tile) = frame.candidates.get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            assignment.truncate(depth);
            assignment.push(tile);

            nodes_expanded += 1;
            deepest_cell = deepest_cell.max(depth + 1);
            if nodes_expanded > self.budget {
                return Err(GenerationError::SearchBudgetExhausted {
                    budget: self.budget,
                    deepest_cell,
                });
            }

            if depth + 1 == total {
                debug!(width, height, nodes_expanded, "Layout solved");
                return Ok(grid_from_assignment(&assignment, width, height));
            }

            let mut candidates = index
                .candidates(tile_set, &assignment, depth + 1, width)
                .to_vec();
            rng.shuffle(&mut candidates);
            stack.push(Frame {
                candidates,
                next: 0,
            });
        }
    }

    /// Greedy row-major fill that never fails on valid inputs
    ///
    /// Each cell takes a random matching candidate when one exists and a random tile
    /// otherwise. This is an escape valve for callers that prefer a slightly flawed
    /// layout over none; the returned violation count says how flawed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` under the same input conditions as [`Self::solve`].
    pub fn fill_with_fallback(
        &self,
        tile_set: &TileSet,
        width: usize,
        height: usize,
        seed: i64,
    ) -> Result<FallbackLayout> {
        check_inputs(tile_set, width, height)?;

        let index = ClassIndex::build(tile_set);
        let mut rng = SeededRng::derived(seed, stream::LAYOUT);
        let mut assignment = Vec::with_capacity(width * height);
        for cell in 0..width * height {
            let candidates = index.candidates(tile_set, &assignment, cell, width).to_vec();
            let tile = if candidates.is_empty() {
                rng.index(tile_set.len())
            } else {
                candidates
                    .get(rng.index(candidates.len()))
                    .copied()
                    .unwrap_or_default()
            };
            assignment.push(tile);
        }

        let grid = grid_from_assignment(&assignment, width, height);
        let violations = grid.violations(tile_set);
        if violations > 0 {
            warn!(violations, width, height, "Fallback layout has mismatched edges");
        }
        Ok(FallbackLayout { grid, violations })
    }
}

/// Solve with an explicit budget in one call
///
/// # Errors
///
/// Returns the errors documented on [`WangLayoutSolver::solve`].
pub fn solve(
    tile_set: &TileSet,
    width: usize,
    height: usize,
    seed: i64,
    budget: u64,
) -> Result<LayoutGrid> {
    WangLayoutSolver::new(budget).solve(tile_set, width, height, seed)
}

fn check_inputs(tile_set: &TileSet, width: usize, height: usize) -> Result<()> {
    if tile_set.is_empty() {
        return Err(invalid_parameter(
            "tile_set",
            &"empty",
            &"layout requires at least one tile",
        ));
    }
    if !tile_set.is_wang() {
        return Err(invalid_parameter(
            "tile_set",
            &tile_set.len(),
            &"layout requires an edge pattern for every tile",
        ));
    }
    if width == 0 || height == 0 {
        return Err(invalid_parameter(
            "grid",
            &format!("{width}x{height}"),
            &"layout dimensions must be positive",
        ));
    }
    Ok(())
}

fn grid_from_assignment(assignment: &[usize], width: usize, height: usize) -> LayoutGrid {
    let mut grid = LayoutGrid::new(width, height);
    for (cell, &tile) in assignment.iter().enumerate() {
        grid.set(cell % width, cell / width, tile);
    }
    grid
}

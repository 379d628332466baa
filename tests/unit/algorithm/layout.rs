//! Tests for the backtracking Wang layout solver

#[cfg(test)]
mod tests {
    use seamtile::GenerationError;
    use seamtile::algorithm::layout::{WangLayoutSolver, solve};
    use seamtile::algorithm::synthesis::WangTileSynthesizer;
    use seamtile::spatial::buffer::PixelBuffer;
    use seamtile::spatial::tiles::{EdgePattern, TileSet};

    fn lone_tile() -> TileSet {
        let mut set = TileSet::new(2);
        set.push_wang(PixelBuffer::new(2, 2), EdgePattern([0, 1, 2, 3]));
        set
    }

    // Tests that a solved grid has the requested shape and matching edges everywhere
    // Verified by ignoring the above-neighbour constraint in candidates
    #[test]
    fn test_solution_is_edge_consistent() {
        let set = WangTileSynthesizer::default().synthesize(8, 8, 7);
        let Ok(grid) = solve(&set, 8, 6, 7, 200_000) else {
            panic!("layout should be solvable");
        };
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.height(), 6);
        assert!(grid.cells().iter().all(|&tile| tile < set.len()));
        assert_eq!(grid.violations(&set), 0);
    }

    #[test]
    fn test_solution_is_deterministic() {
        let set = WangTileSynthesizer::default().synthesize(8, 8, 1);
        let solver = WangLayoutSolver::new(10_000);
        assert_eq!(solver.budget(), 10_000);
        assert_eq!(solver.solve(&set, 5, 5, 3).ok(), solver.solve(&set, 5, 5, 3).ok());
    }

    // Tests exhaustive failure when no tile can follow the first
    #[test]
    fn test_unsatisfiable_layout() {
        match solve(&lone_tile(), 2, 1, 0, 1_000) {
            Err(GenerationError::LayoutUnsatisfiable {
                grid_dimensions,
                nodes_expanded,
            }) => {
                assert_eq!(grid_dimensions, (2, 1));
                assert_eq!(nodes_expanded, 1);
            }
            other => panic!("expected unsatisfiable, got {other:?}"),
        }
        assert!(solve(&lone_tile(), 1, 1, 0, 1_000).is_ok());
    }

    #[test]
    fn test_budget_exhaustion() {
        let set = WangTileSynthesizer::default().synthesize(8, 8, 2);
        assert!(matches!(
            solve(&set, 4, 4, 2, 3),
            Err(GenerationError::SearchBudgetExhausted { budget: 3, .. })
        ));
    }

    #[test]
    fn test_invalid_inputs() {
        let plain = TileSet::from_tiles(2, vec![PixelBuffer::new(2, 2)]);
        for (set, width, height) in [
            (TileSet::empty(), 2, 2),
            (plain, 2, 2),
            (lone_tile(), 0, 3),
            (lone_tile(), 3, 0),
        ] {
            assert!(matches!(
                solve(&set, width, height, 0, 100),
                Err(GenerationError::InvalidParameter { .. })
            ));
        }
    }

    // Tests that the fallback always fills the grid and reports its mismatches
    #[test]
    fn test_fallback_counts_violations() {
        let solver = WangLayoutSolver::new(10);
        let Ok(fallback) = solver.fill_with_fallback(&lone_tile(), 3, 3, 0) else {
            panic!("fallback should not fail on valid inputs");
        };
        assert_eq!(fallback.violations, 12);
        assert_eq!(fallback.grid.violations(&lone_tile()), 12);

        let set = WangTileSynthesizer::default().synthesize(8, 8, 5);
        let clean = solver.fill_with_fallback(&set, 6, 4, 5).map(|f| f.violations);
        assert_eq!(clean.ok(), Some(0));
        assert!(solver.fill_with_fallback(&TileSet::empty(), 2, 2, 0).is_err());
    }
}

//! Tests for layout grids and their edge consistency checks

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use seamtile::spatial::buffer::PixelBuffer;
    use seamtile::spatial::grid::LayoutGrid;
    use seamtile::spatial::tiles::{EdgePattern, TileSet};

    // Tile 0 matches tile 1 on its right and bottom; tile 1 matches tile 0 likewise
    fn alternating_set() -> TileSet {
        let mut set = TileSet::new(2);
        set.push_wang(
            PixelBuffer::filled(2, 2, [255, 0, 0, 255]),
            EdgePattern([0, 1, 2, 3]),
        );
        set.push_wang(
            PixelBuffer::filled(2, 2, [0, 0, 255, 255]),
            EdgePattern([2, 3, 0, 1]),
        );
        set
    }

    fn checkerboard(width: usize, height: usize) -> LayoutGrid {
        let mut grid = LayoutGrid::new(width, height);
        for y in 0..height {
            for x in 0..width {
                grid.set(x, y, (x + y) % 2);
            }
        }
        grid
    }

    #[test]
    fn test_dimensions_follow_width_then_height() {
        let grid = LayoutGrid::new(8, 6);
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.height(), 6);
        assert_eq!(grid.cells().dim(), (6, 8));
        assert_eq!(grid.get(7, 5), Some(0));
        assert_eq!(grid.get(8, 0), None);
    }

    // Tests that a checkerboard of mutually compatible tiles is consistent
    // Verified by comparing the same edge on both tiles in pair_matches
    #[test]
    fn test_checkerboard_is_consistent() {
        let set = alternating_set();
        let grid = checkerboard(4, 3);
        assert_eq!(grid.violations(&set), 0);
        assert!(grid.is_consistent(&set));
    }

    #[test]
    fn test_violations_counted_per_adjacency() {
        let set = alternating_set();
        // All zeros: every horizontal and vertical neighbour pair mismatches
        let grid = LayoutGrid::new(3, 2);
        assert_eq!(grid.violations(&set), 2 * 2 + 3);
        assert!(!grid.is_consistent(&set));
    }

    #[test]
    fn test_out_of_range_index_is_inconsistent() {
        let set = alternating_set();
        let grid = LayoutGrid::from_cells(Array2::from_elem((1, 1), 5));
        assert!(!grid.is_consistent(&set));
    }

    #[test]
    fn test_non_wang_sets_have_no_constraints() {
        let set = TileSet::from_tiles(2, vec![PixelBuffer::new(2, 2)]);
        assert_eq!(LayoutGrid::new(3, 3).violations(&set), 0);
    }

    // Tests that rendering scales tiles into their cells
    #[test]
    fn test_render_places_scaled_tiles() {
        let set = alternating_set();
        let image = checkerboard(2, 1).render(&set, 4);
        assert_eq!((image.width(), image.height()), (8, 4));
        assert_eq!(image.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel(3, 3), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel(4, 0), Some([0, 0, 255, 255]));
    }
}

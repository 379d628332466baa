//! Tests for `TileBitset` candidate sets

#[cfg(test)]
mod tests {
    use seamtile::algorithm::bitset::TileBitset;

    // An eight-tile Wang set assigns classes [(i)%4, (i+1)%4, (i+2)%4, (i+3)%4]
    fn tiles_with_top_class(class: usize) -> TileBitset {
        TileBitset::from_fn(8, |tile| tile % 4 == class)
    }

    fn tiles_with_left_class(class: usize) -> TileBitset {
        TileBitset::from_fn(8, |tile| (tile + 3) % 4 == class)
    }

    // Verifies an empty candidate set still remembers the tile count
    // Verified by building the set with every tile present
    #[test]
    fn test_empty_candidates() {
        let candidates = TileBitset::new(8);
        assert!(candidates.is_empty());
        assert_eq!(candidates.capacity(), 8);
        assert_eq!(candidates.count(), 0);
        assert!(candidates.to_vec().is_empty());
    }

    // Tests that tile indices past the set size never become candidates
    // Verified by removing the range check from insert
    #[test]
    fn test_out_of_range_tiles_ignored() {
        let mut candidates = TileBitset::new(4);
        for tile in [0, 3, 4, 17] {
            candidates.insert(tile);
        }
        assert_eq!(candidates.to_vec(), vec![0, 3]);
        assert!(!candidates.contains(4));
    }

    // Tests the cell filter used by the solver: above and left constraints intersect
    // Verified by swapping intersection for union
    #[test]
    fn test_constraint_intersection() {
        let above = tiles_with_top_class(2);
        let left = tiles_with_left_class(3);
        assert_eq!(above.to_vec(), vec![2, 6]);
        assert_eq!(left.to_vec(), vec![0, 4]);
        assert!(above.intersection(&left).is_empty());

        let compatible_left = tiles_with_left_class(1);
        assert_eq!(above.intersection(&compatible_left).to_vec(), vec![2, 6]);
    }

    #[test]
    fn test_intersect_in_place_narrows() {
        let mut candidates = TileBitset::all(8);
        candidates.intersect_with(&tiles_with_top_class(1));
        assert_eq!(candidates.count(), 2);
        candidates.intersect_with(&TileBitset::from_fn(8, |tile| tile > 4));
        assert_eq!(candidates.to_vec(), vec![5]);
    }

    // Tests the unconstrained first cell and its display form
    // Verified by initializing `all` with cleared bits
    #[test]
    fn test_unconstrained_cell() {
        let candidates = TileBitset::all(3);
        assert!((0..3).all(|tile| candidates.contains(tile)));
        assert_eq!(candidates.to_string(), "TileBitset(3 tiles: [0, 1, 2])");
    }
}

//! Tests for seam quality scores and Wang border validation

#[cfg(test)]
mod tests {
    use seamtile::analysis::quality::{edge_distance, set_quality, tile_quality, validate_wang_borders};
    use seamtile::math::color::MAX_RGB_DISTANCE;
    use seamtile::spatial::buffer::PixelBuffer;
    use seamtile::spatial::tiles::{Edge, EdgePattern, TileSet};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn pair(first: [u8; 4], second: [u8; 4]) -> TileSet {
        let mut set = TileSet::new(4);
        set.push_wang(PixelBuffer::filled(4, 4, first), EdgePattern([0, 1, 2, 3]));
        set.push_wang(PixelBuffer::filled(4, 4, second), EdgePattern([2, 3, 0, 1]));
        set
    }

    #[test]
    fn test_uniform_tile_is_seamless() {
        let quality = tile_quality(&PixelBuffer::filled(4, 4, RED));
        assert!(quality.delta_e.abs() < 1e-9);
        assert!((quality.seamlessness - 1.0).abs() < 1e-9);
    }

    // Tests that a hard vertical seam halves the seam score
    // Verified by scoring only the horizontal wrap seam in tile_quality
    #[test]
    fn test_hard_seam_lowers_score() {
        let mut tile = PixelBuffer::filled(4, 4, [255, 255, 255, 255]);
        for y in 0..4 {
            tile.set_pixel(0, y, [0, 0, 0, 255]);
        }
        let quality = tile_quality(&tile);
        assert!((quality.seamlessness - 0.5).abs() < 1e-9);
        assert!(quality.delta_e > 40.0);
    }

    #[test]
    fn test_edge_distance() {
        let red = PixelBuffer::filled(4, 4, RED);
        let blue = PixelBuffer::filled(4, 4, BLUE);
        assert_eq!(edge_distance(&red, &red, Edge::Right, 32), Some(0.0));
        let distance = edge_distance(&red, &blue, Edge::Bottom, 1).unwrap_or_default();
        assert!((distance - (2.0f64 * 255.0 * 255.0).sqrt()).abs() < 1e-9);
        let short = PixelBuffer::filled(3, 3, RED);
        assert_eq!(edge_distance(&red, &short, Edge::Right, 32), None);
    }

    // Tests that identical compatible edges give full consistency
    #[test]
    fn test_matching_borders_are_valid() {
        let validation = validate_wang_borders(&pair(RED, RED), 30.0, 0.8, 32);
        assert!(validation.has_valid_borders);
        assert!(!validation.has_visual_cuts);
        assert!((validation.border_consistency - 1.0).abs() < f64::EPSILON);
        assert!(validation.error_details.is_empty());
    }

    #[test]
    fn test_clashing_borders_are_reported() {
        let validation = validate_wang_borders(&pair(RED, BLUE), 30.0, 0.8, 32);
        assert!(!validation.has_valid_borders);
        assert!(validation.has_visual_cuts);
        assert!(validation.border_consistency.abs() < f64::EPSILON);
        assert_eq!(validation.error_details.len(), 4);
    }

    #[test]
    fn test_degenerate_sets_are_invalid() {
        let empty = validate_wang_borders(&TileSet::empty(), 30.0, 0.8, 32);
        assert!(!empty.has_valid_borders);
        assert!(!empty.error_details.is_empty());

        let plain = TileSet::from_tiles(4, vec![PixelBuffer::filled(4, 4, RED)]);
        assert!(!validate_wang_borders(&plain, 30.0, 0.8, 32).has_valid_borders);

        // A lone tile whose opposite edges never share a class has nothing to compare
        let mut lone = TileSet::new(4);
        lone.push_wang(PixelBuffer::filled(4, 4, RED), EdgePattern([0, 1, 2, 3]));
        let validation = validate_wang_borders(&lone, 30.0, 0.8, 32);
        assert!(!validation.has_valid_borders);
        assert_eq!(validation.error_details.len(), 1);
    }

    #[test]
    fn test_set_quality() {
        assert!(set_quality(&TileSet::empty()).seamlessness.abs() < f64::EPSILON);

        let wang = set_quality(&pair(RED, BLUE));
        let expected = 1.0 - (2.0f64 * 255.0 * 255.0).sqrt() / MAX_RGB_DISTANCE;
        assert!((wang.seamlessness - expected).abs() < 1e-9);

        let plain = TileSet::from_tiles(
            4,
            vec![PixelBuffer::filled(4, 4, RED), PixelBuffer::filled(4, 4, BLUE)],
        );
        assert!((set_quality(&plain).seamlessness - 1.0).abs() < 1e-9);
    }
}

//! Tests for image geometrization and the tiling wrap rule

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use seamtile::GenerationError;
    use seamtile::algorithm::geometrize::{
        GeometrizeParams, Geometrizer, Mirror, mirrored_counterparts,
    };
    use seamtile::analysis::contours::{ContourTracer, Region};
    use seamtile::analysis::palette::PaletteExtractor;
    use seamtile::spatial::buffer::{PixelBuffer, Point};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn split_image() -> PixelBuffer {
        let mut image = PixelBuffer::filled(8, 8, BLUE);
        for y in 0..8 {
            for x in 0..4 {
                image.set_pixel(x, y, RED);
            }
        }
        image
    }

    fn params(optimize_for_tiling: bool) -> GeometrizeParams {
        GeometrizeParams {
            max_colors: 4,
            color_tolerance: 0.1,
            simplification_tolerance: 1.0,
            optimize_for_tiling,
            resolution: 8,
        }
    }

    struct NoRegions;

    impl ContourTracer for NoRegions {
        fn trace(&self, _labels: &Array2<usize>) -> Vec<Region> {
            Vec::new()
        }
    }

    // Tests that axis-aligned regions are reproduced exactly without the wrap rule
    // Verified by sampling pixel corners instead of centres in fill_even_odd
    #[test]
    fn test_rectangles_reproduced_exactly() {
        let Ok(set) = Geometrizer::new().geometrize(&split_image(), &params(false)) else {
            panic!("geometrize failed");
        };
        assert_eq!(set.len(), 1);
        assert_eq!(set.tile_size(), 8);
        let tile = set.tile(0).cloned().unwrap_or_else(|| PixelBuffer::new(0, 0));
        assert_eq!(tile, split_image());
    }

    // Tests that opposite boundaries carry the same colours with the wrap rule
    #[test]
    fn test_wrap_rule_matches_opposite_edges() {
        let Ok(set) = Geometrizer::new().geometrize(&split_image(), &params(true)) else {
            panic!("geometrize failed");
        };
        let Some(tile) = set.tile(0) else {
            panic!("no tile");
        };
        for i in 0..8 {
            assert_eq!(tile.pixel(0, i), tile.pixel(7, i), "row {i}");
            assert_eq!(tile.pixel(i, 0), tile.pixel(i, 7), "column {i}");
        }
        // Interior pixels outside the margin band keep the source layout
        assert_eq!(tile.pixel(2, 3), Some(RED));
        assert_eq!(tile.pixel(5, 3), Some(BLUE));
    }

    #[test]
    fn test_resampling_sets_resolution() {
        let source = PixelBuffer::filled(3, 5, [10, 20, 30, 255]);
        let params = GeometrizeParams {
            resolution: 16,
            ..params(true)
        };
        let Ok(set) = Geometrizer::new().geometrize(&source, &params) else {
            panic!("geometrize failed");
        };
        assert_eq!(set.tile(0), Some(&PixelBuffer::filled(16, 16, [10, 20, 30, 255])));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let geometrizer = Geometrizer::new();
        let bad_inputs = [
            (PixelBuffer::new(0, 0), params(true)),
            (
                split_image(),
                GeometrizeParams {
                    resolution: 0,
                    ..params(true)
                },
            ),
            (
                split_image(),
                GeometrizeParams {
                    max_colors: 0,
                    ..params(true)
                },
            ),
        ];
        for (image, bad) in bad_inputs {
            assert!(matches!(
                geometrizer.geometrize(&image, &bad),
                Err(GenerationError::InvalidParameter { .. })
            ));
        }
    }

    // Tests the tracer seam: a tracer that finds nothing fails the contour stage
    #[test]
    fn test_custom_tracer_without_regions_fails() {
        let geometrizer = Geometrizer::with_tracer(NoRegions, PaletteExtractor::default());
        assert!(matches!(
            geometrizer.geometrize(&split_image(), &params(true)),
            Err(GenerationError::GenerationFailure {
                stage: "contours",
                ..
            })
        ));
    }

    #[test]
    fn test_mirrored_counterparts_by_proximity() {
        let square = |x: f64, y: f64| {
            vec![vec![
                Point::new(x, y),
                Point::new(x + 2.0, y),
                Point::new(x + 2.0, y + 2.0),
                Point::new(x, y + 2.0),
            ]]
        };

        assert!(mirrored_counterparts(&square(40.0, 40.0), 100).is_empty());

        let left = mirrored_counterparts(&square(1.0, 40.0), 100);
        let mirrors: Vec<Mirror> = left.iter().map(|(mirror, _)| *mirror).collect();
        assert_eq!(mirrors, vec![Mirror::Horizontal]);
        let copy = left.first().and_then(|(_, loops)| loops.first()).cloned().unwrap_or_default();
        assert_eq!(copy.first(), Some(&Point::new(99.0, 40.0)));

        let corner = mirrored_counterparts(&square(1.0, 97.0), 100);
        let mirrors: Vec<Mirror> = corner.iter().map(|(mirror, _)| *mirror).collect();
        assert_eq!(mirrors, vec![Mirror::Horizontal, Mirror::Vertical, Mirror::Both]);
    }
}

//! Tests for the half-offset seamless blend

#[cfg(test)]
mod tests {
    use seamtile::GenerationError;
    use seamtile::algorithm::seamless::{hann_window, make_seamless, mirror_edges, seamless_tile, tukey_window};
    use seamtile::spatial::buffer::PixelBuffer;

    fn gradient(width: usize, height: usize) -> PixelBuffer {
        let mut image = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let value = (x * 255 / (width - 1)) as u8;
                image.set_pixel(x, y, [value, value, value, 255]);
            }
        }
        image
    }

    fn channel(image: &PixelBuffer, x: usize, y: usize) -> i32 {
        image.pixel(x, y).map_or(-1, |[r, ..]| i32::from(r))
    }

    #[test]
    fn test_hann_window_shape() {
        let window = hann_window(16);
        assert_eq!(window.len(), 16);
        assert!(window.iter().all(|w| (0.0..=1.0).contains(w)));
        for i in 0..8 {
            let (Some(a), Some(b)) = (window.get(i), window.get(15 - i)) else {
                panic!("window too short");
            };
            assert!((a - b).abs() < 1e-12, "asymmetric at {i}");
        }
        let (Some(edge), Some(centre)) = (window.first(), window.get(8)) else {
            panic!("window too short");
        };
        assert!(edge < &0.05);
        assert!(centre > &0.95);
    }

    // Tests that a zero taper keeps the interior and still zeroes the borders
    #[test]
    fn test_zero_taper_window() {
        let window = tukey_window(6, 0.0);
        assert!(window.first().is_some_and(|w| w.abs() < f64::EPSILON));
        assert!(window.last().is_some_and(|w| w.abs() < f64::EPSILON));
        assert!(window.get(1..5).is_some_and(|inner| inner.iter().all(|w| (w - 1.0).abs() < f64::EPSILON)));
    }

    // Tests that the wrap seam of a hard gradient becomes small
    // Verified by weighting the original towards the borders instead of the centre
    #[test]
    fn test_seam_is_softened() {
        let source = gradient(16, 8);
        assert_eq!(channel(&source, 15, 3) - channel(&source, 0, 3), 255);

        let Ok(seamless) = make_seamless(&source, 1.0) else {
            panic!("blend failed");
        };
        for y in 0..8 {
            let jump = (channel(&seamless, 15, y) - channel(&seamless, 0, y)).abs();
            assert!(jump < 40, "row {y} jump {jump}");
        }
    }

    #[test]
    fn test_uniform_image_unchanged() {
        let uniform = PixelBuffer::filled(9, 7, [40, 80, 120, 255]);
        assert_eq!(make_seamless(&uniform, 0.6).ok(), Some(uniform));
    }

    #[test]
    fn test_mirror_edges_reflects_border() {
        let mirrored = mirror_edges(&gradient(4, 4), 1);
        for y in 0..4 {
            assert_eq!(mirrored.pixel(0, y), mirrored.pixel(1, y));
            assert_eq!(mirrored.pixel(3, y), mirrored.pixel(2, y));
        }
        assert_eq!(mirror_edges(&gradient(4, 4), 0), gradient(4, 4));
    }

    #[test]
    fn test_seamless_tile_resizes() {
        for source in [gradient(40, 30), gradient(5, 5)] {
            let Ok(tile) = seamless_tile(&source, 16, 0.8) else {
                panic!("seamless tile failed");
            };
            assert_eq!((tile.width(), tile.height()), (16, 16));
        }
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(matches!(
            make_seamless(&PixelBuffer::new(0, 0), 0.5),
            Err(GenerationError::InvalidParameter { parameter: "image", .. })
        ));
        assert!(matches!(
            seamless_tile(&gradient(4, 4), 0, 0.5),
            Err(GenerationError::InvalidParameter {
                parameter: "tile_size",
                ..
            })
        ));
    }
}

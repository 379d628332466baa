//! Tests for RGBA pixel buffers and points

#[cfg(test)]
mod tests {
    use seamtile::spatial::buffer::{PixelBuffer, Point, TRANSPARENT};

    fn gradient(width: usize, height: usize) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                buffer.set_pixel(x, y, [x as u8, y as u8, 0, 255]);
            }
        }
        buffer
    }

    #[test]
    fn test_from_raw_checks_length() {
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 16]).is_ok());
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 15]).is_err());
    }

    // Tests bounds handling on reads and writes
    // Verified by removing the bounds check in set_pixel
    #[test]
    fn test_out_of_bounds_access() {
        let mut buffer = PixelBuffer::filled(3, 2, [1, 2, 3, 4]);
        assert_eq!(buffer.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(buffer.pixel(3, 0), None);
        buffer.set_pixel(5, 5, [9, 9, 9, 9]);
        assert!(buffer.pixels().all(|(_, _, px)| px == [1, 2, 3, 4]));
    }

    #[test]
    fn test_pixel_wrapped() {
        let buffer = gradient(4, 3);
        assert_eq!(buffer.pixel_wrapped(-1, 0), [3, 0, 0, 255]);
        assert_eq!(buffer.pixel_wrapped(4, 4), [0, 1, 0, 255]);
        assert_eq!(PixelBuffer::new(0, 0).pixel_wrapped(1, 1), TRANSPARENT);
    }

    #[test]
    fn test_blit_clips_to_destination() {
        let mut canvas = PixelBuffer::new(4, 4);
        let patch = PixelBuffer::filled(3, 3, [7, 7, 7, 255]);
        canvas.blit(&patch, 2, 2);
        assert_eq!(canvas.pixel(2, 2), Some([7, 7, 7, 255]));
        assert_eq!(canvas.pixel(3, 3), Some([7, 7, 7, 255]));
        assert_eq!(canvas.pixel(1, 1), Some(TRANSPARENT));
        assert!(canvas.is_well_formed());
    }

    // Tests that box downsampling averages whole blocks
    #[test]
    fn test_downsample_box_averages() {
        let mut buffer = PixelBuffer::new(2, 2);
        buffer.set_pixel(0, 0, [0, 0, 0, 255]);
        buffer.set_pixel(1, 0, [100, 0, 0, 255]);
        buffer.set_pixel(0, 1, [0, 100, 0, 255]);
        buffer.set_pixel(1, 1, [100, 100, 0, 255]);
        let small = buffer.downsample_box(1, 1);
        assert_eq!(small.pixel(0, 0), Some([50, 50, 0, 255]));
    }

    #[test]
    fn test_resize_nearest_dimensions() {
        let buffer = gradient(4, 4);
        let larger = buffer.resize_nearest(8, 8);
        assert_eq!((larger.width(), larger.height()), (8, 8));
        assert_eq!(larger.pixel(7, 7), buffer.pixel(3, 3));
        assert_eq!(buffer.downsample_box(8, 8), larger);
    }

    // Tests that a wrapped offset moves pixels and wraps them around
    #[test]
    fn test_offset_wrapped() {
        let buffer = gradient(4, 4);
        let shifted = buffer.offset_wrapped(1, 2);
        assert_eq!(shifted.pixel(1, 2), buffer.pixel(0, 0));
        assert_eq!(shifted.pixel(0, 0), buffer.pixel(3, 2));
        assert_eq!(shifted.offset_wrapped(-1, -2), buffer);
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = PixelBuffer::new(0, 5);
        assert!(buffer.is_empty());
        assert_eq!(buffer.channels(), 4);
        assert!(buffer.into_raw().is_empty());
    }

    #[test]
    fn test_point_helpers() {
        let p = Point::new(1.0, 2.0).translated(3.0, 2.0);
        assert_eq!(p, Point::new(4.0, 4.0));
        assert!((Point::default().distance(Point::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
    }
}

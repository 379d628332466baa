//! Tests for Douglas-Peucker simplification

#[cfg(test)]
mod tests {
    use seamtile::analysis::simplify::{
        point_to_segment_distance, signed_area, simplify_closed, simplify_polyline,
    };
    use seamtile::spatial::buffer::Point;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_segment_distance() {
        let a = p(0.0, 0.0);
        let b = p(10.0, 0.0);
        assert!((point_to_segment_distance(p(5.0, 3.0), a, b) - 3.0).abs() < 1e-12);
        // Beyond the end the distance is to the endpoint
        assert!((point_to_segment_distance(p(13.0, 4.0), a, b) - 5.0).abs() < 1e-12);
        // Degenerate segment
        assert!((point_to_segment_distance(p(3.0, 4.0), a, a) - 5.0).abs() < 1e-12);
    }

    // Tests that collinear interior points are removed and endpoints kept
    // Verified by comparing with >= instead of > against the tolerance
    #[test]
    fn test_polyline_drops_collinear_points() {
        let line: Vec<Point> = (0..10).map(|i| p(f64::from(i), 0.0)).collect();
        assert_eq!(simplify_polyline(&line, 0.5), vec![p(0.0, 0.0), p(9.0, 0.0)]);
    }

    #[test]
    fn test_polyline_keeps_significant_corner() {
        let bent = [p(0.0, 0.0), p(5.0, 0.1), p(10.0, 0.0), p(10.0, 10.0)];
        let simplified = simplify_polyline(&bent, 1.0);
        assert_eq!(simplified, vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)]);
    }

    #[test]
    fn test_polyline_passthrough_cases() {
        let short = [p(0.0, 0.0), p(1.0, 1.0)];
        assert_eq!(simplify_polyline(&short, 1.0), short.to_vec());
        let three = [p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)];
        assert_eq!(simplify_polyline(&three, 0.0), three.to_vec());
    }

    // Tests that a densely sampled square ring collapses to its corners
    #[test]
    fn test_closed_ring_reduces_to_corners() {
        let mut ring = Vec::new();
        for x in 0..4 {
            ring.push(p(f64::from(x), 0.0));
        }
        for y in 0..4 {
            ring.push(p(4.0, f64::from(y)));
        }
        for x in (1..=4).rev() {
            ring.push(p(f64::from(x), 4.0));
        }
        for y in (1..=4).rev() {
            ring.push(p(0.0, f64::from(y)));
        }
        let simplified = simplify_closed(&ring, 0.5);
        assert_eq!(simplified.len(), 4);
        for corner in [p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)] {
            assert!(simplified.contains(&corner), "missing corner {corner:?}");
        }
        assert!((signed_area(&simplified).abs() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_closed_ring_never_collapses() {
        let thin = [p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(1.0, 0.01)];
        let simplified = simplify_closed(&thin, 5.0);
        assert!(simplified.len() >= 3);
    }

    #[test]
    fn test_signed_area_orientation() {
        let clockwise = [p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0)];
        assert!((signed_area(&clockwise) - 4.0).abs() < 1e-12);
        let counter: Vec<Point> = clockwise.iter().rev().copied().collect();
        assert!((signed_area(&counter) + 4.0).abs() < 1e-12);
        assert!(signed_area(&clockwise[..2]).abs() < f64::EPSILON);
    }
}

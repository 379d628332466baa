//! Tests for colour distance, blending and Lab conversion

#[cfg(test)]
mod tests {
    use seamtile::math::color::{
        MAX_RGB_DISTANCE, delta_e, lerp_rgb, midpoint_rgb, opaque, rgb_distance, rgb_of, to_lab,
    };

    #[test]
    fn test_rgb_distance_extremes() {
        assert!(rgb_distance([10, 20, 30], [10, 20, 30]).abs() < f64::EPSILON);
        let max = rgb_distance([0, 0, 0], [255, 255, 255]);
        assert!((max - MAX_RGB_DISTANCE).abs() < 1e-9);
        assert!((rgb_distance([0, 0, 0], [3, 4, 0]) - 5.0).abs() < 1e-12);
    }

    // Tests interpolation endpoints and clamping of t
    // Verified by removing the clamp in lerp_rgb
    #[test]
    fn test_lerp_endpoints_and_clamp() {
        let a = [0, 100, 200];
        let b = [200, 100, 0];
        assert_eq!(lerp_rgb(a, b, 0.0), a);
        assert_eq!(lerp_rgb(a, b, 1.0), b);
        assert_eq!(lerp_rgb(a, b, -3.0), a);
        assert_eq!(lerp_rgb(a, b, 7.0), b);
        assert_eq!(midpoint_rgb(a, b), [100, 100, 100]);
    }

    #[test]
    fn test_alpha_helpers() {
        assert_eq!(opaque([1, 2, 3]), [1, 2, 3, 255]);
        assert_eq!(rgb_of([9, 8, 7, 0]), [9, 8, 7]);
    }

    // Tests Lab reference points for white and black
    #[test]
    fn test_lab_reference_points() {
        let white = to_lab([255, 255, 255]);
        assert!((white.l - 100.0).abs() < 0.01);
        assert!(white.a.abs() < 0.01);
        assert!(white.b.abs() < 0.01);

        let black = to_lab([0, 0, 0]);
        assert!(black.l.abs() < 0.01);
    }

    #[test]
    fn test_delta_e_properties() {
        assert!(delta_e([40, 80, 120], [40, 80, 120]).abs() < 1e-9);
        let forward = delta_e([255, 0, 0], [0, 0, 255]);
        let backward = delta_e([0, 0, 255], [255, 0, 0]);
        assert!((forward - backward).abs() < 1e-9);
        assert!(delta_e([0, 0, 0], [255, 255, 255]) > 99.0);
    }
}

//! Tests for seeded random streams

#[cfg(test)]
mod tests {
    use seamtile::math::random::{SeededRng, derive_seed, stream};

    // Tests that equal seeds replay identical streams
    // Verified by seeding ChaCha8 from the system clock
    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        for _ in 0..32 {
            assert_eq!(a.byte(), b.byte());
        }
        assert!((a.unit() - b.unit()).abs() < f64::EPSILON);
    }

    // Tests that purpose tags separate streams drawn from one seed
    // Verified by ignoring the purpose in derive_seed
    #[test]
    fn test_derived_streams_differ_by_purpose() {
        let mut noise = SeededRng::derived(7, stream::NOISE_PHASE);
        let mut layout = SeededRng::derived(7, stream::LAYOUT);
        let noise_bytes: Vec<u8> = (0..16).map(|_| noise.byte()).collect();
        let layout_bytes: Vec<u8> = (0..16).map(|_| layout.byte()).collect();
        assert_ne!(noise_bytes, layout_bytes);
        assert_ne!(
            derive_seed(7, stream::NOISE_PHASE),
            derive_seed(7, stream::LAYOUT)
        );
    }

    // Tests degenerate ranges return their lower bound instead of panicking
    #[test]
    fn test_empty_ranges() {
        let mut rng = SeededRng::new(1);
        assert_eq!(rng.index(0), 0);
        assert!((rng.range_f64(3.0, 3.0) - 3.0).abs() < f64::EPSILON);
        assert!((rng.range_f64(5.0, 2.0) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_values_stay_in_range() {
        let mut rng = SeededRng::new(-9);
        for _ in 0..200 {
            let unit = rng.unit();
            assert!((0.0..1.0).contains(&unit));
            assert!(rng.index(5) < 5);
            let ranged = rng.range_f64(-2.0, 2.0);
            assert!((-2.0..2.0).contains(&ranged));
        }
    }

    // Tests that a shuffle is a permutation and is reproducible
    #[test]
    fn test_shuffle_is_deterministic_permutation() {
        let mut first: Vec<usize> = (0..20).collect();
        let mut second = first.clone();
        SeededRng::new(3).shuffle(&mut first);
        SeededRng::new(3).shuffle(&mut second);
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }
}

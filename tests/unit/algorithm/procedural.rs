//! Tests for procedural noise tiles

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use seamtile::GenerationError;
    use seamtile::algorithm::procedural::{DEFAULT_RAMP, ProceduralParams, colorize, generate_procedural};
    use seamtile::math::color::opaque;
    use seamtile::math::noise::{FractalParams, NoiseKind};

    fn params(kind: NoiseKind, layers: usize) -> ProceduralParams {
        ProceduralParams {
            kind,
            fractal: FractalParams {
                scale: 0.1,
                octaves: 3,
                persistence: 0.5,
                lacunarity: 2.0,
            },
            tile_size: 32,
            seed: 42,
            layers,
            continuity: 0.8,
        }
    }

    #[test]
    fn test_colorize_hits_ramp_stops() {
        let field = Array2::from_shape_vec((1, 3), vec![0.0, 0.5, 1.0]).unwrap_or_default();
        let image = colorize(&field, &DEFAULT_RAMP);
        assert_eq!(image.pixel(0, 0), Some(opaque(DEFAULT_RAMP[0])));
        assert_eq!(image.pixel(1, 0), Some(opaque(DEFAULT_RAMP[2])));
        assert_eq!(image.pixel(2, 0), Some(opaque(DEFAULT_RAMP[4])));
    }

    #[test]
    fn test_colorize_clamps_out_of_range() {
        let field = Array2::from_shape_vec((1, 2), vec![-3.0, 7.0]).unwrap_or_default();
        let image = colorize(&field, &DEFAULT_RAMP);
        assert_eq!(image.pixel(0, 0), Some(opaque(DEFAULT_RAMP[0])));
        assert_eq!(image.pixel(1, 0), Some(opaque(DEFAULT_RAMP[4])));
    }

    // Tests one tile per parallax layer, each with distinct content
    // Verified by reusing the base seed for every layer
    #[test]
    fn test_one_tile_per_layer() {
        let Ok(set) = generate_procedural(&params(NoiseKind::Perlin, 3)) else {
            panic!("generation failed");
        };
        assert_eq!(set.len(), 3);
        assert_eq!(set.tile_size(), 32);
        assert!(set.is_valid());
        assert!(!set.is_wang());
        assert_ne!(set.tile(0), set.tile(1));
        assert_ne!(set.tile(1), set.tile(2));
    }

    #[test]
    fn test_every_kind_generates() {
        for kind in [NoiseKind::Perlin, NoiseKind::Simplex, NoiseKind::Worley] {
            let first = generate_procedural(&params(kind, 1));
            assert!(first.is_ok(), "{kind:?} failed");
            assert_eq!(first.ok(), generate_procedural(&params(kind, 1)).ok());
        }
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let zero_size = ProceduralParams {
            tile_size: 0,
            ..params(NoiseKind::Perlin, 1)
        };
        assert!(matches!(
            generate_procedural(&zero_size),
            Err(GenerationError::InvalidParameter {
                parameter: "tile_size",
                ..
            })
        ));
        assert!(matches!(
            generate_procedural(&params(NoiseKind::Perlin, 0)),
            Err(GenerationError::InvalidParameter {
                parameter: "parallax_layers",
                ..
            })
        ));

        let mut bad_octaves = params(NoiseKind::Simplex, 1);
        bad_octaves.fractal.octaves = 0;
        assert!(generate_procedural(&bad_octaves).is_err());
    }
}

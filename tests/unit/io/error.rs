//! Tests for error types including source chaining, message formatting and taxonomy

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::path::PathBuf;

    use seamtile::GenerationError;
    use seamtile::io::error::{WithStage, file_system, generation_failure, invalid_parameter, validation_failure};

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = file_system("/tmp/preset.json", "read preset", io_error);
        assert!(error.source().is_some());
        assert!(generation_failure("wang", &"empty").source().is_none());
    }

    // Tests InvalidParameter error contains all fields
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let error = invalid_parameter("tileSize", &-1, &"must be positive");
        let message = error.to_string();
        assert!(message.contains("tileSize"));
        assert!(message.contains("-1"));
        assert!(message.contains("must be positive"));
    }

    #[test]
    fn test_layout_error_messages() {
        let unsatisfiable = GenerationError::LayoutUnsatisfiable {
            grid_dimensions: (10, 20),
            nodes_expanded: 42,
        };
        let message = unsatisfiable.to_string();
        assert!(message.contains("10x20"));
        assert!(message.contains("42 nodes"));

        let exhausted = GenerationError::SearchBudgetExhausted {
            budget: 500,
            deepest_cell: 17,
        };
        assert!(exhausted.to_string().contains("budget of 500"));
    }

    // Tests ImageExport error with IO source
    // Verified by excluding source error from message
    #[test]
    fn test_image_export_error() {
        let image_error = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "access denied",
        ));
        let error = GenerationError::ImageExport {
            path: PathBuf::from("/readonly/tile.png"),
            source: image_error,
        };
        let message = error.to_string();
        assert!(message.contains("/readonly/tile.png"));
        assert!(message.contains("access denied"));
        assert!(error.source().is_some());
    }

    // Tests that every variant maps onto the audit taxonomy
    #[test]
    fn test_kind_taxonomy() {
        let export = GenerationError::ExportFailure {
            path: PathBuf::from("out"),
            reason: "no tiles".to_string(),
        };
        let cases = [
            (invalid_parameter("seed", &0, &"bad"), "InvalidParameter"),
            (generation_failure("procedural", &"bad"), "GenerationFailure"),
            (validation_failure(&"bad"), "ValidationFailure"),
            (
                GenerationError::SearchBudgetExhausted {
                    budget: 1,
                    deepest_cell: 0,
                },
                "GenerationFailure",
            ),
            (export, "ExportFailure"),
            (
                file_system("x", "write", std::io::Error::other("disk full")),
                "ExportFailure",
            ),
        ];
        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "{error}");
        }
    }

    #[test]
    fn test_with_stage_rewrites_generation_failures_only() {
        let failed: Result<(), GenerationError> = Err(generation_failure("noise", &"nan"));
        assert!(matches!(
            failed.with_stage("procedural"),
            Err(GenerationError::GenerationFailure {
                stage: "procedural",
                ..
            })
        ));

        let invalid: Result<(), GenerationError> = Err(invalid_parameter("octaves", &0, &"bad"));
        assert!(matches!(
            invalid.with_stage("procedural"),
            Err(GenerationError::InvalidParameter {
                parameter: "octaves",
                ..
            })
        ));
    }

    #[test]
    fn test_io_error_conversion() {
        let error: GenerationError = std::io::Error::other("broken pipe").into();
        assert!(matches!(error, GenerationError::FileSystem { operation: "unknown", .. }));
    }
}

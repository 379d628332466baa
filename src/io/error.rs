//! Error types and context management for generation operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all generation operations
#[derive(Debug)]
pub enum GenerationError {
    /// Settings or call arguments failed range validation
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// An algorithm produced empty or malformed output
    GenerationFailure {
        /// Pipeline stage that failed
        stage: &'static str,
        /// Description of the failure
        reason: String,
    },

    /// Output was produced but failed post-generation checks
    ValidationFailure {
        /// Description of the failed check
        reason: String,
    },

    /// Backtracking exhausted every assignment without satisfying all edges
    LayoutUnsatisfiable {
        /// Requested grid dimensions (width, height)
        grid_dimensions: (usize, usize),
        /// Number of search nodes expanded before giving up
        nodes_expanded: u64,
    },

    /// Layout search exceeded its node budget
    SearchBudgetExhausted {
        /// Budget that was exceeded
        budget: u64,
        /// Cells assigned at the deepest point of the search
        deepest_cell: usize,
    },

    /// Failed to load a source image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a generated image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// Export could not be performed for a reason other than image encoding
    ExportFailure {
        /// Target of the export
        path: PathBuf,
        /// Description of the failure
        reason: String,
    },

    /// JSON (de)serialization failure
    Serialization {
        /// Path of the document involved
        path: PathBuf,
        /// Underlying serde error
        source: serde_json::Error,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl GenerationError {
    /// Short taxonomy tag used in audit records
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "InvalidParameter",
            Self::GenerationFailure { .. }
            | Self::LayoutUnsatisfiable { .. }
            | Self::SearchBudgetExhausted { .. } => "GenerationFailure",
            Self::ValidationFailure { .. } => "ValidationFailure",
            Self::ImageLoad { .. } => "ImageLoad",
            Self::ImageExport { .. }
            | Self::ExportFailure { .. }
            | Self::Serialization { .. }
            | Self::FileSystem { .. } => "ExportFailure",
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::GenerationFailure { stage, reason } => {
                write!(f, "Generation failed during {stage}: {reason}")
            }
            Self::ValidationFailure { reason } => {
                write!(f, "Generated output failed validation: {reason}")
            }
            Self::LayoutUnsatisfiable {
                grid_dimensions,
                nodes_expanded,
            } => {
                write!(
                    f,
                    "No edge-consistent layout exists for a {}x{} grid ({nodes_expanded} nodes expanded)",
                    grid_dimensions.0, grid_dimensions.1
                )
            }
            Self::SearchBudgetExhausted {
                budget,
                deepest_cell,
            } => {
                write!(
                    f,
                    "Layout search exceeded its budget of {budget} nodes (deepest cell {deepest_cell})"
                )
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::ExportFailure { path, reason } => {
                write!(f, "Export to '{}' failed: {reason}", path.display())
            }
            Self::Serialization { path, source } => {
                write!(f, "JSON error for '{}': {source}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for generation results
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Attaches the failing pipeline stage to errors that lack one
pub trait WithStage<T> {
    /// Rewrite a bare failure so it names the stage it came from
    ///
    /// # Errors
    ///
    /// Propagates the original error, with `GenerationFailure` stages replaced
    fn with_stage(self, stage: &'static str) -> Result<T>;
}

impl<T> WithStage<T> for Result<T> {
    fn with_stage(self, stage: &'static str) -> Self {
        self.map_err(|error| match error {
            GenerationError::GenerationFailure { reason, .. } => {
                GenerationError::GenerationFailure { stage, reason }
            }
            other => other,
        })
    }
}

impl From<std::io::Error> for GenerationError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> GenerationError {
    GenerationError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a generation failure error
pub fn generation_failure(stage: &'static str, reason: &impl ToString) -> GenerationError {
    GenerationError::GenerationFailure {
        stage,
        reason: reason.to_string(),
    }
}

/// Create a validation failure error
pub fn validation_failure(reason: &impl ToString) -> GenerationError {
    GenerationError::ValidationFailure {
        reason: reason.to_string(),
    }
}

/// Create a file system error bound to a path
pub fn file_system(
    path: impl Into<PathBuf>,
    operation: &'static str,
    source: std::io::Error,
) -> GenerationError {
    GenerationError::FileSystem {
        path: path.into(),
        operation,
        source,
    }
}

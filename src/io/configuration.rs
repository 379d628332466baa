//! Generation constants and runtime configuration defaults

use std::collections::BTreeMap;

// Settings validation thresholds shared with existing presets
/// Largest accepted tile edge in pixels
pub const MAX_TILE_SIZE: i32 = 4096;
/// Smallest accepted octave count
pub const MIN_OCTAVES: i32 = 1;
/// Largest accepted octave count
pub const MAX_OCTAVES: i32 = 8;
/// Largest palette size a settings record may request
pub const MAX_PALETTE_COLORS: i32 = 256;
/// Largest Wang tile set the synthesizer will build
pub const MAX_WANG_TILES: i32 = 16;
/// Smallest Wang tile edge whose shared borders stay within the edge tolerance
pub const MIN_WANG_TILE_SIZE: i32 = 16;

// Legacy (schema 0) presets are clamped into this tile size window
/// Lower tile size bound applied while migrating legacy presets
pub const LEGACY_MIN_TILE_SIZE: i32 = 256;
/// Upper tile size bound applied while migrating legacy presets
pub const LEGACY_MAX_TILE_SIZE: i32 = 2048;

/// Newest settings schema understood by this crate
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

// Wang tile synthesis
/// Number of distinct edge classes
pub const EDGE_CLASS_COUNT: usize = 4;
/// Width of the edge blend band as a fraction of the tile size
pub const EDGE_BAND_FRACTION: f64 = 0.1;
/// Mean RGB distance below which two edges count as compatible
pub const EDGE_COMPATIBILITY_TOLERANCE: f64 = 30.0;
/// Boundary pixels compared per edge check
pub const EDGE_SAMPLE_COUNT: usize = 32;
/// Fraction of edge checks that must pass for a tile set to have valid borders
pub const BORDER_CONSISTENCY_THRESHOLD: f64 = 0.8;

// Geometrization
/// Margin (fraction of resolution) inside which polygon points are wrapped
pub const TILING_MARGIN_FRACTION: f64 = 0.1;

// Output settings
/// Edge length of the exported thumbnail
pub const THUMBNAIL_SIZE: usize = 256;
/// Columns in the in-memory preview composite
pub const PREVIEW_COLUMNS: usize = 3;
/// Rows in the in-memory preview composite
pub const PREVIEW_ROWS: usize = 3;
/// Edge length each preview cell is scaled to
pub const PREVIEW_CELL_SIZE: usize = 64;

// Audit logging
/// Completed operation records retained in memory
pub const MAX_AUDIT_RECORDS: usize = 1024;
/// Operation id prefix for background generation
pub const BACKGROUND_OPERATION_PREFIX: &str = "BG";

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: i64 = 12345;
/// Default node budget for the layout solver
pub const DEFAULT_SEARCH_BUDGET: u64 = 200_000;
/// Default number of Wang tiles
pub const DEFAULT_WANG_TILE_COUNT: i32 = 8;

/// Tunables handed to the generator at construction
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Mean RGB distance below which two edges count as compatible
    pub edge_tolerance: f64,
    /// Fraction of edge checks that must pass
    pub border_consistency_threshold: f64,
    /// Edge length of the exported thumbnail
    pub thumbnail_size: usize,
    /// Preview composite dimensions (columns, rows)
    pub preview_grid: (usize, usize),
    /// Edge length of one preview cell
    pub preview_cell_size: usize,
    /// Completed operation records kept by the audit log
    pub audit_capacity: usize,
    /// Host compatibility block copied verbatim into exported presets
    pub compatibility: BTreeMap<String, String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            edge_tolerance: EDGE_COMPATIBILITY_TOLERANCE,
            border_consistency_threshold: BORDER_CONSISTENCY_THRESHOLD,
            thumbnail_size: THUMBNAIL_SIZE,
            preview_grid: (PREVIEW_COLUMNS, PREVIEW_ROWS),
            preview_cell_size: PREVIEW_CELL_SIZE,
            audit_capacity: MAX_AUDIT_RECORDS,
            compatibility: BTreeMap::new(),
        }
    }
}

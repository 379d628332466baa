//! Versioned generation settings
//!
//! Settings persist as camelCase JSON. Records carry a schema version; older records
//! are migrated forward one step at a time and never downgraded. Validation is all or
//! nothing: the first out-of-range field rejects the whole record.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::io::configuration::{
    CURRENT_SCHEMA_VERSION, DEFAULT_SEARCH_BUDGET, DEFAULT_SEED, DEFAULT_WANG_TILE_COUNT,
    LEGACY_MAX_TILE_SIZE, LEGACY_MIN_TILE_SIZE, MAX_OCTAVES, MAX_PALETTE_COLORS, MAX_TILE_SIZE,
    MAX_WANG_TILES, MIN_OCTAVES, MIN_WANG_TILE_SIZE,
};
use crate::io::error::{GenerationError, Result, file_system, invalid_parameter};
use crate::math::noise::{FractalParams, MAX_OCTAVE_FREQUENCY, NoiseKind};

/// Which pipeline `generate` runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GenerationMode {
    /// Fractal noise mapped through a colour ramp
    #[default]
    Procedural,
    /// Edge-compatible Wang tile set
    WangTiles,
    /// Flat-colour polygons traced from a source image
    Geometrization,
    /// Source image blended into a seamless tile
    SeamlessFromImage,
    /// Patch quilting from a source sample
    TextureSynthesis,
}

impl GenerationMode {
    /// Name used in presets and audit records
    pub const fn name(self) -> &'static str {
        match self {
            Self::Procedural => "Procedural",
            Self::WangTiles => "WangTiles",
            Self::Geometrization => "Geometrization",
            Self::SeamlessFromImage => "SeamlessFromImage",
            Self::TextureSynthesis => "TextureSynthesis",
        }
    }

    /// True for modes that read a source image
    pub const fn needs_source_image(self) -> bool {
        matches!(
            self,
            Self::Geometrization | Self::SeamlessFromImage | Self::TextureSynthesis
        )
    }
}

/// Complete parameter record for one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationSettings {
    /// Pipeline to run
    pub mode: GenerationMode,
    /// Tile edge length in pixels
    pub tile_size: i32,
    /// Seed for every random stream
    pub seed: i64,
    /// Noise base function
    pub noise_kind: NoiseKind,
    /// Base noise frequency in lattice cells per pixel
    pub noise_scale: f64,
    /// Noise octave count
    pub octaves: i32,
    /// Amplitude multiplier per octave
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// Seam blend taper
    pub continuity: f64,
    /// Spread of Wang base colours
    pub variety: f64,
    /// Palette merge tolerance as a fraction of the maximum RGB distance
    pub color_tolerance: f64,
    /// Palette size cap for geometrization
    pub max_colors: i32,
    /// Polygon simplification tolerance in pixels
    pub simplification_tolerance: f64,
    /// Output resolution for geometrization
    pub target_resolution: i32,
    /// Mirror near-edge regions during geometrization
    pub optimize_for_tiling: bool,
    /// Schema version this record conforms to; absent means legacy (0)
    #[serde(default)]
    pub schema_version: u32,
    /// Source image for image-driven modes
    pub source_image_path: Option<PathBuf>,
    /// Procedural parallax layers
    pub parallax_layers: u32,
    /// Number of Wang tiles to synthesize
    pub wang_tile_count: i32,
    /// Node budget for the layout solver
    pub search_budget: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Procedural,
            tile_size: 1024,
            seed: DEFAULT_SEED,
            noise_kind: NoiseKind::Perlin,
            noise_scale: 0.1,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            continuity: 0.8,
            variety: 0.5,
            color_tolerance: 0.15,
            max_colors: 16,
            simplification_tolerance: 1.0,
            target_resolution: 512,
            optimize_for_tiling: true,
            schema_version: CURRENT_SCHEMA_VERSION,
            source_image_path: None,
            parallax_layers: 1,
            wang_tile_count: DEFAULT_WANG_TILE_COUNT,
            search_budget: DEFAULT_SEARCH_BUDGET,
        }
    }
}

impl GenerationSettings {
    /// Noise octave parameters
    pub fn fractal_params(&self) -> FractalParams {
        FractalParams {
            scale: self.noise_scale,
            octaves: self.octaves.max(0).unsigned_abs(),
            persistence: self.persistence,
            lacunarity: self.lacunarity,
        }
    }

    /// Tile size in pixels; 0 for a non-positive setting
    pub fn tile_size_px(&self) -> usize {
        usize::try_from(self.tile_size).unwrap_or(0)
    }

    /// Stable digest of the settings that define an artifact
    ///
    /// FNV-1a 64 over `mode|seed|tileSize|noiseScale|octaves`, as 16 hex digits.
    pub fn content_hash(&self) -> String {
        let key = format!(
            "{}|{}|{}|{}|{}",
            self.mode.name(),
            self.seed,
            self.tile_size,
            self.noise_scale,
            self.octaves
        );
        format!("{:016x}", fnv1a_64(key.as_bytes()))
    }
}

/// FNV-1a 64-bit hash
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    bytes.iter().fold(OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(PRIME)
    })
}

fn in_unit_interval(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

fn positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Report the first field that is out of range
///
/// # Errors
///
/// Returns `InvalidParameter` naming the failing field.
pub fn check(settings: &GenerationSettings) -> Result<()> {
    let s = settings;
    if s.tile_size <= 0 || s.tile_size > MAX_TILE_SIZE {
        return Err(invalid_parameter("tileSize", &s.tile_size, &format!("must be in (0, {MAX_TILE_SIZE}]")));
    }
    if s.mode == GenerationMode::WangTiles && s.tile_size < MIN_WANG_TILE_SIZE {
        return Err(invalid_parameter(
            "tileSize",
            &s.tile_size,
            &format!("Wang tiles need at least {MIN_WANG_TILE_SIZE} pixels per edge"),
        ));
    }
    if !in_unit_interval(s.continuity) {
        return Err(invalid_parameter("continuity", &s.continuity, &"must be in [0, 1]"));
    }
    if !in_unit_interval(s.variety) {
        return Err(invalid_parameter("variety", &s.variety, &"must be in [0, 1]"));
    }
    if !(MIN_OCTAVES..=MAX_OCTAVES).contains(&s.octaves) {
        return Err(invalid_parameter(
            "octaves",
            &s.octaves,
            &format!("must be in [{MIN_OCTAVES}, {MAX_OCTAVES}]"),
        ));
    }
    if !positive_finite(s.noise_scale) {
        return Err(invalid_parameter("noiseScale", &s.noise_scale, &"must be a positive finite number"));
    }
    if !positive_finite(s.persistence) {
        return Err(invalid_parameter("persistence", &s.persistence, &"must be a positive finite number"));
    }
    if !positive_finite(s.lacunarity) {
        return Err(invalid_parameter("lacunarity", &s.lacunarity, &"must be a positive finite number"));
    }
    if !(1..=MAX_PALETTE_COLORS).contains(&s.max_colors) {
        return Err(invalid_parameter(
            "maxColors",
            &s.max_colors,
            &format!("must be in [1, {MAX_PALETTE_COLORS}]"),
        ));
    }
    if s.target_resolution <= 0 || s.target_resolution > MAX_TILE_SIZE {
        return Err(invalid_parameter(
            "targetResolution",
            &s.target_resolution,
            &format!("must be in (0, {MAX_TILE_SIZE}]"),
        ));
    }
    if !(1..=MAX_WANG_TILES).contains(&s.wang_tile_count) {
        return Err(invalid_parameter(
            "wangTileCount",
            &s.wang_tile_count,
            &format!("must be in [1, {MAX_WANG_TILES}]"),
        ));
    }
    if s.search_budget == 0 {
        return Err(invalid_parameter("searchBudget", &s.search_budget, &"must be positive"));
    }
    if s.parallax_layers == 0 {
        return Err(invalid_parameter("parallaxLayers", &s.parallax_layers, &"at least one layer is required"));
    }
    check_octave_range(s)?;
    if !(s.color_tolerance.is_finite() && s.color_tolerance >= 0.0) {
        return Err(invalid_parameter("colorTolerance", &s.color_tolerance, &"must be a finite non-negative number"));
    }
    if !(s.simplification_tolerance.is_finite() && s.simplification_tolerance >= 0.0) {
        return Err(invalid_parameter(
            "simplificationTolerance",
            &s.simplification_tolerance,
            &"must be a finite non-negative number",
        ));
    }
    Ok(())
}

// The deepest parallax layer runs every octave at `scale * lacunarity^(layers - 1)`
fn check_octave_range(s: &GenerationSettings) -> Result<()> {
    let fractal = s.fractal_params();
    let layer_exponent = s.parallax_layers.saturating_sub(1).min(i32::MAX as u32) as i32;
    let peak = fractal.peak_frequency() * s.lacunarity.powi(layer_exponent).max(1.0);
    if !(peak.is_finite() && peak <= MAX_OCTAVE_FREQUENCY) {
        let parameter = if s.noise_scale > MAX_OCTAVE_FREQUENCY { "noiseScale" } else { "lacunarity" };
        return Err(invalid_parameter(
            parameter,
            &peak,
            &format!("octave frequency must stay within {MAX_OCTAVE_FREQUENCY} cells per pixel"),
        ));
    }
    if !fractal.amplitude_total().is_finite() {
        return Err(invalid_parameter("persistence", &s.persistence, &"octave amplitudes overflow"));
    }
    Ok(())
}

/// True when every field is in range
pub fn validate(settings: &GenerationSettings) -> bool {
    check(settings).is_ok()
}

/// True when the record is at the newest schema version
pub const fn is_current(settings: &GenerationSettings) -> bool {
    settings.schema_version == CURRENT_SCHEMA_VERSION
}

/// Migrate `settings` forward from schema `from` to schema `to`
///
/// Steps already applied (per the record's own `schema_version`) are skipped, so
/// migrating an already-migrated record is a no-op apart from the version stamp.
///
/// # Errors
///
/// Returns `InvalidParameter` when `from > to`, when the record is already newer than
/// `to`, or when `to` is newer than this crate knows.
pub fn migrate(settings: &GenerationSettings, from: u32, to: u32) -> Result<GenerationSettings> {
    if from > to {
        return Err(invalid_parameter(
            "schemaVersion",
            &format!("{from} -> {to}"),
            &"settings cannot be downgraded",
        ));
    }
    if to > CURRENT_SCHEMA_VERSION {
        return Err(invalid_parameter(
            "schemaVersion",
            &to,
            &format!("newest known schema is {CURRENT_SCHEMA_VERSION}"),
        ));
    }

    if settings.schema_version > to {
        return Err(invalid_parameter(
            "schemaVersion",
            &format!("{} -> {to}", settings.schema_version),
            &"record is already newer than the target schema",
        ));
    }

    let mut migrated = settings.clone();
    let start = from.max(settings.schema_version);
    for version in start..to {
        match version {
            0 => migrate_legacy(&mut migrated),
            1 => {
                migrated.wang_tile_count = DEFAULT_WANG_TILE_COUNT;
                migrated.search_budget = DEFAULT_SEARCH_BUDGET;
            }
            _ => {}
        }
        debug!(from = version, to = version + 1, "Migrated settings schema");
    }
    migrated.schema_version = to;
    Ok(migrated)
}

fn migrate_legacy(settings: &mut GenerationSettings) {
    let defaults = GenerationSettings::default();
    settings.noise_kind = defaults.noise_kind;
    settings.noise_scale = defaults.noise_scale;
    settings.octaves = defaults.octaves;
    settings.persistence = defaults.persistence;
    settings.lacunarity = defaults.lacunarity;
    settings.color_tolerance = defaults.color_tolerance;
    settings.max_colors = defaults.max_colors;
    settings.simplification_tolerance = defaults.simplification_tolerance;
    settings.target_resolution = defaults.target_resolution;
    settings.optimize_for_tiling = defaults.optimize_for_tiling;

    settings.tile_size = settings.tile_size.clamp(LEGACY_MIN_TILE_SIZE, LEGACY_MAX_TILE_SIZE);
    settings.continuity = clamp_unit(settings.continuity);
    settings.variety = clamp_unit(settings.variety);
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Load settings from a preset bundle or a bare settings document
///
/// Accepts either an exported `preset.json` (settings under a `settings` key) or a
/// settings record on its own. Legacy records are migrated before validation.
///
/// # Errors
///
/// Returns `FileSystem` or `Serialization` errors for unreadable documents and
/// `InvalidParameter` when the migrated record fails validation.
pub fn load_preset(path: &Path) -> Result<GenerationSettings> {
    let text = fs::read_to_string(path).map_err(|source| file_system(path, "read preset", source))?;
    let document: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| GenerationError::Serialization {
            path: path.to_path_buf(),
            source,
        })?;
    let record = document.get("settings").cloned().unwrap_or(document);
    let settings: GenerationSettings =
        serde_json::from_value(record).map_err(|source| GenerationError::Serialization {
            path: path.to_path_buf(),
            source,
        })?;

    let migrated = migrate(&settings, settings.schema_version, CURRENT_SCHEMA_VERSION)?;
    check(&migrated)?;
    info!(path = %path.display(), hash = %migrated.content_hash(), "Loaded preset");
    Ok(migrated)
}

/// Write settings as pretty JSON
///
/// # Errors
///
/// Returns `Serialization` or `FileSystem` errors on failure.
pub fn save_settings(settings: &GenerationSettings, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(settings).map_err(|source| GenerationError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| file_system(path, "write settings", source))
}

//! Generation orchestrator
//!
//! `BackgroundGenerator` owns the active settings, the current tile set and the last
//! valid tile set. Every public operation is audited. Failures never escape
//! [`BackgroundGenerator::generate`]: they produce an empty tile set, leave the last
//! valid state untouched and are recorded in the audit log.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::algorithm::geometrize::{GeometrizeParams, Geometrizer};
use crate::algorithm::layout::WangLayoutSolver;
use crate::algorithm::procedural::{ProceduralParams, generate_procedural};
use crate::algorithm::quilting::{QuiltingParams, synthesize_texture};
use crate::algorithm::seamless::seamless_tile;
use crate::algorithm::synthesis::WangTileSynthesizer;
use crate::analysis::quality::{WangValidation, set_quality, validate_wang_borders};
use crate::io::audit::{Clock, IntegrityLog, SystemClock};
use crate::io::configuration::{
    BACKGROUND_OPERATION_PREFIX, CURRENT_SCHEMA_VERSION, EDGE_SAMPLE_COUNT, GeneratorConfig,
};
use crate::io::error::{GenerationError, Result, WithStage, generation_failure, validation_failure};
use crate::io::export::{ExportManifest, export_bundle};
use crate::io::image::load_image;
use crate::io::settings::{self, GenerationMode, GenerationSettings};
use crate::spatial::buffer::PixelBuffer;
use crate::spatial::grid::LayoutGrid;
use crate::spatial::tiles::TileSet;

/// Where the most recent generation got to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    /// No generation has run
    Idle,
    /// Checking settings
    Validating,
    /// Running the mode pipeline
    Generating,
    /// Checking the produced tile set
    ValidatingOutput,
    /// Output accepted as the new last valid state
    Committed,
    /// Output rejected, last valid state kept
    RolledBack,
}

/// Explicit dependencies handed to the generator
#[derive(Debug)]
pub struct GeneratorContext {
    /// Tunables
    pub config: GeneratorConfig,
    /// Audit log, which also owns the clock
    pub audit: IntegrityLog,
}

impl GeneratorContext {
    /// Context with the given configuration and clock
    pub fn new(config: GeneratorConfig, clock: Arc<dyn Clock>) -> Self {
        let audit = IntegrityLog::new(clock, config.audit_capacity);
        Self { config, audit }
    }

    /// Default configuration on wall-clock time
    pub fn system() -> Self {
        Self::new(GeneratorConfig::default(), Arc::new(SystemClock))
    }
}

/// Seamless background generator
#[derive(Debug)]
pub struct BackgroundGenerator {
    context: GeneratorContext,
    settings: GenerationSettings,
    source_image: Option<PixelBuffer>,
    current: Arc<TileSet>,
    current_settings: GenerationSettings,
    last_valid: Option<(Arc<TileSet>, GenerationSettings)>,
    has_valid_generation: bool,
    phase: GenerationPhase,
    preview_active: bool,
    preview: Option<PixelBuffer>,
}

impl BackgroundGenerator {
    /// Create a generator with default settings
    pub fn new(context: GeneratorContext) -> Self {
        Self {
            context,
            settings: GenerationSettings::default(),
            source_image: None,
            current: Arc::new(TileSet::empty()),
            current_settings: GenerationSettings::default(),
            last_valid: None,
            has_valid_generation: false,
            phase: GenerationPhase::Idle,
            preview_active: false,
            preview: None,
        }
    }

    /// Active settings
    pub const fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Runtime configuration
    pub const fn config(&self) -> &GeneratorConfig {
        &self.context.config
    }

    /// Audit log
    pub const fn audit(&self) -> &IntegrityLog {
        &self.context.audit
    }

    /// Phase reached by the most recent generation
    pub const fn phase(&self) -> GenerationPhase {
        self.phase
    }

    /// Tile set produced by the most recent generation or revert
    pub fn current_tile_set(&self) -> Arc<TileSet> {
        Arc::clone(&self.current)
    }

    /// True when the current tile set passed validation
    pub const fn has_valid_generation(&self) -> bool {
        self.has_valid_generation
    }

    /// Supply pixels for image-driven modes, overriding `sourceImagePath`
    pub fn set_source_image(&mut self, image: PixelBuffer) {
        self.source_image = Some(image);
    }

    /// Migrate and validate `candidate`, applying it only if it is valid
    ///
    /// Returns false and keeps the previous settings when the record is rejected.
    pub fn set_settings(&mut self, candidate: GenerationSettings) -> bool {
        let pending = self
            .context
            .audit
            .begin(BACKGROUND_OPERATION_PREFIX, "settings_update");

        let accepted = if settings::is_current(&candidate) {
            Ok(candidate)
        } else {
            settings::migrate(&candidate, candidate.schema_version, CURRENT_SCHEMA_VERSION)
        }
        .and_then(|migrated| settings::check(&migrated).map(|()| migrated));

        match accepted {
            Ok(migrated) => {
                let hash = migrated.content_hash();
                self.context.audit.note("SETTINGS_LOAD", &hash);
                self.settings = migrated;
                self.context
                    .audit
                    .complete(pending, &format!("mode={} hash={hash}", self.settings.mode.name()));
                true
            }
            Err(error) => {
                self.context.audit.warn("BackgroundGenerator", &error.to_string());
                self.context.audit.fail(pending, &format!("{}: {error}", error.kind()));
                false
            }
        }
    }

    /// Run the active mode's pipeline
    ///
    /// On success the result becomes both the current and the last valid tile set. On
    /// any failure the returned set is empty and the last valid state is untouched.
    pub fn generate(&mut self) -> Arc<TileSet> {
        let pending = self
            .context
            .audit
            .begin(BACKGROUND_OPERATION_PREFIX, "generate");

        match self.generate_validated() {
            Ok(tile_set) => {
                let quality = tile_set.quality();
                let details = format!(
                    "mode={} tiles={} deltaE={:.3} seamlessness={:.3}",
                    self.settings.mode.name(),
                    tile_set.len(),
                    quality.delta_e,
                    quality.seamlessness
                );
                let committed = Arc::new(tile_set);
                self.current = Arc::clone(&committed);
                self.current_settings = self.settings.clone();
                self.last_valid = Some((committed, self.settings.clone()));
                self.has_valid_generation = true;
                self.phase = GenerationPhase::Committed;
                info!(%details, "Generation committed");
                self.context.audit.complete(pending, &details);
            }
            Err(error) => {
                self.current = Arc::new(TileSet::empty());
                self.has_valid_generation = false;
                self.phase = GenerationPhase::RolledBack;
                self.context.audit.error("BackgroundGenerator", &error.to_string());
                self.context.audit.fail(pending, &format!("{}: {error}", error.kind()));
            }
        }
        self.current_tile_set()
    }

    fn generate_validated(&mut self) -> Result<TileSet> {
        self.phase = GenerationPhase::Validating;
        settings::check(&self.settings)?;

        self.phase = GenerationPhase::Generating;
        let mut tile_set = self.run_pipeline()?;

        self.phase = GenerationPhase::ValidatingOutput;
        if !Self::validate_tile_set(&tile_set) {
            return Err(validation_failure(&"tile set is empty or malformed"));
        }
        if tile_set.is_wang() {
            let validation = self.validate_wang_tile_borders(&tile_set);
            if !validation.has_valid_borders {
                return Err(validation_failure(&format!(
                    "border consistency {:.2} below threshold",
                    validation.border_consistency
                )));
            }
        }
        tile_set.set_quality(set_quality(&tile_set));
        Ok(tile_set)
    }

    fn run_pipeline(&self) -> Result<TileSet> {
        let s = &self.settings;
        let tile_size = s.tile_size_px();
        match s.mode {
            GenerationMode::Procedural => generate_procedural(&ProceduralParams {
                kind: s.noise_kind,
                fractal: s.fractal_params(),
                tile_size,
                seed: s.seed,
                layers: s.parallax_layers as usize,
                continuity: s.continuity,
            })
            .with_stage("procedural"),
            GenerationMode::WangTiles => {
                let count = usize::try_from(s.wang_tile_count).unwrap_or(0);
                let tile_set = WangTileSynthesizer::new(s.variety)
                    .with_tolerance(self.context.config.edge_tolerance)
                    .synthesize(count, tile_size, s.seed);
                if tile_set.is_empty() {
                    return Err(generation_failure("wang", &"synthesizer produced no tiles"));
                }
                Ok(tile_set)
            }
            GenerationMode::Geometrization => {
                let source = self.source()?;
                let params = GeometrizeParams {
                    max_colors: usize::try_from(s.max_colors).unwrap_or(0),
                    color_tolerance: s.color_tolerance,
                    simplification_tolerance: s.simplification_tolerance,
                    optimize_for_tiling: s.optimize_for_tiling,
                    resolution: usize::try_from(s.target_resolution).unwrap_or(0),
                };
                Geometrizer::new().geometrize(&source, &params)
            }
            GenerationMode::SeamlessFromImage => {
                let source = self.source()?;
                let tile = seamless_tile(&source, tile_size, s.continuity)?;
                Ok(TileSet::from_tiles(tile_size, vec![tile]))
            }
            GenerationMode::TextureSynthesis => {
                let source = self.source()?;
                let tile = synthesize_texture(&source, &QuiltingParams::for_tile(tile_size), s.seed)?;
                Ok(TileSet::from_tiles(tile_size, vec![tile]))
            }
        }
    }

    fn source(&self) -> Result<PixelBuffer> {
        if let Some(image) = &self.source_image {
            return Ok(image.clone());
        }
        self.settings.source_image_path.as_deref().map_or_else(
            || Err(generation_failure("source", &"mode requires a source image")),
            load_image,
        )
    }

    /// Structural validity of a tile set
    pub fn validate_tile_set(tile_set: &TileSet) -> bool {
        tile_set.is_valid() && tile_set.tile_size() > 0
    }

    /// Edge compatibility report using the configured tolerance and threshold
    pub fn validate_wang_tile_borders(&self, tile_set: &TileSet) -> WangValidation {
        validate_wang_borders(
            tile_set,
            self.context.config.edge_tolerance,
            self.context.config.border_consistency_threshold,
            EDGE_SAMPLE_COUNT,
        )
    }

    /// Lay out the current Wang set on a `width x height` grid
    ///
    /// Falls back to a greedy fill, with a logged warning, when the solver runs out of
    /// budget or finds no layout.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when there is no Wang set or a dimension is zero.
    pub fn generate_tile_layout(&mut self, width: usize, height: usize) -> Result<LayoutGrid> {
        let pending = self
            .context
            .audit
            .begin(BACKGROUND_OPERATION_PREFIX, "layout");
        let solver = WangLayoutSolver::new(self.current_settings.search_budget.max(1));
        let seed = self.current_settings.seed;

        match solver.solve(&self.current, width, height, seed) {
            Ok(grid) => {
                self.context
                    .audit
                    .complete(pending, &format!("{width}x{height} solved"));
                Ok(grid)
            }
            Err(error @ GenerationError::InvalidParameter { .. }) => {
                self.context.audit.fail(pending, &error.to_string());
                Err(error)
            }
            Err(error) => {
                self.context.audit.warn(
                    "WangLayoutSolver",
                    &format!("{error}; using fallback fill"),
                );
                match solver.fill_with_fallback(&self.current, width, height, seed) {
                    Ok(fallback) => {
                        self.context.audit.complete(
                            pending,
                            &format!("{width}x{height} fallback violations={}", fallback.violations),
                        );
                        Ok(fallback.grid)
                    }
                    Err(fallback_error) => {
                        self.context.audit.fail(pending, &fallback_error.to_string());
                        Err(fallback_error)
                    }
                }
            }
        }
    }

    /// Restore the last valid tile set and the settings that produced it
    ///
    /// Without a last valid state this logs a warning and changes nothing.
    pub fn revert_to_last_valid(&mut self) -> Arc<TileSet> {
        let pending = self
            .context
            .audit
            .begin(BACKGROUND_OPERATION_PREFIX, "revert");
        match &self.last_valid {
            Some((tile_set, settings)) => {
                self.current = Arc::clone(tile_set);
                self.current_settings = settings.clone();
                self.settings = settings.clone();
                self.has_valid_generation = true;
                self.context
                    .audit
                    .complete(pending, &format!("restored {} tiles", tile_set.len()));
            }
            None => {
                self.context
                    .audit
                    .warn("BackgroundGenerator", "No last valid state available to revert to");
                self.context.audit.complete(pending, "no-op");
            }
        }
        self.current_tile_set()
    }

    /// Build the preview composite, generating first if nothing exists yet
    ///
    /// Returns whether the preview is now active.
    pub fn show_preview(&mut self) -> bool {
        if self.current.is_empty() {
            self.generate();
        }
        self.hide_preview();
        match self.generate_preview_in_memory() {
            Ok(_) => {
                self.preview_active = true;
                info!(tiles = self.current.len(), "Showing background preview");
            }
            Err(error) => warn!(%error, "Preview unavailable"),
        }
        self.preview_active
    }

    /// Deactivate the preview
    pub const fn hide_preview(&mut self) {
        self.preview_active = false;
    }

    /// True while a preview is shown
    pub const fn is_preview_active(&self) -> bool {
        self.preview_active
    }

    /// Composite the current set into the configured preview grid
    ///
    /// Wang sets are laid out by the solver; other sets repeat their tiles in order.
    ///
    /// # Errors
    ///
    /// Returns `GenerationFailure` when there are no tiles to preview.
    pub fn generate_preview_in_memory(&mut self) -> Result<PixelBuffer> {
        let pending = self
            .context
            .audit
            .begin(BACKGROUND_OPERATION_PREFIX, "preview");
        if self.current.is_empty() {
            let error = generation_failure("preview", &"no tiles to preview");
            self.context.audit.fail(pending, &error.to_string());
            return Err(error);
        }

        let (columns, rows) = self.context.config.preview_grid;
        let grid = if self.current.is_wang() {
            match self.generate_tile_layout(columns, rows) {
                Ok(grid) => grid,
                Err(error) => {
                    self.context.audit.fail(pending, &error.to_string());
                    return Err(error);
                }
            }
        } else {
            let mut grid = LayoutGrid::new(columns, rows);
            for y in 0..rows {
                for x in 0..columns {
                    grid.set(x, y, (y * columns + x) % self.current.len());
                }
            }
            grid
        };

        let composite = grid.render(&self.current, self.context.config.preview_cell_size);
        self.preview = Some(composite.clone());
        self.context.audit.complete(
            pending,
            &format!("{columns}x{rows} preview {}x{}", composite.width(), composite.height()),
        );
        Ok(composite)
    }

    /// Most recent preview composite, if one is held in memory
    pub const fn preview_image(&self) -> Option<&PixelBuffer> {
        self.preview.as_ref()
    }

    /// Drop the stored preview composite
    pub fn clear_preview_memory(&mut self) {
        self.preview = None;
    }

    /// Write the export bundle for the current tile set into `directory`
    ///
    /// # Errors
    ///
    /// Returns `ExportFailure` when the current set is empty and propagates I/O,
    /// serialization and encoding errors.
    pub fn export_tile_set(&mut self, directory: &Path) -> Result<ExportManifest> {
        let pending = self
            .context
            .audit
            .begin(BACKGROUND_OPERATION_PREFIX, "export");
        let created = self.context.audit.clock().now();
        let result = export_bundle(
            directory,
            &self.current_settings,
            &self.current,
            &self.context.config.compatibility,
            self.context.config.thumbnail_size,
            created,
        );
        match &result {
            Ok(manifest) => {
                self.context.audit.note("HASH_CHECK", &self.current_settings.content_hash());
                self.context.audit.complete(
                    pending,
                    &format!("{} tiles to {}", manifest.tiles.len(), directory.display()),
                );
            }
            Err(error) => {
                self.context.audit.error("Export", &error.to_string());
                self.context.audit.fail(pending, &format!("{}: {error}", error.kind()));
            }
        }
        result
    }
}

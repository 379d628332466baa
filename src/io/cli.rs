//! Command-line driver for batch generation and export

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use crate::algorithm::generator::{BackgroundGenerator, GeneratorContext};
use crate::io::audit::{IntegrityLog, SystemClock};
use crate::io::configuration::GeneratorConfig;
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::save_png;
use crate::io::progress::ProgressManager;
use crate::io::settings::{self, GenerationMode, GenerationSettings, load_preset};
use crate::math::noise::NoiseKind;

#[derive(Parser)]
#[command(name = "seamtile")]
#[command(
    author,
    version,
    about = "Generate seamless background tiles and Wang tile sets"
)]
/// Command-line arguments for the generator
pub struct Cli {
    /// Action to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available actions
#[derive(Subcommand)]
pub enum Command {
    /// Generate one or more tile sets and export them
    Generate(GenerateArgs),
    /// Load, migrate and validate a preset without generating
    Check {
        /// Preset or settings JSON file
        #[arg(value_name = "PRESET")]
        preset: PathBuf,
    },
}

/// Generation mode names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Fractal noise tile
    Procedural,
    /// Wang tile set
    Wang,
    /// Flat-shaded polygon tile from a source image
    Geometrize,
    /// Source image made seamless
    Seamless,
    /// Patch-based texture synthesis from a source image
    Quilt,
}

impl From<ModeArg> for GenerationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Procedural => Self::Procedural,
            ModeArg::Wang => Self::WangTiles,
            ModeArg::Geometrize => Self::Geometrization,
            ModeArg::Seamless => Self::SeamlessFromImage,
            ModeArg::Quilt => Self::TextureSynthesis,
        }
    }
}

/// Noise kinds accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NoiseArg {
    /// Gradient lattice noise
    Perlin,
    /// Simplex noise
    Simplex,
    /// Cellular noise
    Worley,
}

impl From<NoiseArg> for NoiseKind {
    fn from(noise: NoiseArg) -> Self {
        match noise {
            NoiseArg::Perlin => Self::Perlin,
            NoiseArg::Simplex => Self::Simplex,
            NoiseArg::Worley => Self::Worley,
        }
    }
}

/// Options for `seamtile generate`
#[derive(Args)]
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct GenerateArgs {
    /// Directory receiving the export bundle(s)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Preset or settings JSON to start from
    #[arg(short, long)]
    pub preset: Option<PathBuf>,

    /// Generation mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Seed for reproducible generation; variants use consecutive seeds
    #[arg(short, long)]
    pub seed: Option<i64>,

    /// Tile edge length in pixels
    #[arg(short, long)]
    pub tile_size: Option<i32>,

    /// Noise kind for procedural mode
    #[arg(short, long, value_enum)]
    pub noise: Option<NoiseArg>,

    /// Base frequency of the noise field
    #[arg(long)]
    pub noise_scale: Option<f64>,

    /// Number of noise octaves
    #[arg(short, long)]
    pub octaves: Option<i32>,

    /// Source image for image-driven modes
    #[arg(short = 'i', long)]
    pub source: Option<PathBuf>,

    /// Number of variants to generate
    #[arg(short, long, default_value_t = 1)]
    pub variants: usize,

    /// Also render a Wang layout of this many columns
    #[arg(long, requires = "layout_height")]
    pub layout_width: Option<usize>,

    /// Also render a Wang layout of this many rows
    #[arg(long, requires = "layout_width")]
    pub layout_height: Option<usize>,

    /// Append audit lines to this file
    #[arg(long)]
    pub audit_log: Option<PathBuf>,

    /// Write the preview composite next to each bundle
    #[arg(long)]
    pub preview: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl GenerateArgs {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Requested layout dimensions, if both were given
    pub const fn layout(&self) -> Option<(usize, usize)> {
        match (self.layout_width, self.layout_height) {
            (Some(width), Some(height)) => Some((width, height)),
            _ => None,
        }
    }

    /// Settings built from the preset (or defaults) with command-line overrides applied
    ///
    /// # Errors
    ///
    /// Returns an error if the preset cannot be loaded or the result fails validation
    pub fn base_settings(&self) -> Result<GenerationSettings> {
        let mut base = self
            .preset
            .as_deref()
            .map_or_else(|| Ok(GenerationSettings::default()), load_preset)?;
        if let Some(mode) = self.mode {
            base.mode = mode.into();
        }
        if let Some(seed) = self.seed {
            base.seed = seed;
        }
        if let Some(tile_size) = self.tile_size {
            base.tile_size = tile_size;
        }
        if let Some(noise) = self.noise {
            base.noise_kind = noise.into();
        }
        if let Some(noise_scale) = self.noise_scale {
            base.noise_scale = noise_scale;
        }
        if let Some(octaves) = self.octaves {
            base.octaves = octaves;
        }
        if let Some(source) = &self.source {
            base.source_image_path = Some(source.clone());
        }
        settings::check(&base)?;
        Ok(base)
    }
}

/// Totals for one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Variants generated and exported
    pub succeeded: usize,
    /// Variants that failed at any stage
    pub failed: usize,
}

/// Run a parsed command line
///
/// # Errors
///
/// Returns an error if settings cannot be built or a preset fails to load
pub fn run(cli: Cli) -> Result<BatchSummary> {
    match cli.command {
        Command::Generate(args) => BatchRunner::new(args).run(),
        Command::Check { preset } => {
            let loaded = load_preset(&preset)?;
            info!(
                mode = loaded.mode.name(),
                hash = %loaded.content_hash(),
                "Preset is valid"
            );
            Ok(BatchSummary {
                succeeded: 1,
                failed: 0,
            })
        }
    }
}

/// Generates and exports a batch of variants with progress tracking
pub struct BatchRunner {
    args: GenerateArgs,
    progress_manager: Option<ProgressManager>,
}

impl BatchRunner {
    /// Create a runner for the given arguments
    pub fn new(args: GenerateArgs) -> Self {
        let progress_manager = args.should_show_progress().then(ProgressManager::new);
        Self {
            args,
            progress_manager,
        }
    }

    /// Generate every variant, continuing past individual failures
    ///
    /// # Errors
    ///
    /// Returns an error if the base settings are invalid or `--variants` is zero
    pub fn run(&mut self) -> Result<BatchSummary> {
        if self.args.variants == 0 {
            return Err(invalid_parameter(
                "variants",
                &self.args.variants,
                &"at least one variant is required",
            ));
        }
        let base = self.args.base_settings()?;

        let config = GeneratorConfig::default();
        let mut audit = IntegrityLog::new(Arc::new(SystemClock), config.audit_capacity);
        if let Some(path) = &self.args.audit_log {
            audit = audit.with_file(path);
        }
        let mut generator = BackgroundGenerator::new(GeneratorContext { config, audit });

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(self.args.variants);
        }

        let mut summary = BatchSummary::default();
        for index in 0..self.args.variants {
            let variant = GenerationSettings {
                seed: base.seed.wrapping_add(index as i64),
                ..base.clone()
            };
            let directory = self.variant_directory(index);
            let succeeded = self.run_variant(&mut generator, variant, &directory, index);
            if succeeded {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch complete"
        );
        Ok(summary)
    }

    fn stage_count(&self) -> usize {
        3 + usize::from(self.args.layout().is_some()) + usize::from(self.args.preview)
    }

    fn run_variant(
        &mut self,
        generator: &mut BackgroundGenerator,
        variant: GenerationSettings,
        directory: &Path,
        index: usize,
    ) -> bool {
        let label = format!("{} seed {}", variant.mode.name(), variant.seed);
        let stages = self.stage_count();
        if let Some(ref mut pm) = self.progress_manager {
            pm.start_variant(index, &label, stages);
        }

        let succeeded = self.run_stages(generator, variant, directory, index);

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_variant(index, succeeded);
        }
        succeeded
    }

    fn run_stages(
        &mut self,
        generator: &mut BackgroundGenerator,
        variant: GenerationSettings,
        directory: &Path,
        index: usize,
    ) -> bool {
        if !generator.set_settings(variant) {
            return false;
        }
        self.advance(index);

        let tile_set = generator.generate();
        if !generator.has_valid_generation() {
            warn!(variant = index, "Generation failed");
            return false;
        }
        self.advance(index);

        if let Err(error) = generator.export_tile_set(directory) {
            warn!(variant = index, %error, "Export failed");
            return false;
        }
        self.advance(index);

        if let Some((width, height)) = self.args.layout() {
            if tile_set.is_wang() {
                let rendered = generator
                    .generate_tile_layout(width, height)
                    .map(|grid| grid.render(&tile_set, tile_set.tile_size()))
                    .and_then(|image| save_png(&image, &directory.join("layout.png")));
                if let Err(error) = rendered {
                    warn!(variant = index, %error, "Layout failed");
                    return false;
                }
            } else {
                warn!(variant = index, "Layout requested for a tile set without edge patterns");
            }
            self.advance(index);
        }

        if self.args.preview {
            let written = generator
                .generate_preview_in_memory()
                .and_then(|image| save_png(&image, &directory.join("preview.png")));
            generator.clear_preview_memory();
            if let Err(error) = written {
                warn!(variant = index, %error, "Preview failed");
                return false;
            }
            self.advance(index);
        }
        true
    }

    fn advance(&mut self, index: usize) {
        if let Some(ref mut pm) = self.progress_manager {
            pm.advance(index);
        }
    }

    fn variant_directory(&self, index: usize) -> PathBuf {
        if self.args.variants == 1 {
            self.args.output.clone()
        } else {
            self.args.output.join(format!("variant_{index:03}"))
        }
    }
}

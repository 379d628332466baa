//! Export bundle writer
//!
//! A bundle directory holds `preset.json`, `spritesheet.png` with its `spritesheet.json`
//! layout, a `thumbnail.png`, one PNG per tile under `tiles/` and, for Wang sets, a
//! `compatibility.txt` edge table.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::io::error::{GenerationError, Result, file_system};
use crate::io::image::save_png;
use crate::io::settings::{GenerationMode, GenerationSettings};
use crate::spatial::buffer::PixelBuffer;
use crate::spatial::tiles::TileSet;

/// Preset document format version
pub const PRESET_FORMAT_VERSION: u32 = 1;

/// Prefix of the staging directories created beside an export target
pub const STAGING_PREFIX: &str = ".seamtile-export-";

const TILES_DIR: &str = "tiles";

/// Where one tile sits in the sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpriteCell {
    /// Tile index in the set
    pub index: usize,
    /// Atlas column
    pub col: usize,
    /// Atlas row
    pub row: usize,
    /// Left pixel offset
    pub x: usize,
    /// Top pixel offset
    pub y: usize,
}

/// Tiles packed row-major into a square-ish atlas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteSheet {
    /// Packed pixels
    pub image: PixelBuffer,
    /// Atlas columns, `ceil(sqrt(n))`
    pub columns: usize,
    /// Atlas rows
    pub rows: usize,
    /// Cell edge length
    pub cell_size: usize,
    /// Placement of every tile
    pub cells: Vec<SpriteCell>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpriteSheetLayout<'a> {
    columns: usize,
    rows: usize,
    cell_size: usize,
    tiles: &'a [SpriteCell],
}

/// Quality block of a preset
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityBlock {
    /// Mean seam colour difference
    pub delta_e: f64,
    /// Seam score in `[0, 1]`
    pub seamlessness: f64,
    /// Number of tiles
    pub tile_count: usize,
}

/// The `preset.json` document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetDocument {
    /// Generation mode name
    #[serde(rename = "type")]
    pub kind: String,
    /// Preset format version
    pub version: u32,
    /// RFC 3339 UTC creation time
    pub created: String,
    /// Digest of the defining settings
    pub hash: String,
    /// Tile edge length
    pub tile_size: usize,
    /// Mode-specific parameters
    pub parameters: serde_json::Value,
    /// Full settings record, reloadable as a preset
    pub settings: GenerationSettings,
    /// Host compatibility passthrough
    pub compatibility: BTreeMap<String, String>,
    /// Quality scores
    pub quality: QualityBlock,
}

/// Files written by one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportManifest {
    /// Bundle directory
    pub directory: PathBuf,
    /// `preset.json`
    pub preset: PathBuf,
    /// `spritesheet.png`
    pub spritesheet: PathBuf,
    /// `spritesheet.json`
    pub spritesheet_layout: PathBuf,
    /// `thumbnail.png`
    pub thumbnail: PathBuf,
    /// `compatibility.txt`, Wang sets only
    pub compatibility: Option<PathBuf>,
    /// Individual tile images
    pub tiles: Vec<PathBuf>,
}

/// Pack tiles row-major into `ceil(sqrt(n))` columns
pub fn pack_spritesheet(tile_set: &TileSet) -> SpriteSheet {
    let count = tile_set.len();
    let cell_size = tile_set.tile_size();
    let columns = (1..=count).find(|c| c * c >= count).unwrap_or(0);
    let rows = if columns == 0 { 0 } else { count.div_ceil(columns) };

    let mut image = PixelBuffer::new(columns * cell_size, rows * cell_size);
    let mut cells = Vec::with_capacity(count);
    for (index, tile) in tile_set.tiles().iter().enumerate() {
        let col = index % columns.max(1);
        let row = index / columns.max(1);
        let (x, y) = (col * cell_size, row * cell_size);
        image.blit(tile, x, y);
        cells.push(SpriteCell {
            index,
            col,
            row,
            x,
            y,
        });
    }

    SpriteSheet {
        image,
        columns,
        rows,
        cell_size,
        cells,
    }
}

/// One `index top right bottom left` row per tile
pub fn compatibility_table(tile_set: &TileSet) -> String {
    let mut table = String::new();
    for (index, pattern) in tile_set.edge_patterns().iter().enumerate() {
        let [top, right, bottom, left] = pattern.classes();
        let _ = writeln!(table, "{index} {top} {right} {bottom} {left}");
    }
    table
}

/// Parameters relevant to the settings' mode
pub fn parameters_block(settings: &GenerationSettings) -> serde_json::Value {
    match settings.mode {
        GenerationMode::Procedural => json!({
            "noiseKind": settings.noise_kind,
            "noiseScale": settings.noise_scale,
            "octaves": settings.octaves,
            "persistence": settings.persistence,
            "lacunarity": settings.lacunarity,
            "parallaxLayers": settings.parallax_layers,
        }),
        GenerationMode::WangTiles => json!({
            "wangTileCount": settings.wang_tile_count,
            "variety": settings.variety,
            "searchBudget": settings.search_budget,
        }),
        GenerationMode::Geometrization => json!({
            "maxColors": settings.max_colors,
            "colorTolerance": settings.color_tolerance,
            "simplificationTolerance": settings.simplification_tolerance,
            "targetResolution": settings.target_resolution,
            "optimizeForTiling": settings.optimize_for_tiling,
        }),
        GenerationMode::SeamlessFromImage => json!({
            "continuity": settings.continuity,
            "sourceImagePath": settings.source_image_path,
        }),
        GenerationMode::TextureSynthesis => json!({
            "sourceImagePath": settings.source_image_path,
            "variety": settings.variety,
        }),
    }
}

/// Assemble the preset document for a tile set
pub fn build_preset(
    settings: &GenerationSettings,
    tile_set: &TileSet,
    compatibility: &BTreeMap<String, String>,
    created: DateTime<Utc>,
) -> PresetDocument {
    let quality = tile_set.quality();
    PresetDocument {
        kind: settings.mode.name().to_string(),
        version: PRESET_FORMAT_VERSION,
        created: created.to_rfc3339_opts(SecondsFormat::Secs, true),
        hash: settings.content_hash(),
        tile_size: tile_set.tile_size(),
        parameters: parameters_block(settings),
        settings: settings.clone(),
        compatibility: compatibility.clone(),
        quality: QualityBlock {
            delta_e: quality.delta_e,
            seamlessness: quality.seamlessness,
            tile_count: tile_set.len(),
        },
    }
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|source| GenerationError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| file_system(path, "write", source))
}

/// Write the full bundle into `directory`
///
/// Every file is first written into a staging directory next to `directory` and only
/// moved into place once all of them succeeded, so a failed write leaves the target
/// untouched. `preset.json` is moved last and marks a complete bundle. Existing bundle
/// files in `directory` are replaced; other files are left alone.
///
/// # Errors
///
/// Returns `ExportFailure` when the tile set is empty and propagates file system,
/// serialization and image encoding errors.
pub fn export_bundle(
    directory: &Path,
    settings: &GenerationSettings,
    tile_set: &TileSet,
    compatibility: &BTreeMap<String, String>,
    thumbnail_size: usize,
    created: DateTime<Utc>,
) -> Result<ExportManifest> {
    if tile_set.is_empty() {
        return Err(GenerationError::ExportFailure {
            path: directory.to_path_buf(),
            reason: "no tiles to export".to_string(),
        });
    }

    let parent = directory
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|source| file_system(parent, "create directory", source))?;
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(|source| file_system(parent, "create staging directory", source))?;

    let staged = write_bundle(staging.path(), settings, tile_set, compatibility, thumbnail_size, created)?;
    fs::create_dir_all(directory).map_err(|source| file_system(directory, "create directory", source))?;
    let manifest = staged.rebased(staging.path(), directory);
    commit_staged(staging.path(), directory, &staged)?;

    info!(directory = %directory.display(), tiles = manifest.tiles.len(), "Exported tile set");
    Ok(manifest)
}

fn write_bundle(
    root: &Path,
    settings: &GenerationSettings,
    tile_set: &TileSet,
    compatibility: &BTreeMap<String, String>,
    thumbnail_size: usize,
    created: DateTime<Utc>,
) -> Result<ExportManifest> {
    let tiles_dir = root.join(TILES_DIR);
    fs::create_dir_all(&tiles_dir).map_err(|source| file_system(&tiles_dir, "create directory", source))?;

    let preset = root.join("preset.json");
    write_json(&build_preset(settings, tile_set, compatibility, created), &preset)?;

    let sheet = pack_spritesheet(tile_set);
    let spritesheet = root.join("spritesheet.png");
    save_png(&sheet.image, &spritesheet)?;
    let spritesheet_layout = root.join("spritesheet.json");
    write_json(
        &SpriteSheetLayout {
            columns: sheet.columns,
            rows: sheet.rows,
            cell_size: sheet.cell_size,
            tiles: &sheet.cells,
        },
        &spritesheet_layout,
    )?;

    let thumbnail = root.join("thumbnail.png");
    save_png(&sheet.image.downsample_box(thumbnail_size, thumbnail_size), &thumbnail)?;

    let compatibility_path = if tile_set.is_wang() {
        let path = root.join("compatibility.txt");
        fs::write(&path, compatibility_table(tile_set)).map_err(|source| file_system(&path, "write", source))?;
        Some(path)
    } else {
        None
    };

    let mut tiles = Vec::with_capacity(tile_set.len());
    for (index, tile) in tile_set.tiles().iter().enumerate() {
        let path = tiles_dir.join(format!("tile_{index:03}.png"));
        save_png(tile, &path)?;
        tiles.push(path);
    }

    Ok(ExportManifest {
        directory: root.to_path_buf(),
        preset,
        spritesheet,
        spritesheet_layout,
        thumbnail,
        compatibility: compatibility_path,
        tiles,
    })
}

// Moves staged entries into `directory`, replacing the tiles folder wholesale so stale
// tiles from a larger earlier export do not linger
fn commit_staged(staging: &Path, directory: &Path, staged: &ExportManifest) -> Result<()> {
    let target_tiles = directory.join(TILES_DIR);
    if target_tiles.is_dir() {
        fs::remove_dir_all(&target_tiles).map_err(|source| file_system(&target_tiles, "remove directory", source))?;
    }
    move_into(&staging.join(TILES_DIR), &target_tiles)?;

    let files = [
        Some(&staged.spritesheet),
        Some(&staged.spritesheet_layout),
        Some(&staged.thumbnail),
        staged.compatibility.as_ref(),
        Some(&staged.preset),
    ];
    for source in files.into_iter().flatten() {
        if let Some(name) = source.file_name() {
            move_into(source, &directory.join(name))?;
        }
    }
    Ok(())
}

fn move_into(source: &Path, target: &Path) -> Result<()> {
    fs::rename(source, target).map_err(|error| file_system(target, "move into place", error))
}

impl ExportManifest {
    fn rebased(&self, from: &Path, to: &Path) -> Self {
        let rebase = |path: &PathBuf| path.strip_prefix(from).map_or_else(|_| path.clone(), |relative| to.join(relative));
        Self {
            directory: to.to_path_buf(),
            preset: rebase(&self.preset),
            spritesheet: rebase(&self.spritesheet),
            spritesheet_layout: rebase(&self.spritesheet_layout),
            thumbnail: rebase(&self.thumbnail),
            compatibility: self.compatibility.as_ref().map(rebase),
            tiles: self.tiles.iter().map(rebase).collect(),
        }
    }
}

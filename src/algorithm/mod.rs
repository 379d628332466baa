/// Fixed-capacity bitsets of tile indices
pub mod bitset;
/// Orchestrator: settings, generation, validation, rollback, preview and export
pub mod generator;
/// Palette reduction and polygon rasterisation of source images
pub mod geometrize;
/// Backtracking Wang layout solver
pub mod layout;
/// Fractal noise tiles and colour ramps
pub mod procedural;
/// Patch-based texture synthesis
pub mod quilting;
/// Offset-and-blend seamless conversion
pub mod seamless;
/// Wang tile rasterisation from edge classes
pub mod synthesis;

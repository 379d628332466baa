/// Operation audit log and injectable clocks
pub mod audit;
/// Command-line driver
pub mod cli;
/// Constants and runtime configuration
pub mod configuration;
/// Error types and helpers
pub mod error;
/// Export bundle writer
pub mod export;
/// PNG load and save
pub mod image;
/// Batch progress bars
pub mod progress;
/// Settings records, validation, migration and presets
pub mod settings;

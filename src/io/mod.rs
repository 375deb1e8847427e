/// Command-line interface and batch processing
pub mod cli;
/// Algorithm constants and defaults
pub mod configuration;
/// Error types and context management
pub mod error;
/// Image loading and stipple export
pub mod image;
/// Progress display for batch runs
pub mod progress;

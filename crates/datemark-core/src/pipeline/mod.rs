//! Image processing pipeline components.
//!
//! This module contains all the stages of the watermarking pipeline:
//! - **discovery**: Find eligible image files in directories
//! - **validate**: Size and magic-byte checks before decoding
//! - **metadata**: Resolve the EXIF capture date
//! - **decode**: Load and decode images from various formats
//! - **output_path**: Map inputs to the `<input>_watermark` tree
//! - **processor**: Orchestrates the full batch

pub mod decode;
pub mod discovery;
pub mod metadata;
pub mod output_path;
pub mod processor;
pub mod validate;

// Re-exports for convenient access
pub use decode::ImageDecoder;
pub use discovery::{DiscoveredFile, Discovery, FileDiscovery};
pub use metadata::{parse_exif_date, resolve_capture_date};
pub use output_path::{default_output_root, OutputLayout};
pub use processor::{ImageProcessor, ProcessOptions, Stamped};
pub use validate::Validator;

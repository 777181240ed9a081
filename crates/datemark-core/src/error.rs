//! Error types for the Datemark watermarking pipeline.
//!
//! Errors are organized by stage to provide clear, actionable error messages
//! that include relevant context (file paths, stage names, specific issues).
//! Metadata problems never appear here: a missing or malformed capture date
//! is recovered inside the metadata reader.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Datemark operations.
#[derive(Error, Debug)]
pub enum DatemarkError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors (batch report)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input path given to the batch driver does not exist
    #[error("Input path does not exist: {0}")]
    InputNotFound(PathBuf),

    /// A requested font could not be loaded
    #[error("Font error: {0}")]
    Font(#[from] FontError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Font loading errors.
///
/// These only surface when a font is loaded directly; font selection logs
/// them and falls back to the next candidate.
#[derive(Error, Debug)]
pub enum FontError {
    /// The font file could not be read
    #[error("Cannot read font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a usable TrueType/OpenType font
    #[error("Invalid font {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Per-file pipeline errors, organized by stage.
///
/// The batch driver records these in the file's outcome and moves on.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Drawing the watermark or encoding the result failed
    #[error("Render error for {path}: {message}")]
    Render { path: PathBuf, message: String },

    /// Writing the output file failed
    #[error("Write error for {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The derived output path is the input file itself
    #[error("Refusing to overwrite input {0}; choose a different output directory or a suffix")]
    OutputIsInput(PathBuf),
}

/// Convenience type alias for Datemark results.
pub type Result<T> = std::result::Result<T, DatemarkError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

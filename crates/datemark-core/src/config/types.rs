//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::{Anchor, Color};

/// How the watermark looks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Font size in pixels
    pub font_size: u32,

    /// Text color: a name ("white"), "R,G,B", or "#RRGGBB"
    pub color: Color,

    /// Anchor: top-left, top-right, bottom-left, bottom-right, center.
    /// Unrecognized values fall back to bottom-right.
    pub position: Anchor,

    /// Draw a semi-transparent black shadow behind the text
    pub shadow: bool,

    /// Alpha of the main text before compositing (1-255)
    pub opacity: u8,

    /// Text used when an image has no usable capture date
    pub no_date_label: String,

    /// TrueType font file; system fonts are tried when unset or unreadable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            font_size: 20,
            color: Color::WHITE,
            position: Anchor::BottomRight,
            shadow: true,
            opacity: 200,
            no_date_label: "no date".to_string(),
            font_path: None,
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of files processed concurrently (1 = strictly sequential)
    pub parallel_workers: usize,

    /// Supported input formats (file extensions, case-insensitive)
    pub supported_formats: Vec<String>,

    /// Appended to the file stem of each output, e.g. "_watermarked"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 1,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
                "gif".to_string(),
            ],
            suffix: None,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Render + encode + write timeout in milliseconds
    pub render_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 20000,
            decode_timeout_ms: 10000,
            render_timeout_ms: 30000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

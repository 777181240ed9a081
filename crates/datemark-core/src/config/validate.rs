//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

/// Largest accepted `watermark.font_size`, in pixels.
pub const MAX_FONT_SIZE: u32 = 2048;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watermark.font_size == 0 {
            return Err(ConfigError::ValidationError(
                "watermark.font_size must be > 0".into(),
            ));
        }
        if self.watermark.font_size > MAX_FONT_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "watermark.font_size must be at most {MAX_FONT_SIZE}"
            )));
        }
        if self.watermark.opacity == 0 {
            return Err(ConfigError::ValidationError(
                "watermark.opacity must be between 1 and 255".into(),
            ));
        }
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if let Some(suffix) = &self.processing.suffix {
            if suffix.contains(std::path::is_separator) {
                return Err(ConfigError::ValidationError(
                    "processing.suffix must not contain path separators".into(),
                ));
            }
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.render_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.render_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

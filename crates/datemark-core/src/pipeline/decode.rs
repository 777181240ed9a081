//! Image decoding with content-based format detection, a dimension limit
//! and a timeout.

use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Decodes images off the async runtime within configured limits.
pub struct ImageDecoder {
    max_dimension: u32,
    timeout_ms: u64,
}

impl ImageDecoder {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            max_dimension: limits.max_image_dimension,
            timeout_ms: limits.decode_timeout_ms,
        }
    }

    /// Decode an in-memory file in `spawn_blocking`.
    ///
    /// The caller reads the file once and shares the bytes with the metadata
    /// reader before handing them over here.
    pub async fn decode(&self, bytes: Vec<u8>, path: &Path) -> Result<DynamicImage, PipelineError> {
        let path_owned = path.to_path_buf();
        let max_dimension = self.max_dimension;
        let task = tokio::task::spawn_blocking(move || {
            decode_pixels(&bytes, &path_owned, max_dimension)
        });

        match timeout(Duration::from_millis(self.timeout_ms), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.timeout_ms,
            }),
        }
    }
}

/// Decode `bytes`, refusing images larger than `max_dimension` on either
/// side before any pixel buffer is allocated.
fn decode_pixels(bytes: &[u8], path: &Path, max_dimension: u32) -> Result<DynamicImage, PipelineError> {
    let reader = guessed_reader(bytes, path)?;
    let (width, height) = reader.into_dimensions().map_err(|e| PipelineError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if width > max_dimension || height > max_dimension {
        return Err(PipelineError::ImageTooLarge {
            path: path.to_path_buf(),
            width,
            height,
            max_dim: max_dimension,
        });
    }

    guessed_reader(bytes, path)?
        .decode()
        .map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// A reader whose format comes from the content, not the file name.
fn guessed_reader<'a>(bytes: &'a [u8], path: &Path) -> Result<ImageReader<Cursor<&'a [u8]>>, PipelineError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot detect image format: {}", e),
        })?;
    if reader.format().is_none() {
        return Err(PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        });
    }
    Ok(reader)
}

//! Datemark Core - stamp each photo's capture date onto a copy of it.
//!
//! Given a photo (or a directory of photos), Datemark reads the EXIF capture
//! timestamp, renders it as a text watermark, and writes the result into a
//! sibling `<input>_watermark` directory. Inputs are never modified.
//!
//! # Architecture
//!
//! ```text
//! Discover → Validate → Resolve capture date → Decode → Render → Write
//! ```
//!
//! Each file goes through the pipeline on its own; a failure is recorded in
//! the [`BatchReport`] and the batch carries on.
//!
//! # Usage
//!
//! ```rust,ignore
//! use datemark_core::{Config, ImageProcessor, ProcessOptions};
//!
//! #[tokio::main]
//! async fn main() -> datemark_core::Result<()> {
//!     let config = Config::load()?;
//!     let processor = ImageProcessor::new(&config);
//!
//!     let report = processor
//!         .process_path("./photos".as_ref(), &ProcessOptions::default())
//!         .await?;
//!     println!("{} watermarked, {} failed", report.succeeded, report.failed);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, DatemarkError, FontError, PipelineError, PipelineResult, Result};
pub use pipeline::{
    resolve_capture_date, DiscoveredFile, ImageProcessor, OutputLayout, ProcessOptions,
};
pub use render::{
    compute_placement, BitmapFont, FontProvider, FontSelector, Placement, StagedOutput,
    TrueTypeFont, WatermarkSpec, Watermarker, MARGIN,
};
pub use types::{
    Anchor, BatchReport, CalendarDate, CaptureDate, Color, DateSource, FileOutcome,
    OutcomeStatus,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

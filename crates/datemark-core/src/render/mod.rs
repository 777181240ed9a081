//! Watermark placement and compositing.
//!
//! Text is drawn on a transparent layer the size of the image (shadow
//! first, then the main text), the layer is alpha-blended onto the image,
//! and the result is flattened to opaque RGB.

pub mod font;

pub use font::{BitmapFont, FontProvider, FontSelector, TrueTypeFont};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::WatermarkConfig;
use crate::error::PipelineError;
use crate::types::{Anchor, Color};

/// Distance in pixels between the text and the image edge(s) it is anchored
/// to. Not applied to the center anchor.
pub const MARGIN: i32 = 10;

/// Diagonal offsets the shadow is drawn at.
const SHADOW_OFFSETS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

/// Semi-transparent black.
const SHADOW_COLOR: Rgba<u8> = Rgba([0, 0, 0, 128]);

/// Everything needed to draw one watermark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkSpec {
    pub text: String,
    pub font_size: u32,
    pub color: Color,
    pub position: Anchor,
    pub shadow: bool,
    pub opacity: u8,
}

impl WatermarkSpec {
    /// Build a spec for `text` using the configured appearance.
    pub fn from_config(text: impl Into<String>, config: &WatermarkConfig) -> Self {
        Self {
            text: text.into(),
            font_size: config.font_size,
            color: config.color,
            position: config.position,
            shadow: config.shadow,
            opacity: config.opacity,
        }
    }
}

/// Top-left origin of the text box, in image pixel coordinates.
///
/// Negative when the text does not fit; drawing clips in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
}

/// Compute where a `text_w` x `text_h` box goes on an `img_w` x `img_h` image.
///
/// Coordinates saturate at the `i32` range for boxes far larger than the
/// image.
pub fn compute_placement(
    anchor: Anchor,
    (img_w, img_h): (u32, u32),
    (text_w, text_h): (u32, u32),
) -> Placement {
    let (img_w, img_h) = (i64::from(img_w), i64::from(img_h));
    let (text_w, text_h) = (i64::from(text_w), i64::from(text_h));
    let margin = i64::from(MARGIN);
    let right = img_w - text_w - margin;
    let bottom = img_h - text_h - margin;

    let (x, y) = match anchor {
        Anchor::TopLeft => (margin, margin),
        Anchor::TopRight => (right, margin),
        Anchor::BottomLeft => (margin, bottom),
        Anchor::BottomRight => (right, bottom),
        Anchor::Center => ((img_w - text_w).div_euclid(2), (img_h - text_h).div_euclid(2)),
    };
    Placement {
        x: clamp_to_i32(x),
        y: clamp_to_i32(y),
    }
}

fn clamp_to_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Draws watermarks with a fixed font.
pub struct Watermarker<'a> {
    font: &'a dyn FontProvider,
}

impl<'a> Watermarker<'a> {
    pub fn new(font: &'a dyn FontProvider) -> Self {
        Self { font }
    }

    /// Where the text of `spec` would be drawn on an image of `dimensions`.
    pub fn placement(&self, spec: &WatermarkSpec, dimensions: (u32, u32)) -> Placement {
        let text_size = self.font.measure(&spec.text, spec.font_size);
        compute_placement(spec.position, dimensions, text_size)
    }

    /// Return a watermarked, opaque copy of `image`.
    pub fn render(&self, image: &DynamicImage, spec: &WatermarkSpec) -> DynamicImage {
        let mut base = image.to_rgba8();
        let (width, height) = base.dimensions();
        let origin = self.placement(spec, (width, height));

        let mut layer = RgbaImage::new(width, height);
        if spec.shadow {
            for (dx, dy) in SHADOW_OFFSETS {
                self.font.draw(
                    &mut layer,
                    &spec.text,
                    origin.x + dx,
                    origin.y + dy,
                    spec.font_size,
                    SHADOW_COLOR,
                );
            }
        }
        self.font.draw(
            &mut layer,
            &spec.text,
            origin.x,
            origin.y,
            spec.font_size,
            spec.color.to_rgba(spec.opacity),
        );

        image::imageops::overlay(&mut base, &layer, 0, 0);
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(base).to_rgb8())
    }

    /// Watermark `image` and encode it into a temporary file next to
    /// `output`. Nothing appears at `output` until the result is committed.
    /// The encoding is chosen from the output extension.
    pub fn stage(
        &self,
        image: &DynamicImage,
        spec: &WatermarkSpec,
        output: &Path,
    ) -> Result<StagedOutput, PipelineError> {
        let format = ImageFormat::from_path(output).map_err(|e| encode_error(output, e))?;
        let rendered = self.render(image, spec);

        let parent = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::Write {
            path: output.to_path_buf(),
            message: format!("Cannot create directory {}: {e}", parent.display()),
        })?;

        let mut file = tempfile::Builder::new()
            .prefix(".datemark-")
            .suffix(".partial")
            .tempfile_in(parent)
            .map_err(|e| write_error(output, e))?;
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            rendered
                .write_to(&mut writer, format)
                .map_err(|e| encode_error(output, e))?;
            writer.flush().map_err(|e| write_error(output, e))?;
        }

        Ok(StagedOutput {
            file,
            target: output.to_path_buf(),
        })
    }

    /// Watermark `image` and write it to `output`, replacing any existing
    /// file in one step.
    pub fn render_to_file(
        &self,
        image: &DynamicImage,
        spec: &WatermarkSpec,
        output: &Path,
    ) -> Result<(), PipelineError> {
        self.stage(image, spec, output)?.commit()
    }
}

/// An encoded watermark waiting in a temporary file beside its destination.
///
/// Dropping it without calling [`commit`](Self::commit) removes the
/// temporary file.
pub struct StagedOutput {
    file: NamedTempFile,
    target: PathBuf,
}

impl StagedOutput {
    /// Final path the output will be renamed to.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the temporary file over the destination.
    pub fn commit(self) -> Result<(), PipelineError> {
        let target = self.target;
        self.file
            .persist(&target)
            .map_err(|e| write_error(&target, e.error))?;
        Ok(())
    }
}

fn write_error(output: &Path, e: std::io::Error) -> PipelineError {
    PipelineError::Write {
        path: output.to_path_buf(),
        message: e.to_string(),
    }
}

fn encode_error(output: &Path, e: image::ImageError) -> PipelineError {
    match e {
        image::ImageError::IoError(io) => write_error(output, io),
        other => PipelineError::Render {
            path: output.to_path_buf(),
            message: other.to_string(),
        },
    }
}

//! Font providers for drawing watermark text.
//!
//! Two implementations sit behind [`FontProvider`]:
//! - [`TrueTypeFont`]: a TTF/OTF file rasterized with `ab_glyph`
//! - [`BitmapFont`]: 8x8 glyphs compiled into the binary, always available
//!
//! [`FontSelector`] picks the first one that can actually be loaded.

use ab_glyph::{point, Font, FontVec, OutlinedGlyph, PxScale, ScaleFont};
use font8x8::UnicodeFonts;
use image::{Pixel, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::FontError;

/// Something that can measure and draw a line of text.
pub trait FontProvider: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Size of the box `text` occupies at `size` pixels: `(width, height)`.
    /// Everything [`draw`](Self::draw) paints at `(x, y)` lies inside
    /// `x..x + width`, `y..y + height`.
    fn measure(&self, text: &str, size: u32) -> (u32, u32);

    /// Draw `text` with its top-left corner at `(x, y)`. Pixels outside the
    /// layer are clipped.
    fn draw(&self, layer: &mut RgbaImage, text: &str, x: i32, y: i32, size: u32, color: Rgba<u8>);
}

/// Well-known locations of a sans-serif TrueType font, tried in order.
pub(crate) const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A scalable font loaded from disk.
pub struct TrueTypeFont {
    name: String,
    font: FontVec,
}

impl TrueTypeFont {
    /// Load a font file. Fails if the file is missing or not a font.
    pub fn load(path: &Path) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let font = FontVec::try_from_vec(bytes).map_err(|e| FontError::Invalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("truetype")
            .to_string();
        Ok(Self { name, font })
    }

    /// Lay `text` out on one line from the ascent, returning the outlined
    /// glyphs and the box `(width, height)` they are measured to.
    fn layout(&self, text: &str, size: u32) -> (Vec<OutlinedGlyph>, (u32, u32)) {
        let scale = PxScale::from(size as f32);
        let scaled = self.font.as_scaled(scale);

        let mut glyphs = Vec::new();
        let mut caret = 0.0f32;
        let mut right = 0.0f32;
        let mut previous = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
            if let Some(outline) = self.font.outline_glyph(glyph) {
                right = right.max(outline.px_bounds().max.x);
                glyphs.push(outline);
            }
            caret += scaled.h_advance(id);
            previous = Some(id);
        }

        let width = caret.max(right).ceil().max(0.0) as u32;
        if width == 0 {
            return (glyphs, (0, 0));
        }
        let height = (scaled.ascent() - scaled.descent()).ceil().max(0.0) as u32;
        (glyphs, (width, height))
    }
}

impl FontProvider for TrueTypeFont {
    fn name(&self) -> &str {
        &self.name
    }

    /// The height is the line box (ascent to descent), not the ink height,
    /// because glyphs are positioned from the ascent line.
    fn measure(&self, text: &str, size: u32) -> (u32, u32) {
        self.layout(text, size).1
    }

    /// Ink that would fall outside the measured box (accents above the
    /// ascent, negative side bearings) is dropped.
    fn draw(&self, layer: &mut RgbaImage, text: &str, x: i32, y: i32, size: u32, color: Rgba<u8>) {
        let (glyphs, (box_w, box_h)) = self.layout(text, size);
        let (box_w, box_h) = (i64::from(box_w), i64::from(box_h));
        let (width, height) = (i64::from(layer.width()), i64::from(layer.height()));

        for glyph in glyphs {
            let bounds = glyph.px_bounds();
            let (min_x, min_y) = (bounds.min.x as i64, bounds.min.y as i64);
            glyph.draw(|gx, gy, coverage| {
                let (rel_x, rel_y) = (min_x + i64::from(gx), min_y + i64::from(gy));
                if rel_x < 0 || rel_y < 0 || rel_x >= box_w || rel_y >= box_h {
                    return;
                }
                let (cx, cy) = (i64::from(x) + rel_x, i64::from(y) + rel_y);
                if cx < 0 || cy < 0 || cx >= width || cy >= height {
                    return;
                }
                let alpha = (f32::from(color[3]) * coverage.clamp(0.0, 1.0)).round() as u8;
                if alpha == 0 {
                    return;
                }
                let ink = Rgba([color[0], color[1], color[2], alpha]);
                layer.get_pixel_mut(cx as u32, cy as u32).blend(&ink);
            });
        }
    }
}

/// Embedded 8x8 bitmap font, scaled by whole pixels.
///
/// Characters without a glyph (anything outside basic Latin) draw as blank
/// cells but still take up space.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFont;

impl BitmapFont {
    const CELL: u32 = 8;

    fn scale(size: u32) -> u32 {
        (size / Self::CELL).max(1)
    }
}

impl FontProvider for BitmapFont {
    fn name(&self) -> &str {
        "builtin-8x8"
    }

    fn measure(&self, text: &str, size: u32) -> (u32, u32) {
        let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        if chars == 0 {
            return (0, 0);
        }
        let cell = Self::CELL.saturating_mul(Self::scale(size));
        (chars.saturating_mul(cell), cell)
    }

    fn draw(&self, layer: &mut RgbaImage, text: &str, x: i32, y: i32, size: u32, color: Rgba<u8>) {
        let scale = i32::try_from(Self::scale(size)).unwrap_or(i32::MAX);
        let cell = (Self::CELL as i32).saturating_mul(scale);
        let (width, height) = (layer.width() as i32, layer.height() as i32);

        for (index, ch) in text.chars().enumerate() {
            let offset = i32::try_from(index).unwrap_or(i32::MAX).saturating_mul(cell);
            let origin_x = x.saturating_add(offset);
            if origin_x >= width {
                break;
            }
            let Some(glyph) = font8x8::BASIC_FONTS.get(ch) else {
                continue;
            };

            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..8 {
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    let px = origin_x.saturating_add(col * scale);
                    let py = y.saturating_add(row as i32 * scale);
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let (cx, cy) = (px.saturating_add(dx), py.saturating_add(dy));
                            if cx >= 0 && cy >= 0 && cx < width && cy < height {
                                layer.put_pixel(cx as u32, cy as u32, color);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Chooses a font provider by availability.
pub struct FontSelector;

impl FontSelector {
    /// Return the first loadable font: `requested`, then well-known system
    /// fonts, then the embedded bitmap font.
    pub fn select(requested: Option<&Path>) -> Arc<dyn FontProvider> {
        if let Some(path) = requested {
            match TrueTypeFont::load(path) {
                Ok(font) => {
                    tracing::debug!("Using font {}", font.name());
                    return Arc::new(font);
                }
                Err(e) => tracing::warn!("{e}; trying system fonts"),
            }
        }

        for candidate in Self::system_candidates() {
            if !candidate.is_file() {
                continue;
            }
            match TrueTypeFont::load(&candidate) {
                Ok(font) => {
                    tracing::debug!("Using system font {:?}", candidate);
                    return Arc::new(font);
                }
                Err(e) => tracing::debug!("Skipping system font: {e}"),
            }
        }

        tracing::info!("No TrueType font available, using the built-in bitmap font");
        Arc::new(BitmapFont)
    }

    fn system_candidates() -> impl Iterator<Item = PathBuf> {
        SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from)
    }
}

/// First system font that loads, for tests that need real glyph metrics.
#[cfg(test)]
pub(crate) fn system_font() -> Option<TrueTypeFont> {
    SYSTEM_FONT_CANDIDATES
        .iter()
        .find_map(|path| TrueTypeFont::load(Path::new(path)).ok())
}

//! Core data types for the Datemark watermarking pipeline.
//!
//! These types describe what was resolved from an image (its capture date),
//! how a watermark should look (anchor, color), and what happened to each
//! file in a batch run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A calendar date (year-month-day) with no time-of-day component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl CalendarDate {
    /// Build a date, rejecting impossible month/day combinations.
    ///
    /// Year 0 is rejected as well: cameras with an unset clock write
    /// `0000:00:00 00:00:00`.
    pub fn new(year: u16, month: u8, day: u8) -> Option<Self> {
        if year == 0 || !(1..=12).contains(&month) || day == 0 {
            return None;
        }
        if day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 31,
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// The EXIF tag a capture date was read from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// `DateTimeOriginal` (Exif IFD) - when the shutter fired
    DateTimeOriginal,
    /// `DateTimeDigitized` (Exif IFD) - when the image was stored digitally
    DateTimeDigitized,
    /// `DateTime` (IFD0) - generic file modification timestamp
    DateTime,
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSource::DateTimeOriginal => write!(f, "DateTimeOriginal"),
            DateSource::DateTimeDigitized => write!(f, "DateTimeDigitized"),
            DateSource::DateTime => write!(f, "DateTime"),
        }
    }
}

/// Result of resolving an image's capture date.
///
/// An image without a usable timestamp is `Unknown`; the watermark text for
/// it is the configured fallback label, never the current date, so repeated
/// runs stay byte-for-byte identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureDate {
    Known {
        date: CalendarDate,
        source: DateSource,
    },
    Unknown,
}

impl CaptureDate {
    /// The resolved date, if any.
    pub fn date(&self) -> Option<CalendarDate> {
        match self {
            CaptureDate::Known { date, .. } => Some(*date),
            CaptureDate::Unknown => None,
        }
    }

    /// The tag the date came from, if any.
    pub fn source(&self) -> Option<DateSource> {
        match self {
            CaptureDate::Known { source, .. } => Some(*source),
            CaptureDate::Unknown => None,
        }
    }

    /// Text to burn into the image: `YYYY-MM-DD`, or `fallback` when unknown.
    pub fn watermark_text(&self, fallback: &str) -> String {
        match self {
            CaptureDate::Known { date, .. } => date.to_string(),
            CaptureDate::Unknown => fallback.to_string(),
        }
    }
}

/// Named placement of the watermark text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

impl Anchor {
    /// All anchors, in display order.
    pub const ALL: [Anchor; 5] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
        Anchor::Center,
    ];

    /// Parse an anchor name. Accepts `top-left` and `top_left` spellings,
    /// case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "top-left" => Some(Self::TopLeft),
            "top-right" => Some(Self::TopRight),
            "bottom-left" => Some(Self::BottomLeft),
            "bottom-right" => Some(Self::BottomRight),
            "center" | "centre" => Some(Self::Center),
            _ => None,
        }
    }

    /// Parse an anchor name, falling back to bottom-right for anything
    /// unrecognized.
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            tracing::warn!("Unknown watermark position {s:?}, using bottom-right");
            Self::BottomRight
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::TopLeft => "top-left",
            Anchor::TopRight => "top-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomRight => "bottom-right",
            Anchor::Center => "center",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let names: Vec<&str> = Self::ALL.iter().map(Anchor::as_str).collect();
            format!("unknown position {s:?} (expected one of: {})", names.join(", "))
        })
    }
}

impl From<String> for Anchor {
    fn from(s: String) -> Self {
        Self::parse_lenient(&s)
    }
}

impl From<Anchor> for String {
    fn from(anchor: Anchor) -> Self {
        anchor.as_str().to_string()
    }
}

/// An opaque RGB color for the watermark text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Look up one of the supported color names.
    pub fn named(name: &str) -> Option<Self> {
        let color = match name.to_lowercase().as_str() {
            "white" => Self::WHITE,
            "black" => Self::BLACK,
            "red" => Self::new(255, 0, 0),
            "green" => Self::new(0, 255, 0),
            "blue" => Self::new(0, 0, 255),
            "yellow" => Self::new(255, 255, 0),
            "orange" => Self::new(255, 165, 0),
            "gray" | "grey" => Self::new(128, 128, 128),
            _ => return None,
        };
        Some(color)
    }

    pub fn to_rgba(self, alpha: u8) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, alpha])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Color {
    type Err = String;

    /// Accepts a color name, `R,G,B`, or `#RRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(color) = Self::named(s) {
            return Ok(color);
        }

        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() == 6 && hex.is_ascii() {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                if let (Ok(r), Ok(g), Ok(b)) = (channel(0), channel(2), channel(4)) {
                    return Ok(Self::new(r, g, b));
                }
            }
            return Err(format!("invalid hex color {s:?} (expected #RRGGBB)"));
        }

        if s.contains(',') {
            let channels: Vec<&str> = s.split(',').map(str::trim).collect();
            if let [r, g, b] = channels.as_slice() {
                if let (Ok(r), Ok(g), Ok(b)) = (r.parse(), g.parse(), b.parse()) {
                    return Ok(Self::new(r, g, b));
                }
            }
            return Err(format!(
                "invalid RGB color {s:?} (expected three values 0-255, e.g. 255,255,255)"
            ));
        }

        Err(format!("unknown color {s:?}"))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        format!("{},{},{}", c.r, c.g, c.b)
    }
}

/// Final state of a single input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Succeeded,
    Failed,
}

/// What happened to one file in a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Source image
    pub input: PathBuf,

    /// Where the watermarked copy was (or would have been) written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Text burned into the image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// EXIF tag the date came from; absent when the fallback label was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_source: Option<DateSource>,

    pub status: OutcomeStatus,

    /// Error message for failed files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BatchReport {
    /// Root directory the watermarked copies were written under
    pub output_root: PathBuf,

    /// Files watermarked successfully
    pub succeeded: usize,

    /// Files that failed to decode, render, or write
    pub failed: usize,

    /// Files ignored because their extension is not on the allow-list
    pub skipped: usize,

    /// Total processing time in seconds
    pub total_seconds: f64,

    /// Per-file outcomes, sorted by input path
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Serialize the report as pretty JSON to `path`.
    pub fn write_json(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

//! EXIF capture-date extraction from images.
//!
//! Tags are consulted in priority order (`DateTimeOriginal`,
//! `DateTimeDigitized`, then `DateTime`). A tag whose value cannot be parsed
//! is skipped rather than trusted. Nothing here ever fails the caller: any
//! problem with the metadata yields [`CaptureDate::Unknown`].

use exif::{In, Reader, Tag, Value};
use std::io::Cursor;

use crate::types::{CalendarDate, CaptureDate, DateSource};

/// Date tags in the order they are trusted.
const DATE_TAGS: [(Tag, DateSource); 3] = [
    (Tag::DateTimeOriginal, DateSource::DateTimeOriginal),
    (Tag::DateTimeDigitized, DateSource::DateTimeDigitized),
    (Tag::DateTime, DateSource::DateTime),
];

/// Resolve the capture date embedded in an encoded image.
///
/// Understands every container `kamadak-exif` does (JPEG, TIFF, PNG, WebP,
/// HEIF). Deterministic: the same bytes always give the same answer.
pub fn resolve_capture_date(image_bytes: &[u8]) -> CaptureDate {
    let mut cursor = Cursor::new(image_bytes);
    let exif = match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => {
            tracing::trace!("No EXIF data present");
            return CaptureDate::Unknown;
        }
        Err(e) => {
            tracing::debug!("Unreadable EXIF data: {}", e);
            return CaptureDate::Unknown;
        }
    };

    for (tag, source) in DATE_TAGS {
        let Some(field) = exif.get_field(tag, In::PRIMARY) else {
            continue;
        };
        match first_ascii(&field.value).and_then(parse_exif_date) {
            Some(date) => return CaptureDate::Known { date, source },
            None => tracing::debug!(
                "Ignoring unparseable {} value {}",
                tag,
                field.display_value()
            ),
        }
    }

    CaptureDate::Unknown
}

/// First string of an ASCII-typed field.
fn first_ascii(value: &Value) -> Option<&str> {
    match value {
        Value::Ascii(strings) => strings
            .first()
            .and_then(|s| std::str::from_utf8(s).ok()),
        _ => None,
    }
}

/// Parse the date portion of an EXIF timestamp.
///
/// Two encodings are understood:
/// - colon-delimited `YYYY:MM:DD HH:MM:SS` (dashes tolerated as separators)
/// - compact, `YYYYMMDD` followed by anything
pub fn parse_exif_date(raw: &str) -> Option<CalendarDate> {
    let s = raw.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    let date_part = s.split([' ', 'T']).next()?;

    if date_part.contains([':', '-']) {
        let mut parts = date_part.split([':', '-']);
        let year = fixed_digits(parts.next()?, 4)?;
        let month = fixed_digits(parts.next()?, 2)?;
        let day = fixed_digits(parts.next()?, 2)?;
        if parts.next().is_some() {
            return None;
        }
        return CalendarDate::new(year, month as u8, day as u8);
    }

    let compact = s.get(..8)?;
    if !compact.is_ascii() {
        return None;
    }
    let year = fixed_digits(&compact[..4], 4)?;
    let month = fixed_digits(&compact[4..6], 2)?;
    let day = fixed_digits(&compact[6..8], 2)?;
    CalendarDate::new(year, month as u8, day as u8)
}

/// Parse exactly `len` ASCII digits.
fn fixed_digits(s: &str, len: usize) -> Option<u16> {
    if s.len() != len || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

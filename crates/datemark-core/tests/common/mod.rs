//! Fixture builders shared by the integration tests.
//!
//! Images are generated on the fly so the tests need no binary fixtures.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use datemark_core::{BitmapFont, Config, ImageProcessor};
use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use image::{ImageFormat, Rgb, RgbImage};

/// Processor drawing with the embedded bitmap font, so results do not
/// depend on which system fonts are installed.
pub fn processor(config: &Config) -> ImageProcessor {
    ImageProcessor::with_font(config, Arc::new(BitmapFont))
}

pub fn write_png(path: &Path, width: u32, height: u32, fill: [u8; 3]) {
    ensure_parent(path);
    RgbImage::from_pixel(width, height, Rgb(fill))
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

/// Write a JPEG whose APP1 segment carries the given EXIF date tags.
pub fn write_jpeg_with_exif(path: &Path, width: u32, height: u32, tags: &[(Tag, &str)]) {
    ensure_parent(path);

    let mut jpeg = Cursor::new(Vec::new());
    RgbImage::from_pixel(width, height, Rgb([0, 0, 0]))
        .write_to(&mut jpeg, ImageFormat::Jpeg)
        .unwrap();
    let jpeg = jpeg.into_inner();

    let fields: Vec<Field> = tags
        .iter()
        .map(|(tag, value)| Field {
            tag: *tag,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![value.as_bytes().to_vec()]),
        })
        .collect();
    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    // SOI, APP1 "Exif\0\0" + TIFF, then the encoder's segments after its SOI
    let segment_len = (2 + 6 + tiff.len()) as u16;
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

pub fn write_bytes(path: &Path, bytes: &[u8]) {
    ensure_parent(path);
    std::fs::write(path, bytes).unwrap();
}

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
}

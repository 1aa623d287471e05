//! Shared test utilities for the dish-go test suite.
//!
//! Provides in-memory image builders for the imaging tests and canned
//! service responses for the generator tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let png = transparent_png(16, 16);
//! let ok = success(vec![sample_recipe("Tomato Soup")], false);
//! let err = failure("bad input", Some("VALIDATION"), None);
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use std::io::Cursor;

use crate::types::{CookingResponse, Difficulty, Recipe, ValidationError};

// =========================================================================
// Images
// =========================================================================

/// Encode an image as PNG bytes.
pub fn encode_png(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// A fully transparent RGBA PNG.
pub fn transparent_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(&DynamicImage::ImageRgba8(RgbaImage::new(width, height)))
}

/// Encode as JPEG with an EXIF APP1 segment carrying `orientation`
/// (1-8), placed right after SOI the way cameras write it.
pub fn jpeg_with_orientation(img: &DynamicImage, orientation: u16) -> Vec<u8> {
    let mut jpeg = Cursor::new(Vec::new());
    img.write_to(&mut jpeg, ImageFormat::Jpeg).unwrap();
    let jpeg = jpeg.into_inner();

    // Big-endian TIFF header, one IFD entry: 0x0112 SHORT x1
    let mut exif = b"Exif\0\0MM\0\x2a\0\0\0\x08\0\x01\x01\x12\0\x03\0\0\0\x01".to_vec();
    exif.extend_from_slice(&orientation.to_be_bytes());
    exif.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((exif.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&exif);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Left half red, right half blue, so rotations are visible.
pub fn split_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) }
    }))
}

// =========================================================================
// Service responses
// =========================================================================

pub fn sample_recipe(title: &str) -> Recipe {
    Recipe {
        title: title.to_string(),
        difficulty: Difficulty::Easy,
        cooking_time: 15,
        ingredients: vec!["tomato".into(), "onion".into()],
        instructions: vec!["1. Chop".into(), "2. Simmer".into()],
    }
}

pub fn success(recipes: Vec<Recipe>, cached: bool) -> CookingResponse {
    CookingResponse::Success {
        message: "ok".into(),
        recipes,
        cached,
    }
}

pub fn failure(
    message: &str,
    code: Option<&str>,
    errors: Option<Vec<ValidationError>>,
) -> CookingResponse {
    CookingResponse::Failure {
        message: message.to_string(),
        code: code.map(str::to_string),
        errors,
        error: None,
    }
}

//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image` crate, format sniffed from content |
//! | Decode (AVIF / AV1-coded HEIF) | `avif-parse` + `rav1d`, see [`heif`](super::heif) |
//! | EXIF orientation | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Flatten | `imageops::overlay` onto an opaque white canvas |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{Dimensions, ImageBackend, ImageError};
use super::container::{HeifBrand, sniff_heif_brand};
use super::heif::decode_heif;
use super::params::{Quality, RenderParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, ImageError> {
    Ok(ImageReader::new(Cursor::new(data)).with_guessed_format()?)
}

fn is_avif(data: &[u8]) -> bool {
    sniff_heif_brand(data) == Some(HeifBrand::Avif)
}

/// EXIF orientation as declared by the decoder; unreadable metadata counts
/// as upright.
fn orientation_of(decoder: &mut impl ImageDecoder) -> Orientation {
    decoder.orientation().unwrap_or(Orientation::NoTransforms)
}

/// Whether `orientation` swaps width and height when applied.
fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

/// Decode an in-memory image, detecting the format from its magic bytes,
/// and turn it upright according to its EXIF orientation.
fn load_image(data: &[u8]) -> Result<DynamicImage, ImageError> {
    if is_avif(data) {
        return decode_heif(data).map_err(|e| ImageError::Decode(e.to_string()));
    }
    let mut decoder = reader(data)?
        .into_decoder()
        .map_err(|e| ImageError::Decode(format!("Failed to decode image: {e}")))?;
    let orientation = orientation_of(&mut decoder);
    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| ImageError::Decode(format!("Failed to decode image: {e}")))?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Encode as baseline JPEG. JPEG has no alpha, so callers flatten first.
fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality.value());
    rgb.write_with_encoder(encoder)
        .map_err(|e| ImageError::Render(format!("JPEG encode failed: {e}")))?;
    Ok(out)
}

/// Composite `img` over an opaque canvas of `background`.
fn flatten(img: &DynamicImage, background: [u8; 3]) -> DynamicImage {
    let [r, g, b] = background;
    let mut canvas = RgbaImage::from_pixel(img.width(), img.height(), Rgba([r, g, b, 0xFF]));
    image::imageops::overlay(&mut canvas, &img.to_rgba8(), 0, 0);
    DynamicImage::ImageRgba8(canvas)
}

impl ImageBackend for RustBackend {
    /// Dimensions as displayed, after EXIF orientation.
    fn identify(&self, data: &[u8]) -> Result<Dimensions, ImageError> {
        if is_avif(data) {
            let img = load_image(data)?;
            return Ok(Dimensions {
                width: img.width(),
                height: img.height(),
            });
        }
        let mut decoder = reader(data)?
            .into_decoder()
            .map_err(|e| ImageError::Decode(format!("Failed to read dimensions: {e}")))?;
        let (width, height) = decoder.dimensions();
        if swaps_axes(orientation_of(&mut decoder)) {
            Ok(Dimensions {
                width: height,
                height: width,
            })
        } else {
            Ok(Dimensions { width, height })
        }
    }

    fn transcode_legacy(&self, data: &[u8], quality: Quality) -> Result<Vec<u8>, ImageError> {
        let img = decode_heif(data)?;
        encode_jpeg(&img, quality).map_err(|e| match e {
            ImageError::Render(msg) => ImageError::Transcode(msg),
            other => other,
        })
    }

    fn render(&self, params: &RenderParams) -> Result<Vec<u8>, ImageError> {
        if params.width == 0 || params.height == 0 {
            return Err(ImageError::Render(format!(
                "cannot allocate a {}x{} surface",
                params.width, params.height
            )));
        }
        let img = load_image(params.source)?;
        let resized = if (img.width(), img.height()) == (params.width, params.height) {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        encode_jpeg(&flatten(&resized, params.background), params.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::WHITE;
    use crate::test_helpers::{encode_png, jpeg_with_orientation, split_image, transparent_png};
    use image::{GenericImageView, Rgb, RgbImage};

    #[test]
    fn identify_png() {
        let png = encode_png(&DynamicImage::ImageRgb8(RgbImage::new(40, 30)));
        let dims = RustBackend::new().identify(&png).unwrap();
        assert_eq!(dims, Dimensions { width: 40, height: 30 });
    }

    #[test]
    fn identify_reports_displayed_dimensions_for_rotated_jpeg() {
        let backend = RustBackend::new();
        let img = split_image(200, 100);
        for (orientation, expected) in [(1, (200, 100)), (3, (200, 100)), (6, (100, 200)), (8, (100, 200))] {
            let jpeg = jpeg_with_orientation(&img, orientation);
            let dims = backend.identify(&jpeg).unwrap();
            assert_eq!((dims.width, dims.height), expected, "orientation {orientation}");
        }
    }

    #[test]
    fn render_applies_exif_rotation() {
        // Stored 200x100 with the red half on the left; orientation 6 turns
        // it clockwise, so red ends up on top of a 100x200 picture.
        let jpeg = jpeg_with_orientation(&split_image(200, 100), 6);
        let out = RustBackend::new()
            .render(&RenderParams {
                source: &jpeg,
                width: 50,
                height: 100,
                quality: Quality::new(95),
                background: WHITE,
            })
            .unwrap();

        let decoded = image::load_from_memory(&out).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (50, 100));
        let top = decoded.get_pixel(25, 15).0;
        let bottom = decoded.get_pixel(25, 85).0;
        assert!(top[0] > 200 && top[2] < 60, "expected red on top, got {top:?}");
        assert!(bottom[2] > 200 && bottom[0] < 60, "expected blue below, got {bottom:?}");
    }

    #[test]
    fn avif_bytes_are_routed_to_the_heif_decoder() {
        // An AVIF `ftyp` with no items: the `image` crate would report an
        // unsupported format; the HEIF path reports a broken container.
        let data = crate::imaging::container::ftyp_box(b"avif", &[b"mif1", b"miaf"]);
        let err = RustBackend::new().identify(&data).unwrap_err();
        assert!(
            matches!(err, ImageError::Decode(ref m) if m.contains("HEIF")),
            "{err}"
        );
    }

    #[test]
    fn identify_garbage_is_decode_error() {
        let err = RustBackend::new().identify(b"plain text").unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }

    #[test]
    fn render_resizes_and_encodes_jpeg() {
        let png = encode_png(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
            200,
            100,
            Rgb([200, 30, 30]),
        )));
        let jpeg = RustBackend::new()
            .render(&RenderParams {
                source: &png,
                width: 100,
                height: 50,
                quality: Quality::new(80),
                background: WHITE,
            })
            .unwrap();

        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (100, 50));
    }

    #[test]
    fn render_flattens_transparency_onto_white() {
        let png = transparent_png(16, 16);
        let jpeg = RustBackend::new()
            .render(&RenderParams {
                source: &png,
                width: 16,
                height: 16,
                quality: Quality::new(95),
                background: WHITE,
            })
            .unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap().to_rgb8();
        let px = decoded.get_pixel(8, 8);
        assert!(px.0.iter().all(|&c| c > 240), "expected white, got {px:?}");
    }

    #[test]
    fn render_zero_surface_is_render_error() {
        let png = transparent_png(4, 4);
        let err = RustBackend::new()
            .render(&RenderParams {
                source: &png,
                width: 0,
                height: 4,
                quality: Quality::default(),
                background: WHITE,
            })
            .unwrap_err();
        assert!(matches!(err, ImageError::Render(_)));
    }

    #[test]
    fn render_undecodable_is_decode_error() {
        let err = RustBackend::new()
            .render(&RenderParams {
                source: b"\x89PNG broken",
                width: 4,
                height: 4,
                quality: Quality::default(),
                background: WHITE,
            })
            .unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }

    #[test]
    fn transcode_rejects_non_heif() {
        let png = transparent_png(4, 4);
        let err = RustBackend::new()
            .transcode_legacy(&png, Quality::new(90))
            .unwrap_err();
        assert!(matches!(err, ImageError::Transcode(_)));
    }
}

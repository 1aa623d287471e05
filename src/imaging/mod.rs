//! Image normalization: pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Detect legacy container** | extension / MIME check, `ftyp` brand sniffing |
//! | **Transcode HEIF → JPEG** | `avif-parse` + `rav1d`, `JpegEncoder` |
//! | **Identify** | decoder dimensions, swapped for 90° EXIF orientations |
//! | **Fit + flatten + encode** | `apply_orientation`, `resize_exact` (Lanczos3), `overlay`, `JpegEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`normalize`] and friends, combining calculations + backend

pub mod backend;
mod calculations;
pub mod container;
mod heif;
pub mod operations;
mod params;
pub mod rust_backend;
mod source;

pub use backend::{Dimensions, IMAGE_FAILURE_MESSAGE, ImageBackend, ImageError};
pub use calculations::calculate_fit_dimensions;
pub use container::{HeifBrand, detect_legacy_container, sniff_heif_brand};
pub use operations::{
    NormalizedImage, normalize, normalize_file, normalize_source, transcode_legacy_container,
};
pub use params::{LEGACY_TRANSCODE_QUALITY, NormalizeParams, Quality, RenderParams};
pub use rust_backend::RustBackend;
pub use source::{SourceImage, guess_content_type};

//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take a
//! [`SourceImage`], compute parameters, and call the backend.

use super::backend::{ImageBackend, ImageError};
use super::calculations::calculate_fit_dimensions;
use super::container::detect_legacy_container;
use super::params::{LEGACY_TRANSCODE_QUALITY, NormalizeParams, RenderParams, WHITE};
use super::rust_backend::RustBackend;
use super::source::SourceImage;
use crate::encoding::{extract_base64_data, to_data_url};
use regex::Regex;
use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;
use std::time::SystemTime;
use tracing::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

static LEGACY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(heic|heif)$").expect("legacy suffix pattern is valid"));

/// Upload-ready payload produced by [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    /// Bare base64 JPEG, no `data:` prefix.
    pub base64: String,
    pub width: u32,
    pub height: u32,
    /// Dimensions of the decoded source before resizing.
    pub original: (u32, u32),
}

/// Convert a legacy container into a JPEG [`SourceImage`].
///
/// The name's `.heic`/`.heif` suffix becomes `.jpg` and the modification time
/// is the moment of conversion.
pub fn transcode_legacy_container(
    backend: &impl ImageBackend,
    source: &SourceImage,
) -> Result<SourceImage> {
    let jpeg = backend
        .transcode_legacy(&source.data, LEGACY_TRANSCODE_QUALITY)
        .map_err(|e| match e {
            ImageError::Transcode(_) => e,
            other => ImageError::Transcode(other.to_string()),
        })?;

    Ok(SourceImage {
        name: LEGACY_SUFFIX.replace(&source.name, ".jpg").into_owned(),
        content_type: Some("image/jpeg".to_string()),
        data: jpeg,
        last_modified: SystemTime::now(),
    })
}

/// Produce an upload payload that fits inside the service's size limit.
///
/// Legacy containers are transcoded first. The image is then shrunk to fit
/// `params`' bounding box (never enlarged), flattened onto white and
/// re-encoded as JPEG.
pub fn normalize(
    backend: &impl ImageBackend,
    source: &SourceImage,
    params: &NormalizeParams,
) -> Result<NormalizedImage> {
    let source = if detect_legacy_container(source) {
        debug!(name = %source.name, "legacy container detected, transcoding to JPEG");
        Cow::Owned(transcode_legacy_container(backend, source)?)
    } else {
        Cow::Borrowed(source)
    };

    let dims = backend.identify(&source.data)?;
    let (width, height) = calculate_fit_dimensions(
        (dims.width, dims.height),
        (params.max_width, params.max_height),
    );
    debug!(
        original = %format!("{}x{}", dims.width, dims.height),
        resized = %format!("{width}x{height}"),
        "computed target dimensions"
    );

    let jpeg = backend.render(&RenderParams {
        source: &source.data,
        width,
        height,
        quality: params.quality,
        background: WHITE,
    })?;

    let data_url = to_data_url("image/jpeg", &jpeg);
    let base64 = extract_base64_data(&data_url).to_string();
    debug!(kib = base64.len() / 1024, "encoded payload");

    Ok(NormalizedImage {
        base64,
        width,
        height,
        original: (dims.width, dims.height),
    })
}

/// Read a file and [`normalize`] it with the production backend.
///
/// Pixel work runs on tokio's blocking pool so the caller's executor stays
/// responsive.
pub async fn normalize_file(path: &Path, params: NormalizeParams) -> Result<NormalizedImage> {
    let source = SourceImage::open(path)
        .await
        .map_err(|e| ImageError::Decode(format!("Failed to read {}: {e}", path.display())))?;
    normalize_source(source, params).await
}

/// Async [`normalize`] of an already loaded source with the production backend.
pub async fn normalize_source(
    source: SourceImage,
    params: NormalizeParams,
) -> Result<NormalizedImage> {
    tokio::task::spawn_blocking(move || normalize(&RustBackend::new(), &source, &params))
        .await
        .map_err(|e| ImageError::Render(format!("image worker failed: {e}")))?
}

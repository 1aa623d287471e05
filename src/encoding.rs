//! Base64 transport encoding for image payloads.
//!
//! The service expects the bare base64 body. Data URLs are produced first
//! (`data:image/jpeg;base64,...`) and then stripped, so callers that already
//! hold a data URL can use [`extract_base64_data`] directly.

use crate::imaging::SourceImage;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Wrap raw bytes as a `data:` URL.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Return everything after the first comma, or the input unchanged when it
/// carries no prefix.
pub fn extract_base64_data(encoded: &str) -> &str {
    match encoded.split_once(',') {
        Some((_, data)) => data,
        None => encoded,
    }
}

/// Read a source image into a data URL using its declared content type.
pub fn file_to_data_url(source: &SourceImage) -> String {
    let mime = source
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    to_data_url(mime, &source.data)
}

/// Base64 of the file bytes as-is, without any resizing.
pub fn convert_image_to_base64(source: &SourceImage) -> String {
    extract_base64_data(&file_to_data_url(source)).to_string()
}

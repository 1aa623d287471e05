//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the normalizer
//! needs: identify, transcode the legacy container, and render. The
//! production implementation is [`RustBackend`](super::rust_backend::RustBackend).

use super::params::{Quality, RenderParams};
use thiserror::Error;

/// Shown to users for every image pipeline failure.
pub const IMAGE_FAILURE_MESSAGE: &str = "Image processing failed. Please try another photo.";

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Source unreadable or not a decodable image.
    #[error("Decode failed: {0}")]
    Decode(String),
    /// Legacy container could not be converted.
    #[error("Transcode failed: {0}")]
    Transcode(String),
    /// Drawing surface or final encode failed.
    #[error("Render failed: {0}")]
    Render(String),
}

impl ImageError {
    /// User-facing text; the detail stays in the `Display` form for logs.
    pub fn user_message(&self) -> &'static str {
        IMAGE_FAILURE_MESSAGE
    }
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Decode enough of `data` to learn its pixel dimensions.
    fn identify(&self, data: &[u8]) -> Result<Dimensions, ImageError>;

    /// Convert a legacy-container file into JPEG bytes.
    fn transcode_legacy(&self, data: &[u8], quality: Quality) -> Result<Vec<u8>, ImageError>;

    /// Flatten onto the background, resize and encode as JPEG.
    fn render(&self, params: &RenderParams) -> Result<Vec<u8>, ImageError>;
}

//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`operations`](super::operations), which decides the
//! target size, and the [`backend`](super::backend), which does the pixel work.
//!
//! - [`Quality`]: JPEG quality (1-100). Clamped on construction.
//! - [`NormalizeParams`]: bounding box and quality for upload payloads.
//! - [`RenderParams`]: one flatten-resize-encode pass over decoded bytes.

/// Quality setting for lossy JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    /// Build from a `0.0..=1.0` fraction, the scale browsers use for
    /// `toDataURL`. Out-of-range and NaN inputs clamp.
    pub fn from_fraction(fraction: f32) -> Self {
        if fraction.is_nan() {
            return Self::default();
        }
        Self::new((fraction.clamp(0.0, 1.0) * 100.0).round() as u32)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Quality used when transcoding the legacy container to JPEG.
pub const LEGACY_TRANSCODE_QUALITY: Quality = Quality(90);

/// Opaque white, painted under every rendered image.
pub const WHITE: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// Bounding box and quality for [`normalize`](super::operations::normalize).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeParams {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            max_width: 1024,
            max_height: 1024,
            quality: Quality::default(),
        }
    }
}

/// Parameters for a single render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams<'a> {
    /// Encoded source bytes in a format the backend decodes natively.
    pub source: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    /// Fill colour composited beneath the source.
    pub background: [u8; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_from_fraction() {
        assert_eq!(Quality::from_fraction(0.8).value(), 80);
        assert_eq!(Quality::from_fraction(0.9).value(), 90);
        assert_eq!(Quality::from_fraction(1.5).value(), 100);
        assert_eq!(Quality::from_fraction(0.0).value(), 1);
        assert_eq!(Quality::from_fraction(f32::NAN).value(), 80);
    }

    #[test]
    fn normalize_defaults() {
        let p = NormalizeParams::default();
        assert_eq!((p.max_width, p.max_height), (1024, 1024));
        assert_eq!(p.quality.value(), 80);
    }
}

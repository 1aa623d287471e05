//! Legacy container detection.
//!
//! Phones save HEIF/HEIC by default, which general-purpose decoders cannot
//! read. [`detect_legacy_container`] decides from the file's name and declared
//! type (cheap, no I/O); [`sniff_heif_brand`] inspects the ISO-BMFF `ftyp` box
//! to tell AV1-coded HEIF (decodable) from HEVC-coded HEIF (not decodable).

use super::source::SourceImage;

const LEGACY_EXTENSIONS: &[&str] = &["heic", "heif"];
const LEGACY_MIME_TYPES: &[&str] = &["image/heic", "image/heif"];

const HEVC_BRANDS: &[&[u8; 4]] = &[b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis"];
const AVIF_BRANDS: &[&[u8; 4]] = &[b"avif", b"avis"];

/// Coding used inside a HEIF container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeifBrand {
    /// AV1 image items.
    Avif,
    /// HEVC image items.
    Hevc,
    /// Generic `mif1`/`msf1` with no coding-specific brand.
    Generic,
}

/// Whether `source` is a legacy container that needs transcoding.
pub fn detect_legacy_container(source: &SourceImage) -> bool {
    let by_extension = source
        .extension()
        .is_some_and(|ext| LEGACY_EXTENSIONS.contains(&ext.as_str()));
    let by_type = source.content_type.as_deref().is_some_and(|t| {
        LEGACY_MIME_TYPES
            .iter()
            .any(|legacy| t.eq_ignore_ascii_case(legacy))
    });
    by_extension || by_type
}

/// Classify the `ftyp` brands of an ISO-BMFF file.
///
/// Returns `None` when the data does not start with an `ftyp` box or lists no
/// HEIF brand at all.
pub fn sniff_heif_brand(data: &[u8]) -> Option<HeifBrand> {
    if data.len() < 16 || &data[4..8] != b"ftyp" {
        return None;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let end = box_size.clamp(16, data.len());

    // major brand at 8..12, minor version at 12..16, compatible brands after
    let brands = std::iter::once(&data[8..12]).chain(data[16..end].chunks_exact(4));

    let mut generic = false;
    let mut avif = false;
    for brand in brands {
        if AVIF_BRANDS.iter().any(|b| b.as_slice() == brand) {
            avif = true;
        } else if HEVC_BRANDS.iter().any(|b| b.as_slice() == brand) {
            // HEVC wins over a compatible AVIF brand; the primary item is HEVC.
            return Some(HeifBrand::Hevc);
        } else if brand == b"mif1" || brand == b"msf1" {
            generic = true;
        }
    }

    if avif {
        Some(HeifBrand::Avif)
    } else if generic {
        Some(HeifBrand::Generic)
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) fn ftyp_box(major: &[u8; 4], compatible: &[&[u8; 4]]) -> Vec<u8> {
    let size = 16 + compatible.len() * 4;
    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(&(size as u32).to_be_bytes());
    out.extend_from_slice(b"ftyp");
    out.extend_from_slice(major);
    out.extend_from_slice(&0u32.to_be_bytes());
    for brand in compatible {
        out.extend_from_slice(*brand);
    }
    out
}

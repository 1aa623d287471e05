//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `original` inside `(max_width, max_height)` preserving aspect ratio.
///
/// The dominant edge decides which bound applies: landscape and square
/// images are clamped on width, portrait images on height. Images already
/// inside the bound pass through untouched; nothing is ever upscaled.
///
/// # Examples
/// ```
/// # use dish_go::imaging::calculate_fit_dimensions;
/// assert_eq!(calculate_fit_dimensions((4032, 3024), (1024, 1024)), (1024, 768));
/// assert_eq!(calculate_fit_dimensions((600, 800), (1024, 1024)), (600, 800));
/// ```
pub fn calculate_fit_dimensions(original: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (width, height) = original;
    let (max_width, max_height) = max;

    if width >= height {
        if width > max_width {
            let h = scale_edge(height, max_width, width);
            return (max_width.max(1), h);
        }
    } else if height > max_height {
        let w = scale_edge(width, max_height, height);
        return (w, max_height.max(1));
    }

    (width, height)
}

/// `round(edge * numerator / denominator)`, never below one pixel.
fn scale_edge(edge: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = (edge as f64 * numerator as f64 / denominator as f64).round() as u32;
    scaled.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX: (u32, u32) = (1024, 1024);

    #[test]
    fn landscape_clamped_on_width() {
        // 4032x3024 phone photo → 1024 x round(3024 * 1024 / 4032) = 768
        assert_eq!(calculate_fit_dimensions((4032, 3024), BOX), (1024, 768));
    }

    #[test]
    fn portrait_clamped_on_height() {
        assert_eq!(calculate_fit_dimensions((3024, 4032), BOX), (768, 1024));
    }

    #[test]
    fn square_clamped_on_width() {
        assert_eq!(calculate_fit_dimensions((2048, 2048), (1000, 500)), (1000, 1000));
    }

    #[test]
    fn rounds_to_nearest() {
        // 1500 * 1024 / 2000 = 768; 1333 * 1024 / 2000 = 682.496 → 682
        assert_eq!(calculate_fit_dimensions((2000, 1500), BOX), (1024, 768));
        assert_eq!(calculate_fit_dimensions((2000, 1333), BOX), (1024, 682));
        // 1335 * 1024 / 2000 = 683.52 → 684
        assert_eq!(calculate_fit_dimensions((2000, 1335), BOX), (1024, 684));
    }

    #[test]
    fn within_bounds_passes_through() {
        assert_eq!(calculate_fit_dimensions((800, 600), BOX), (800, 600));
        assert_eq!(calculate_fit_dimensions((1024, 1024), BOX), (1024, 1024));
        assert_eq!(calculate_fit_dimensions((1, 1), BOX), (1, 1));
    }

    #[test]
    fn never_upscales() {
        for dims in [(10, 20), (640, 480), (1024, 7), (3, 1024)] {
            let (w, h) = calculate_fit_dimensions(dims, BOX);
            assert!(w <= dims.0 && h <= dims.1, "{dims:?} grew to {w}x{h}");
        }
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        assert_eq!(calculate_fit_dimensions((10_000, 1), BOX), (1024, 1));
        assert_eq!(calculate_fit_dimensions((1, 10_000), BOX), (1, 1024));
    }

    #[test]
    fn asymmetric_box_uses_dominant_edge() {
        // Landscape uses max_width only
        assert_eq!(calculate_fit_dimensions((1600, 1200), (800, 400)), (800, 600));
        // Portrait uses max_height only
        assert_eq!(calculate_fit_dimensions((1200, 1600), (400, 800)), (600, 800));
    }
}

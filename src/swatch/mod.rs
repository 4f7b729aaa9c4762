//! Palette extraction
//!
//! The color quantizer is a capability behind the `Quantizer` trait so the
//! controller can be driven by a test double. `kmeans.rs` holds the default
//! implementation.

pub mod kmeans;

use image::RgbaImage;
use std::collections::HashSet;

use crate::color::Swatch;
use crate::error::EditorError;

pub use kmeans::KmeansQuantizer;

/// A color quantization capability
pub trait Quantizer: Send + Sync {
    /// Up to `count` representative colors, most dominant first
    fn quantize(&self, image: &RgbaImage, count: usize) -> Result<Vec<Swatch>, EditorError>;
}

/// Extract at most `count` distinct swatches from `image`.
///
/// Order follows the quantizer's dominance ranking; later duplicates are
/// dropped. Every failure is reported as `EditorError::Extraction`.
pub fn extract(
    image: &RgbaImage,
    count: usize,
    quantizer: &dyn Quantizer,
) -> Result<Vec<Swatch>, EditorError> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let colors = quantizer.quantize(image, count).map_err(|err| match err {
        EditorError::Extraction(_) => err,
        other => EditorError::Extraction(other.to_string()),
    })?;

    let mut seen = HashSet::new();
    Ok(colors
        .into_iter()
        .filter(|swatch| seen.insert(*swatch))
        .take(count)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Swatch>);

    impl Quantizer for Fixed {
        fn quantize(&self, _image: &RgbaImage, _count: usize) -> Result<Vec<Swatch>, EditorError> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl Quantizer for Broken {
        fn quantize(&self, _image: &RgbaImage, _count: usize) -> Result<Vec<Swatch>, EditorError> {
            Err(EditorError::Render("no pixels".to_string()))
        }
    }

    #[test]
    fn test_truncates_and_dedups_in_order() {
        let a = Swatch::new(1, 1, 1);
        let b = Swatch::new(2, 2, 2);
        let c = Swatch::new(3, 3, 3);
        let quantizer = Fixed(vec![a, b, a, c, b]);

        let image = RgbaImage::new(1, 1);
        assert_eq!(extract(&image, 5, &quantizer).unwrap(), vec![a, b, c]);
        assert_eq!(extract(&image, 2, &quantizer).unwrap(), vec![a, b]);
        assert!(extract(&image, 0, &quantizer).unwrap().is_empty());
    }

    #[test]
    fn test_errors_become_extraction_errors() {
        let err = extract(&RgbaImage::new(1, 1), 5, &Broken).unwrap_err();
        assert!(matches!(err, EditorError::Extraction(_)));
    }
}

//! CPU render pipeline for tone adjustments
//!
//! Each call allocates a fresh output surface sized to the source image, so
//! no state is shared between renders.

use image::{Rgba, RgbaImage};

use crate::color::ToneTransform;
use crate::error::EditorError;
use crate::state::edit::FilterSettings;

/// Render `source` through the filter settings.
///
/// The output is a pure function of `(source, filters)`: identical inputs
/// always produce identical pixels. Alpha is passed through untouched.
///
/// # Returns
/// * `Ok(image)` - the filtered image, same dimensions as `source`
/// * `Err(Render)` - the output surface could not be created
pub fn render(source: &RgbaImage, filters: &FilterSettings) -> Result<RgbaImage, EditorError> {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(EditorError::Render("cannot render an empty image".to_string()));
    }

    let transform = ToneTransform::from_filters(filters);
    if transform.is_identity() {
        return Ok(source.clone());
    }

    let mut surface = RgbaImage::new(width, height);
    for (out, src) in surface.pixels_mut().zip(source.pixels()) {
        let Rgba([r, g, b, a]) = *src;
        let [r, g, b] = transform.apply([r, g, b]);
        *out = Rgba([r, g, b, a]);
    }

    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::edit::Filter;

    fn gray(width: u32, height: u32, value: u8) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([value, value, value, 255]))
    }

    fn gradient() -> RgbaImage {
        RgbaImage::from_fn(16, 8, |x, y| Rgba([(x * 16) as u8, (y * 30) as u8, 200, 255]))
    }

    #[test]
    fn test_render_is_deterministic() {
        let source = gradient();
        let mut filters = FilterSettings::default();
        filters.set(Filter::Brightness, -17);
        filters.set(Filter::Contrast, 22);
        filters.set(Filter::Saturation, -5);

        let first = render(&source, &filters).unwrap();
        let second = render(&source, &filters).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_brightness_lifts_mid_gray_then_reset_restores() {
        let source = gray(4, 4, 128);
        let mut filters = FilterSettings::default();
        filters.set(Filter::Brightness, 40);

        let bright = render(&source, &filters).unwrap();
        for (out, src) in bright.pixels().zip(source.pixels()) {
            assert!(out[0] > src[0]);
            assert_eq!(out[0], out[1]);
            assert_eq!(out[1], out[2]);
        }

        filters.reset();
        let restored = render(&source, &filters).unwrap();
        assert_eq!(restored, source);
    }

    #[test]
    fn test_alpha_is_preserved() {
        let mut source = gradient();
        source.put_pixel(3, 3, Rgba([40, 50, 60, 0]));
        let mut filters = FilterSettings::default();
        filters.set(Filter::Contrast, 30);

        let out = render(&source, &filters).unwrap();
        assert_eq!(out.get_pixel(3, 3)[3], 0);
        assert_eq!(out.get_pixel(0, 0)[3], 255);
        assert_eq!(out.dimensions(), source.dimensions());
    }

    #[test]
    fn test_empty_image_is_render_error() {
        let err = render(&RgbaImage::new(0, 0), &FilterSettings::default()).unwrap_err();
        assert!(matches!(err, EditorError::Render(_)));
    }
}

//! Color utilities
//!
//! This module handles:
//! - Palette swatches and their hex representation
//! - The fused tone transform (brightness, contrast, saturation) used by the
//!   render pipeline

use cgmath::{Matrix3, SquareMatrix, Vector3};
use std::fmt;

use crate::state::edit::FilterSettings;

/// Rec. 709 luma weights used by the CSS `saturate()` filter
const LUMA_R: f32 = 0.213;
const LUMA_G: f32 = 0.715;
const LUMA_B: f32 = 0.072;

/// A single palette color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swatch {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Swatch {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uppercase `#RRGGBB`
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Swatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl From<[u8; 3]> for Swatch {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// Brightness, contrast and saturation collapsed into one affine transform.
///
/// For a normalized color `x` the output is `matrix * x + offset`, clamped to
/// `[0, 1]` once at the end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneTransform {
    matrix: Matrix3<f32>,
    offset: f32,
}

impl ToneTransform {
    /// Build the transform for a set of filter values
    ///
    /// # Algorithm
    /// 1. brightness: `x * b`
    /// 2. contrast: `x * c + 0.5 * (1 - c)`
    /// 3. saturate: W3C saturation matrix `S`
    ///
    /// Because every row of `S` sums to 1, `S` leaves the gray contrast
    /// offset unchanged, so the composite is `(S * c * b) x + 0.5 * (1 - c)`.
    pub fn from_filters(filters: &FilterSettings) -> Self {
        // Exact identity; the float composite is only approximately so
        if filters.is_unedited() {
            return Self::identity();
        }

        let (brightness, contrast, saturation) = filters.percentages();
        let b = brightness as f32 / 100.0;
        let c = contrast as f32 / 100.0;
        let s = saturation as f32 / 100.0;

        let matrix = saturation_matrix(s) * (c * b);
        let offset = 0.5 * (1.0 - c);

        Self { matrix, offset }
    }

    /// The transform that leaves every pixel unchanged
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
            offset: 0.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.offset == 0.0 && self.matrix == Matrix3::identity()
    }

    /// Apply to one 8-bit RGB triple
    pub fn apply(&self, rgb: [u8; 3]) -> [u8; 3] {
        let input = Vector3::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        );
        let out = self.matrix * input;
        [
            to_channel(out.x + self.offset),
            to_channel(out.y + self.offset),
            to_channel(out.z + self.offset),
        ]
    }
}

/// The CSS `saturate(s)` matrix (Filter Effects Module Level 1)
fn saturation_matrix(s: f32) -> Matrix3<f32> {
    // cgmath is column-major: each Vector3 below is one column
    Matrix3::from_cols(
        Vector3::new(LUMA_R + (1.0 - LUMA_R) * s, LUMA_R - LUMA_R * s, LUMA_R - LUMA_R * s),
        Vector3::new(LUMA_G - LUMA_G * s, LUMA_G + (1.0 - LUMA_G) * s, LUMA_G - LUMA_G * s),
        Vector3::new(LUMA_B - LUMA_B * s, LUMA_B - LUMA_B * s, LUMA_B + (1.0 - LUMA_B) * s),
    )
}

fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

//! Edge flood-fill segmenter (test double)
//!
//! Deterministic stand-in for the model segmenter so the controller can be
//! exercised end to end without ONNX Runtime. Only handles flat backdrops:
//! 1. Estimate the backdrop color from the most common border color
//! 2. Flood fill (4-connected) from border pixels close to that color
//! 3. Clear alpha on every filled pixel
//!
//! Regions of backdrop color that are enclosed by the subject stay opaque.

use image::{Rgba, RgbaImage};
use std::collections::{HashMap, VecDeque};

use super::{CancelToken, SegmentOptions, Segmenter};
use crate::codec::export::encode_png;
use crate::error::EditorError;

/// Max RGB distance from the backdrop color
const DEFAULT_TOLERANCE: f32 = 48.0;

/// How many pixels are filled between cancellation checks
const CANCEL_CHECK_INTERVAL: usize = 4096;

#[derive(Debug, Clone)]
pub struct EdgeFloodSegmenter {
    /// Max RGB distance from the backdrop color
    tolerance: f32,
}

impl EdgeFloodSegmenter {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    /// Compute which pixels belong to the backdrop (row-major)
    fn background_mask(&self, image: &RgbaImage, cancel: &CancelToken) -> Result<Vec<bool>, EditorError> {
        let (width, height) = image.dimensions();
        let key = backdrop_color(image);
        let is_backdrop = |px: &Rgba<u8>| px[3] == 0 || distance(px, key) <= self.tolerance;

        let mut mask = vec![false; (width * height) as usize];
        let mut queue = VecDeque::new();

        for (x, y) in border_coords(width, height) {
            let idx = (y * width + x) as usize;
            if !mask[idx] && is_backdrop(image.get_pixel(x, y)) {
                mask[idx] = true;
                queue.push_back((x, y));
            }
        }

        let mut filled = 0usize;
        while let Some((x, y)) = queue.pop_front() {
            filled += 1;
            if filled % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(EditorError::Segmentation("cancelled".to_string()));
            }

            let neighbors = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbors {
                if nx >= width || ny >= height {
                    continue;
                }
                let idx = (ny * width + nx) as usize;
                if !mask[idx] && is_backdrop(image.get_pixel(nx, ny)) {
                    mask[idx] = true;
                    queue.push_back((nx, ny));
                }
            }
        }

        Ok(mask)
    }
}

impl Default for EdgeFloodSegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl Segmenter for EdgeFloodSegmenter {
    fn segment(
        &self,
        input: &[u8],
        _options: &SegmentOptions,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, EditorError> {
        if cancel.is_cancelled() {
            return Err(EditorError::Segmentation("cancelled".to_string()));
        }

        let mut image = image::load_from_memory(input)
            .map_err(|e| EditorError::Segmentation(format!("unreadable input: {e}")))?
            .to_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(EditorError::Segmentation("image has no pixels".to_string()));
        }

        let mask = self.background_mask(&image, cancel)?;
        let cleared = mask.iter().filter(|&&bg| bg).count();
        for (pixel, &background) in image.pixels_mut().zip(mask.iter()) {
            if background {
                pixel[3] = 0;
            }
        }

        log::debug!("flood segmenter cleared {} of {} pixels", cleared, mask.len());
        encode_png(&image)
    }
}

/// Every border pixel exactly once
fn border_coords(width: u32, height: u32) -> Vec<(u32, u32)> {
    let mut coords = Vec::new();
    for x in 0..width {
        coords.push((x, 0));
        if height > 1 {
            coords.push((x, height - 1));
        }
    }
    for y in 1..height.saturating_sub(1) {
        coords.push((0, y));
        if width > 1 {
            coords.push((width - 1, y));
        }
    }
    coords
}

/// Average color of the most common coarse border color bucket
fn backdrop_color(image: &RgbaImage) -> [f32; 3] {
    // bucket -> (count, channel sums)
    let mut buckets: HashMap<[u8; 3], (u32, [u64; 3])> = HashMap::new();
    for (x, y) in border_coords(image.width(), image.height()) {
        let px = image.get_pixel(x, y);
        if px[3] == 0 {
            continue;
        }
        let entry = buckets
            .entry([px[0] >> 4, px[1] >> 4, px[2] >> 4])
            .or_insert((0, [0; 3]));
        entry.0 += 1;
        for c in 0..3 {
            entry.1[c] += px[c] as u64;
        }
    }

    buckets
        .into_iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then_with(|| b.0.cmp(&a.0)))
        .map(|(_, (count, sums))| {
            [
                sums[0] as f32 / count as f32,
                sums[1] as f32 / count as f32,
                sums[2] as f32 / count as f32,
            ]
        })
        .unwrap_or([255.0, 255.0, 255.0])
}

fn distance(px: &Rgba<u8>, key: [f32; 3]) -> f32 {
    let dr = px[0] as f32 - key[0];
    let dg = px[1] as f32 - key[1];
    let db = px[2] as f32 - key[2];
    (dr * dr + dg * dg + db * db).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([250, 250, 250, 255]);
    const RED: Rgba<u8> = Rgba([200, 20, 20, 255]);

    fn segment(image: &RgbaImage) -> RgbaImage {
        let png = encode_png(image).unwrap();
        let out = EdgeFloodSegmenter::default()
            .segment(&png, &SegmentOptions::default(), &CancelToken::new())
            .unwrap();
        image::load_from_memory(&out).unwrap().to_rgba8()
    }

    #[test]
    fn test_border_coords_unique() {
        let coords = border_coords(4, 3);
        assert_eq!(coords.len(), 10);
        assert_eq!(border_coords(1, 1), vec![(0, 0)]);
        assert_eq!(border_coords(3, 1).len(), 3);
    }

    #[test]
    fn test_clears_backdrop_keeps_subject() {
        let image = RgbaImage::from_fn(10, 10, |x, y| {
            if (3..7).contains(&x) && (3..7).contains(&y) {
                RED
            } else {
                WHITE
            }
        });

        let out = segment(&image);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(9, 5)[3], 0);
        assert_eq!(out.get_pixel(2, 2)[3], 0);
        assert_eq!(out.get_pixel(5, 5), &RED);
        assert_eq!(out.get_pixel(3, 6), &RED);
    }

    #[test]
    fn test_enclosed_backdrop_color_stays_opaque() {
        // A red ring with a white hole in the middle
        let image = RgbaImage::from_fn(12, 12, |x, y| {
            let in_ring = (2..10).contains(&x) && (2..10).contains(&y);
            let in_hole = (4..8).contains(&x) && (4..8).contains(&y);
            if in_ring && !in_hole {
                RED
            } else {
                WHITE
            }
        });

        let out = segment(&image);
        assert_eq!(out.get_pixel(0, 11)[3], 0);
        assert_eq!(out.get_pixel(5, 5), &WHITE);
        assert_eq!(out.get_pixel(2, 2), &RED);
    }

    #[test]
    fn test_backdrop_color_uses_majority_bucket() {
        let mut image = RgbaImage::from_pixel(5, 5, WHITE);
        image.put_pixel(0, 0, RED);
        let key = backdrop_color(&image);
        assert_eq!(key, [250.0, 250.0, 250.0]);
    }

    #[test]
    fn test_cancelled_before_start() {
        let png = encode_png(&RgbaImage::from_pixel(2, 2, WHITE)).unwrap();
        let token = CancelToken::new();
        token.cancel();

        let err = EdgeFloodSegmenter::default()
            .segment(&png, &SegmentOptions::default(), &token)
            .unwrap_err();
        assert!(matches!(err, EditorError::Segmentation(_)));
    }

    #[test]
    fn test_rejects_unreadable_input() {
        let err = EdgeFloodSegmenter::default()
            .segment(b"nope", &SegmentOptions::default(), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, EditorError::Segmentation(_)));
    }
}

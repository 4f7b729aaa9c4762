//! k-means color quantizer
//!
//! Clusters opaque pixels in Lab space with `kmeans_colors` and ranks the
//! clusters by population. Images with no more distinct colors than requested
//! skip clustering and report their exact colors.

use image::{imageops::FilterType, RgbaImage};
use kmeans_colors::get_kmeans;
use palette::{IntoColor, Lab, LinSrgb, Srgb};
use std::collections::HashMap;

use super::Quantizer;
use crate::color::Swatch;
use crate::config::QuantizerConfig;
use crate::error::EditorError;

#[derive(Debug, Clone, Default)]
pub struct KmeansQuantizer {
    config: QuantizerConfig,
}

impl KmeansQuantizer {
    pub fn new(config: QuantizerConfig) -> Self {
        Self { config }
    }

    /// Downscale so the longest side is at most `sample_edge` (nearest-neighbour)
    fn sample(&self, image: &RgbaImage) -> RgbaImage {
        let (width, height) = image.dimensions();
        let max_side = width.max(height);
        if max_side <= self.config.sample_edge {
            return image.clone();
        }

        let ratio = self.config.sample_edge as f32 / max_side as f32;
        let w = ((width as f32) * ratio).round().max(1.0) as u32;
        let h = ((height as f32) * ratio).round().max(1.0) as u32;
        image::imageops::resize(image, w, h, FilterType::Nearest)
    }

    fn cluster(&self, image: &RgbaImage, count: usize) -> Vec<Swatch> {
        let mut lab_pixels: Vec<Lab> = Vec::new();
        for pixel in image.pixels() {
            if pixel[3] == 0 {
                continue;
            }
            let linear: LinSrgb<f32> = Srgb::<u8>::new(pixel[0], pixel[1], pixel[2]).into_linear();
            lab_pixels.push(linear.into_color());
        }

        let kmeans = get_kmeans(
            count,
            self.config.max_iter,
            self.config.converge,
            false,
            &lab_pixels,
            self.config.seed,
        );

        let mut population = vec![0usize; kmeans.centroids.len()];
        for &index in &kmeans.indices {
            population[index as usize] += 1;
        }

        let mut ranked: Vec<usize> = (0..kmeans.centroids.len())
            .filter(|&i| population[i] > 0)
            .collect();
        ranked.sort_by(|&a, &b| population[b].cmp(&population[a]).then(a.cmp(&b)));

        ranked
            .into_iter()
            .map(|i| {
                let linear: LinSrgb<f32> = kmeans.centroids[i].into_color();
                let rgb: Srgb<u8> = Srgb::<f32>::from_linear(linear).into_format();
                Swatch::new(rgb.red, rgb.green, rgb.blue)
            })
            .collect()
    }
}

impl Quantizer for KmeansQuantizer {
    fn quantize(&self, image: &RgbaImage, count: usize) -> Result<Vec<Swatch>, EditorError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let exact = opaque_histogram(image);
        if exact.len() <= count {
            return Ok(rank_by_count(exact));
        }

        // Sampling can collapse colors; re-check before clustering
        let sample = self.sample(image);
        let sampled = opaque_histogram(&sample);
        if sampled.len() <= count {
            return Ok(rank_by_count(sampled));
        }

        Ok(self.cluster(&sample, count))
    }
}

/// Pixel count per distinct opaque RGB color
fn opaque_histogram(image: &RgbaImage) -> HashMap<[u8; 3], usize> {
    let mut histogram = HashMap::new();
    for pixel in image.pixels() {
        if pixel[3] == 0 {
            continue;
        }
        *histogram.entry([pixel[0], pixel[1], pixel[2]]).or_insert(0) += 1;
    }
    histogram
}

/// Most frequent first, ties broken by channel value
fn rank_by_count(histogram: HashMap<[u8; 3], usize>) -> Vec<Swatch> {
    let mut colors: Vec<([u8; 3], usize)> = histogram.into_iter().collect();
    colors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    colors.into_iter().map(|(rgb, _)| Swatch::from(rgb)).collect()
}

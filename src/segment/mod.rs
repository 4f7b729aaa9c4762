//! Background removal adapter
//!
//! The segmentation model is a capability behind the `Segmenter` trait: it
//! receives an encoded image and returns an encoded image whose background
//! pixels are transparent. `remove_background` handles the conversions on
//! either side and folds every failure into `EditorError::Segmentation`.
//!
//! - `model.rs` - default segmenter (ISNet via `bg_remove_core`)
//! - `flood.rs` - edge flood fill used as a test double

#[cfg(test)]
pub mod flood;
pub mod model;

use image::RgbaImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::codec::export::encode_png;
use crate::error::EditorError;

#[cfg(test)]
pub use flood::EdgeFloodSegmenter;
pub use model::ModelSegmenter;

/// Encoded output requested from the segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
}

impl OutputFormat {
    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
        }
    }
}

/// Options forwarded to the segmenter with every call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentOptions {
    pub format: OutputFormat,
    /// Encoder quality in `[0, 1]`
    pub quality: f32,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: 0.92,
        }
    }
}

/// Shared flag used to abandon a job whose result is no longer wanted
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A background segmentation capability
pub trait Segmenter: Send + Sync {
    /// Return `input` re-encoded with background pixels made transparent.
    ///
    /// Implementations should poll `cancel` during long work and bail out
    /// with an error once it is set.
    fn segment(
        &self,
        input: &[u8],
        options: &SegmentOptions,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, EditorError>;
}

/// Run `segmenter` over an in-memory image.
///
/// # Arguments
/// * `image` - the current base image
/// * `file_hint` - original file name, only used for logging
///
/// # Returns
/// * `Ok(image)` - the segmented image, decoded back to RGBA
/// * `Err(Segmentation)` - any failure in encode, segment or decode
pub fn remove_background(
    image: &RgbaImage,
    file_hint: Option<&str>,
    segmenter: &dyn Segmenter,
    options: &SegmentOptions,
    cancel: &CancelToken,
) -> Result<RgbaImage, EditorError> {
    let input = encode_png(image).map_err(into_segmentation)?;
    log::info!(
        "removing background from {} ({} bytes, {}, quality {:.2})",
        file_hint.unwrap_or("image"),
        input.len(),
        options.format.mime(),
        options.quality
    );

    let output = segmenter
        .segment(&input, options, cancel)
        .map_err(into_segmentation)?;

    if cancel.is_cancelled() {
        return Err(EditorError::Segmentation("cancelled".to_string()));
    }

    let segmented = image::load_from_memory(&output)
        .map_err(|e| EditorError::Segmentation(format!("unreadable segmenter output: {e}")))?
        .to_rgba8();

    Ok(segmented)
}

fn into_segmentation(err: EditorError) -> EditorError {
    match err {
        EditorError::Segmentation(_) => err,
        other => EditorError::Segmentation(other.to_string()),
    }
}

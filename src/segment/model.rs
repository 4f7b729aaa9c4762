//! Learned background segmentation
//!
//! Adapter over `bg_remove_core` (ISNet on ONNX Runtime). The image processor
//! is built on first use and kept, so the model is loaded once per run and
//! rebuilt only when the requested output options change.

use bg_remove_core::{
    get_available_embedded_models, ExecutionProvider, ImageProcessor, ModelManager, ModelSource,
    ModelSpec, OutputFormat as RemovalFormat, RemovalConfig,
};
use std::path::PathBuf;
use std::sync::Mutex;

use super::{CancelToken, OutputFormat, SegmentOptions, Segmenter};
use crate::codec::export::encode_png;
use crate::config::SegmentationConfig;
use crate::error::EditorError;

pub struct ModelSegmenter {
    /// External ONNX model; `None` selects the first embedded model
    model: Option<PathBuf>,
    provider: ExecutionProvider,
    processor: Mutex<Option<(SegmentOptions, ImageProcessor)>>,
}

impl ModelSegmenter {
    pub fn new(model: Option<PathBuf>, provider: ExecutionProvider) -> Self {
        Self {
            model,
            provider,
            processor: Mutex::new(None),
        }
    }

    /// Build from config; an unknown provider name falls back to `auto`
    pub fn from_config(config: &SegmentationConfig) -> Self {
        let provider = parse_provider(&config.execution_provider).unwrap_or_else(|err| {
            log::warn!("{}; using auto", err);
            ExecutionProvider::Auto
        });
        Self::new(config.model.clone(), provider)
    }

    fn model_spec(&self) -> Result<ModelSpec, EditorError> {
        let source = match &self.model {
            Some(path) => ModelSource::External(path.clone()),
            None => {
                let name = get_available_embedded_models()
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        EditorError::Segmentation(
                            "no embedded model available; set segmentation.model".to_string(),
                        )
                    })?;
                ModelSource::Embedded(name)
            }
        };

        Ok(ModelSpec {
            source,
            variant: None,
        })
    }

    fn build_processor(&self, options: &SegmentOptions) -> Result<ImageProcessor, EditorError> {
        let quality = quality_percent(options.quality);
        let format = match options.format {
            OutputFormat::Png => RemovalFormat::Png,
        };

        let config = RemovalConfig::builder()
            .execution_provider(self.provider.clone())
            .output_format(format)
            .jpeg_quality(quality)
            .webp_quality(quality)
            .build()
            .map_err(model_error)?;

        let spec = self.model_spec()?;
        match &self.model {
            Some(path) => log::info!("loading segmentation model {}", path.display()),
            None => log::info!("loading embedded segmentation model"),
        }
        let manager = ModelManager::from_spec(&spec).map_err(model_error)?;
        ImageProcessor::with_model_manager(&config, manager).map_err(model_error)
    }
}

impl Default for ModelSegmenter {
    fn default() -> Self {
        Self::from_config(&SegmentationConfig::default())
    }
}

impl Segmenter for ModelSegmenter {
    fn segment(
        &self,
        input: &[u8],
        options: &SegmentOptions,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, EditorError> {
        if cancel.is_cancelled() {
            return Err(EditorError::Segmentation("cancelled".to_string()));
        }

        let image = image::load_from_memory(input)
            .map_err(|e| EditorError::Segmentation(format!("unreadable input: {e}")))?;

        let mut slot = self
            .processor
            .lock()
            .map_err(|_| EditorError::Segmentation("segmenter state poisoned".to_string()))?;

        let reusable = matches!(slot.as_ref(), Some((cached, _)) if cached == options);
        if !reusable {
            *slot = Some((*options, self.build_processor(options)?));
        }
        let Some((_, processor)) = slot.as_mut() else {
            return Err(EditorError::Segmentation("model not loaded".to_string()));
        };

        let result = processor.process_image(image).map_err(model_error)?;
        if cancel.is_cancelled() {
            return Err(EditorError::Segmentation("cancelled".to_string()));
        }

        encode_png(&result.image.to_rgba8())
    }
}

/// Map a config name onto an ONNX Runtime execution provider
pub fn parse_provider(name: &str) -> Result<ExecutionProvider, EditorError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "" | "auto" => Ok(ExecutionProvider::Auto),
        "cpu" => Ok(ExecutionProvider::Cpu),
        "cuda" => Ok(ExecutionProvider::Cuda),
        "coreml" => Ok(ExecutionProvider::CoreMl),
        other => Err(EditorError::Segmentation(format!(
            "unknown execution provider '{other}'"
        ))),
    }
}

/// `[0, 1]` encoder quality as a percentage
fn quality_percent(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round() as u8
}

fn model_error(err: impl std::fmt::Display) -> EditorError {
    EditorError::Segmentation(err.to_string())
}

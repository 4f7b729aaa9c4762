//! Error taxonomy for the editing pipeline
//!
//! Every variant owns its data so errors can be cloned into GUI messages.

use thiserror::Error;

/// Errors raised by the editor and the components it sequences.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    /// The upload is not an image (MIME type does not start with `image/`)
    #[error("unsupported file type: {mime}")]
    Validation { mime: String },

    /// The upload is larger than the configured ceiling
    #[error("file is {size} bytes, limit is {limit} bytes")]
    SizeLimit { size: u64, limit: u64 },

    /// The bytes could not be decoded as an image
    #[error("unreadable image: {0}")]
    Decode(String),

    /// The output surface could not be produced
    #[error("render failed: {0}")]
    Render(String),

    /// The segmentation call, blob conversion or re-decode failed
    #[error("background removal failed: {0}")]
    Segmentation(String),

    /// Palette quantization failed (recovered silently by the controller)
    #[error("palette extraction failed: {0}")]
    Extraction(String),

    /// The operation needs a loaded image
    #[error("no image loaded")]
    NoImage,

    /// Writing an exported file failed
    #[error("export failed: {0}")]
    Export(String),
}

impl EditorError {
    /// Short human-readable text for the status line.
    pub fn user_message(&self) -> String {
        match self {
            EditorError::Validation { .. } => "Please choose a PNG, JPEG or WebP image".to_string(),
            EditorError::SizeLimit { limit, .. } => {
                format!("Image is too large (max {} MB)", limit / (1024 * 1024))
            }
            EditorError::Decode(_) => "Could not read that image".to_string(),
            EditorError::Render(_) => "Could not render the preview".to_string(),
            EditorError::Segmentation(_) => "Background removal failed".to_string(),
            EditorError::Extraction(_) => "Palette extraction failed".to_string(),
            EditorError::NoImage => "Upload an image first".to_string(),
            EditorError::Export(_) => "Export failed".to_string(),
        }
    }
}

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

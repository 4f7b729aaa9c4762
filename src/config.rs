//! Editor configuration
//!
//! Loaded from `config.toml` in the user's config directory:
//! - Linux: ~/.config/lumacraft/config.toml
//! - macOS: ~/Library/Application Support/lumacraft/config.toml
//! - Windows: %APPDATA%\lumacraft\config.toml
//!
//! `LUMACRAFT_CONFIG` overrides the location. Every key is optional.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Hard ceiling for uploads (8 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 8 * 1024 * 1024;

/// Number of swatches extracted from the base image
pub const DEFAULT_PALETTE_SIZE: usize = 5;

/// Environment variable pointing at an alternative config file
pub const CONFIG_ENV: &str = "LUMACRAFT_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Uploads above this size are rejected before decoding
    pub max_upload_bytes: u64,
    /// Maximum number of palette colors
    pub palette_size: usize,
    /// How long the "Copied" acknowledgement stays visible
    pub copy_ack_ms: u64,
    pub segmentation: SegmentationConfig,
    pub quantizer: QuantizerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Encoder quality forwarded to the segmenter
    pub quality: f32,
    /// ONNX model file; the first embedded model is used when unset
    pub model: Option<PathBuf>,
    /// `auto`, `cpu`, `cuda` or `coreml`
    pub execution_provider: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuantizerConfig {
    pub max_iter: usize,
    pub converge: f32,
    pub seed: u64,
    /// Longest side of the sample image fed to k-means
    pub sample_edge: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            palette_size: DEFAULT_PALETTE_SIZE,
            copy_ack_ms: 1800,
            segmentation: SegmentationConfig::default(),
            quantizer: QuantizerConfig::default(),
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            quality: 0.92,
            model: None,
            execution_provider: "auto".to_string(),
        }
    }
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            max_iter: 20,
            converge: 1e-4,
            seed: 0,
            sample_edge: 256,
        }
    }
}

impl EditorConfig {
    /// Load the config from the default location.
    ///
    /// A missing file is not an error; defaults are returned instead.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate a specific config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: EditorConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config.validate())
    }

    /// Where the config file is expected to live
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let mut path = dirs::config_dir()?;
        path.push("lumacraft");
        path.push("config.toml");
        Some(path)
    }

    /// Clamp values that would make the pipeline misbehave
    pub fn validate(mut self) -> Self {
        self.palette_size = self.palette_size.max(1);
        self.segmentation.quality = self.segmentation.quality.clamp(0.0, 1.0);
        self.segmentation.execution_provider = self.segmentation.execution_provider.trim().to_lowercase();
        self.quantizer.max_iter = self.quantizer.max_iter.max(1);
        self.quantizer.sample_edge = self.quantizer.sample_edge.max(16);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.max_upload_bytes, 8 * 1024 * 1024);
        assert_eq!(config.palette_size, 5);
        assert_eq!(config.copy_ack_ms, 1800);
        assert!((config.segmentation.quality - 0.92).abs() < f32::EPSILON);
        assert_eq!(config.segmentation.model, None);
        assert_eq!(config.segmentation.execution_provider, "auto");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "palette_size = 3\n\n[segmentation]\nexecution_provider = \"CPU\"\nmodel = \"/opt/models/isnet.onnx\""
        )
        .unwrap();

        let config = EditorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.palette_size, 3);
        assert_eq!(config.segmentation.execution_provider, "cpu");
        assert_eq!(
            config.segmentation.model.as_deref(),
            Some(Path::new("/opt/models/isnet.onnx"))
        );
        assert!((config.segmentation.quality - 0.92).abs() < f32::EPSILON);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "palette_size = \"many\"").unwrap();

        let err = EditorConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_validate_clamps() {
        let mut config = EditorConfig::default();
        config.palette_size = 0;
        config.segmentation.quality = 3.0;

        let config = config.validate();
        assert_eq!(config.palette_size, 1);
        assert_eq!(config.segmentation.quality, 1.0);
    }
}

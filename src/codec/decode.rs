//! Upload validation and decoding
//!
//! Validation (MIME type, then size) always runs before any decode is
//! attempted, so oversized or non-image files never reach the decoder.

use image::{ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

use crate::error::EditorError;

/// A file handed to the editor by the picker or by drag-drop
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original file name (used to name exports)
    pub file_name: Option<String>,
    /// MIME type as reported by the source, e.g. `image/png`
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A successfully decoded upload
#[derive(Debug, Clone)]
pub struct DecodedUpload {
    pub file_name: Option<String>,
    pub file_size: u64,
    pub image: Arc<RgbaImage>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Guess a MIME type from the file extension
pub fn mime_for_path(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

/// Check type and size of an upload.
///
/// # Returns
/// * `Err(Validation)` - MIME type does not start with `image/`
/// * `Err(SizeLimit)` - more than `limit` bytes
pub fn validate(mime: &str, size: u64, limit: u64) -> Result<(), EditorError> {
    if !mime.starts_with("image/") {
        return Err(EditorError::Validation {
            mime: mime.to_string(),
        });
    }
    if size > limit {
        return Err(EditorError::SizeLimit { size, limit });
    }
    Ok(())
}

/// Read a file from disk as an upload.
///
/// Type and size are checked from the path and file metadata before the
/// contents are read.
pub async fn read_upload(path: PathBuf, limit: u64) -> Result<Upload, EditorError> {
    let mime = mime_for_path(&path);
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|e| EditorError::Decode(format!("{}: {}", path.display(), e)))?;
    validate(&mime, metadata.len(), limit)?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| EditorError::Decode(format!("{}: {}", path.display(), e)))?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string());

    Ok(Upload {
        file_name,
        mime,
        bytes,
    })
}

/// Validate and decode an upload into RGBA pixels
pub fn decode(upload: &Upload, limit: u64) -> Result<DecodedUpload, EditorError> {
    validate(&upload.mime, upload.size(), limit)?;

    let image = image::load_from_memory(&upload.bytes)
        .map_err(|e| EditorError::Decode(e.to_string()))?
        .to_rgba8();

    if image.width() == 0 || image.height() == 0 {
        return Err(EditorError::Decode("image has no pixels".to_string()));
    }

    log::debug!(
        "decoded {:?}: {}x{} ({} bytes)",
        upload.file_name,
        image.width(),
        image.height(),
        upload.size()
    );

    Ok(DecodedUpload {
        file_name: upload.file_name.clone(),
        file_size: upload.size(),
        image: Arc::new(image),
    })
}

/// Decode on the blocking pool (decoding is CPU-intensive)
pub async fn decode_async(upload: Upload, limit: u64) -> Result<DecodedUpload, EditorError> {
    task::spawn_blocking(move || decode(&upload, limit))
        .await
        .map_err(|e| EditorError::Decode(format!("Task join error: {}", e)))?
}

//! PNG export
//!
//! Serializes in-memory pixels back into an encoded image and names the
//! downloaded file after the original upload.

use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::error::EditorError;

/// File name used when the upload's name is unknown
pub const FALLBACK_EXPORT_NAME: &str = "lumacraft-export.png";

/// An encoded image ready to be written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub file_name: String,
    pub png: Vec<u8>,
}

impl Export {
    /// Write the PNG to `path`, returning the path on success
    pub async fn save(self, path: PathBuf) -> Result<PathBuf, EditorError> {
        tokio::fs::write(&path, &self.png)
            .await
            .map_err(|e| EditorError::Export(format!("{}: {}", path.display(), e)))?;
        log::info!("exported {} bytes to {}", self.png.len(), path.display());
        Ok(path)
    }
}

/// Encode pixels as PNG
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, EditorError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| EditorError::Render(format!("PNG encode error: {e}")))?;
    Ok(buf)
}

/// `<stem>-lumacraft.png`, or the fallback name without a usable stem
pub fn export_file_name(original: Option<&str>) -> String {
    original
        .and_then(|name| Path::new(name).file_stem())
        .map(|stem| stem.to_string_lossy())
        .filter(|stem| !stem.is_empty())
        .map(|stem| format!("{stem}-lumacraft.png"))
        .unwrap_or_else(|| FALLBACK_EXPORT_NAME.to_string())
}

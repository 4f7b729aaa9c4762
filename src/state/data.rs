//! Shared data structures for the editing session
//!
//! These structs represent the data model that flows between the controller
//! and the UI layer.

use image::RgbaImage;
use std::sync::Arc;

use crate::codec::DecodedUpload;
use crate::color::Swatch;
use crate::state::edit::FilterSettings;
use crate::suggest;

/// Status line shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Processing(String),
    Error(String),
    Success(String),
}

impl Status {
    pub fn message(&self) -> Option<&str> {
        match self {
            Status::Idle => None,
            Status::Processing(label) => Some(label.as_str()),
            Status::Error(message) | Status::Success(message) => Some(message.as_str()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

/// Where the editor is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    /// No image loaded; only upload is possible
    #[default]
    Empty,
    Ready,
    /// A background removal is in flight
    Processing,
    /// The last long-running operation failed
    Error,
}

/// Identifies the inputs an asynchronous job was started from.
///
/// `serial` is the base revision for palette jobs and the removal generation
/// for background removal jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub session: u64,
    pub serial: u64,
}

/// Everything derived from one uploaded file
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) id: u64,
    pub(crate) file_name: Option<String>,
    pub(crate) file_size: u64,
    /// As uploaded; never mutated until the next upload
    pub(crate) original: Arc<RgbaImage>,
    /// Current working pixels
    pub(crate) base: Arc<RgbaImage>,
    /// `render(base, filters)`; `None` only if rendering failed
    pub(crate) preview: Option<Arc<RgbaImage>>,
    pub(crate) filters: FilterSettings,
    pub(crate) palette: Vec<Swatch>,
    pub(crate) css_snippet: String,
    /// Bumped on every base change
    pub(crate) base_revision: u64,
}

impl Session {
    pub(crate) fn new(id: u64, upload: DecodedUpload) -> Self {
        Self {
            id,
            file_name: upload.file_name,
            file_size: upload.file_size,
            original: upload.image.clone(),
            base: upload.image,
            preview: None,
            filters: FilterSettings::default(),
            palette: Vec::new(),
            css_snippet: String::new(),
            base_revision: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn original(&self) -> &Arc<RgbaImage> {
        &self.original
    }

    pub fn base(&self) -> &Arc<RgbaImage> {
        &self.base
    }

    pub fn preview(&self) -> Option<&Arc<RgbaImage>> {
        self.preview.as_ref()
    }

    pub fn filters(&self) -> FilterSettings {
        self.filters
    }

    pub fn palette(&self) -> &[Swatch] {
        &self.palette
    }

    pub fn css_snippet(&self) -> &str {
        &self.css_snippet
    }

    /// Replace the working image
    pub(crate) fn set_base(&mut self, base: Arc<RgbaImage>) {
        self.base = base;
        self.base_revision += 1;
    }

    /// Palette and snippet always change together
    pub(crate) fn set_palette(&mut self, palette: Vec<Swatch>) {
        self.css_snippet = suggest::css_snippet(&palette);
        self.palette = palette;
    }

    pub(crate) fn clear_palette(&mut self) {
        self.palette.clear();
        self.css_snippet.clear();
    }

    pub(crate) fn palette_ticket(&self) -> Ticket {
        Ticket {
            session: self.id,
            serial: self.base_revision,
        }
    }
}

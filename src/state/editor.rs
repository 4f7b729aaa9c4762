//! Editor session controller
//!
//! Owns the mutable session state and sequences the codec, render,
//! segmentation and palette components in response to user actions.
//!
//! Derived values follow an explicit recompute graph:
//!
//! ```text
//! base ─────┬──> preview   (rendered eagerly)
//! filters ──┘
//! base ─────────> palette + css snippet   (scheduled as a PaletteJob)
//! ```
//!
//! Long-running work is split into `begin_*` / `finish_*` halves so the
//! caller decides where it runs. Each job carries a `Ticket`; completions
//! whose ticket no longer matches the current state are discarded.

use image::RgbaImage;
use std::path::PathBuf;
use std::sync::Arc;

use crate::codec::{self, DecodedUpload, Export, Upload};
use crate::color::Swatch;
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::render;
use crate::segment::{self, CancelToken, OutputFormat, SegmentOptions, Segmenter};
use crate::state::data::{EditorState, Session, Status, Ticket};
use crate::state::edit::{Filter, FilterSettings};
use crate::suggest;
use crate::swatch::{self, Quantizer};

/// Status label while a background removal is in flight
pub const REMOVING_BACKGROUND: &str = "Removing background";

/// A state change that invalidates derived values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Base,
    Filters,
}

/// A derived value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Preview,
    Palette,
}

impl Input {
    /// Nodes that must be recomputed when this input changes
    pub fn dependents(self) -> &'static [Node] {
        match self {
            Input::Base => &[Node::Preview, Node::Palette],
            Input::Filters => &[Node::Preview],
        }
    }
}

/// What happened to a job completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The job was superseded; its result was dropped
    Stale,
}

/// Palette extraction for one base revision
#[derive(Debug, Clone)]
pub struct PaletteJob {
    pub ticket: Ticket,
    image: Arc<RgbaImage>,
    count: usize,
}

impl PaletteJob {
    pub fn run(&self, quantizer: &dyn Quantizer) -> Result<Vec<Swatch>, EditorError> {
        swatch::extract(&self.image, self.count, quantizer)
    }
}

/// Background removal of the base image as it was when the job started
#[derive(Debug, Clone)]
pub struct SegmentJob {
    pub ticket: Ticket,
    image: Arc<RgbaImage>,
    file_hint: Option<String>,
    options: SegmentOptions,
    cancel: CancelToken,
}

impl SegmentJob {
    pub fn run(&self, segmenter: &dyn Segmenter) -> Result<Arc<RgbaImage>, EditorError> {
        segment::remove_background(
            &self.image,
            self.file_hint.as_deref(),
            segmenter,
            &self.options,
            &self.cancel,
        )
        .map(Arc::new)
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

/// PNG encoding of the image to export, detached from the editor
#[derive(Debug, Clone)]
pub struct ExportJob {
    file_name: String,
    image: Arc<RgbaImage>,
}

impl ExportJob {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn run(&self) -> Result<Export, EditorError> {
        Ok(Export {
            file_name: self.file_name.clone(),
            png: codec::encode_png(&self.image)?,
        })
    }
}

/// The removal currently allowed to write the base image
#[derive(Debug)]
struct PendingRemoval {
    ticket: Ticket,
    cancel: CancelToken,
}

/// The editing controller
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    session: Option<Session>,
    status: Status,
    state: EditorState,
    next_session_id: u64,
    removal: Option<PendingRemoval>,
    removal_generation: u64,
    palette_dirty: bool,
    /// Bumped whenever the preview image changes
    preview_version: u64,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            session: None,
            status: Status::Idle,
            state: EditorState::Empty,
            next_session_id: 1,
            removal: None,
            removal_generation: 0,
            palette_dirty: false,
            preview_version: 0,
        }
    }

    // ========== Accessors ==========

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.removal.is_some()
    }

    pub fn filters(&self) -> FilterSettings {
        self.session
            .as_ref()
            .map(|session| session.filters)
            .unwrap_or_default()
    }

    pub fn preview(&self) -> Option<&Arc<RgbaImage>> {
        self.session.as_ref().and_then(|session| session.preview.as_ref())
    }

    pub fn preview_version(&self) -> u64 {
        self.preview_version
    }

    pub fn palette(&self) -> &[Swatch] {
        self.session
            .as_ref()
            .map(|session| session.palette.as_slice())
            .unwrap_or(&[])
    }

    pub fn css_snippet(&self) -> &str {
        self.session
            .as_ref()
            .map(|session| session.css_snippet.as_str())
            .unwrap_or("")
    }

    pub fn layout_ideas(&self) -> Vec<String> {
        suggest::layout_ideas(self.palette())
    }

    // ========== Upload ==========

    /// Validate, decode and load an upload on the calling thread
    pub fn upload(&mut self, upload: Upload) -> Result<(), EditorError> {
        let decoded = codec::decode(&upload, self.config.max_upload_bytes);
        self.accept_upload(decoded)
    }

    /// Load the result of a decode performed elsewhere.
    ///
    /// On failure the current session (if any) is left untouched.
    pub fn accept_upload(&mut self, decoded: Result<DecodedUpload, EditorError>) -> Result<(), EditorError> {
        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(err) => {
                log::warn!("upload rejected: {}", err);
                self.status = Status::Error(err.user_message());
                return Err(err);
            }
        };

        self.cancel_outstanding();

        let id = self.next_session_id;
        self.next_session_id += 1;
        let label = decoded.file_name.clone().unwrap_or_else(|| "image".to_string());
        log::info!(
            "session {}: loaded {} ({}x{}, {} bytes)",
            id,
            label,
            decoded.image.width(),
            decoded.image.height(),
            decoded.file_size
        );

        self.session = Some(Session::new(id, decoded));
        self.state = EditorState::Ready;
        self.status = Status::Success(format!("Loaded {}", label));
        self.invalidate(&[Input::Base, Input::Filters]);
        Ok(())
    }

    // ========== Filters ==========

    /// Change one filter; the preview is re-rendered immediately
    pub fn set_filter(&mut self, filter: Filter, value: i32) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.filters.set(filter, value) {
            self.invalidate(&[Input::Filters]);
        }
    }

    pub fn reset_filters(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.filters.is_unedited() {
            session.filters.reset();
            self.invalidate(&[Input::Filters]);
        }
    }

    // ========== Background removal ==========

    /// Start a background removal of the current base image.
    ///
    /// A removal already in flight is cancelled and superseded: only the
    /// most recently started job may write the base image.
    pub fn begin_remove_background(&mut self) -> Result<SegmentJob, EditorError> {
        let Some(session) = self.session.as_ref() else {
            self.status = Status::Error(EditorError::NoImage.user_message());
            return Err(EditorError::NoImage);
        };

        if let Some(previous) = self.removal.take() {
            log::warn!("superseding background removal {:?}", previous.ticket);
            previous.cancel.cancel();
        }

        self.removal_generation += 1;
        let ticket = Ticket {
            session: session.id,
            serial: self.removal_generation,
        };
        let cancel = CancelToken::new();
        let job = SegmentJob {
            ticket,
            image: session.base.clone(),
            file_hint: session.file_name.clone(),
            options: SegmentOptions {
                format: OutputFormat::Png,
                quality: self.config.segmentation.quality,
            },
            cancel: cancel.clone(),
        };

        self.removal = Some(PendingRemoval { ticket, cancel });
        self.state = EditorState::Processing;
        self.status = Status::Processing(REMOVING_BACKGROUND.to_string());
        Ok(job)
    }

    /// Apply the result of a background removal job
    pub fn finish_remove_background(
        &mut self,
        ticket: Ticket,
        result: Result<Arc<RgbaImage>, EditorError>,
    ) -> Outcome {
        let is_current = self
            .removal
            .as_ref()
            .is_some_and(|pending| pending.ticket == ticket);
        if !is_current {
            log::info!("discarding stale background removal {:?}", ticket);
            return Outcome::Stale;
        }
        self.removal = None;

        let Some(session) = self.session.as_mut() else {
            return Outcome::Stale;
        };

        match result {
            Ok(image) => {
                log::info!("session {}: background removed", session.id);
                session.set_base(image);
                self.state = EditorState::Ready;
                self.status = Status::Success("Background removed".to_string());
                self.invalidate(&[Input::Base]);
            }
            Err(err) => {
                log::error!("session {}: {}", session.id, err);
                self.state = EditorState::Error;
                self.status = Status::Error(err.user_message());
            }
        }
        Outcome::Applied
    }

    // ========== Revert ==========

    /// Restore the as-uploaded image and clear all filters
    pub fn revert_to_original(&mut self) -> Result<(), EditorError> {
        if self.session.is_none() {
            return Err(EditorError::NoImage);
        }
        self.cancel_removal();

        if let Some(session) = self.session.as_mut() {
            let original = session.original.clone();
            session.set_base(original);
            session.filters.reset();
        }

        self.state = EditorState::Ready;
        self.status = Status::Success("Reverted to original".to_string());
        self.invalidate(&[Input::Base, Input::Filters]);
        Ok(())
    }

    // ========== Palette ==========

    /// The palette job for the current base, if one is due
    pub fn take_palette_job(&mut self) -> Option<PaletteJob> {
        if !self.palette_dirty {
            return None;
        }
        let session = self.session.as_ref()?;
        self.palette_dirty = false;

        Some(PaletteJob {
            ticket: session.palette_ticket(),
            image: session.base.clone(),
            count: self.config.palette_size,
        })
    }

    /// Apply a palette result.
    ///
    /// Failures clear the palette without touching the status line.
    pub fn finish_palette(&mut self, ticket: Ticket, result: Result<Vec<Swatch>, EditorError>) -> Outcome {
        let Some(session) = self.session.as_mut() else {
            return Outcome::Stale;
        };
        if session.palette_ticket() != ticket {
            log::debug!("discarding stale palette {:?}", ticket);
            return Outcome::Stale;
        }

        match result {
            Ok(palette) => session.set_palette(palette),
            Err(err) => {
                log::warn!("session {}: {}", session.id, err);
                session.clear_palette();
            }
        }
        Outcome::Applied
    }

    /// Run any due palette job on the calling thread
    pub fn refresh_palette(&mut self, quantizer: &dyn Quantizer) -> Option<Outcome> {
        let job = self.take_palette_job()?;
        let result = job.run(quantizer);
        Some(self.finish_palette(job.ticket, result))
    }

    // ========== Export ==========

    /// Snapshot the most refined image available: preview, else base
    pub fn export_job(&self) -> Result<ExportJob, EditorError> {
        let session = self.session.as_ref().ok_or(EditorError::NoImage)?;
        let image = session.preview.as_ref().unwrap_or(&session.base);

        Ok(ExportJob {
            file_name: codec::export_file_name(session.file_name.as_deref()),
            image: image.clone(),
        })
    }

    /// Encode the export on the calling thread
    pub fn export(&self) -> Result<Export, EditorError> {
        self.export_job()?.run()
    }

    /// Report how an export ended on the status line
    pub fn finish_export(&mut self, result: Result<PathBuf, EditorError>) {
        match result {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                self.status = Status::Success(format!("Exported {}", name));
            }
            Err(err) => {
                log::error!("{}", err);
                self.status = Status::Error(err.user_message());
            }
        }
    }

    // ========== Recompute graph ==========

    fn invalidate(&mut self, inputs: &[Input]) {
        let mut preview = false;
        let mut palette = false;
        for node in inputs.iter().flat_map(|input| input.dependents()) {
            match node {
                Node::Preview => preview = true,
                Node::Palette => palette = true,
            }
        }

        if palette {
            if let Some(session) = self.session.as_mut() {
                session.clear_palette();
            }
            self.palette_dirty = true;
        }
        if preview {
            self.recompute_preview();
        }
    }

    fn recompute_preview(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match render::render(&session.base, &session.filters) {
            Ok(image) => session.preview = Some(Arc::new(image)),
            Err(err) => {
                log::error!("session {}: {}", session.id, err);
                session.preview = None;
                self.status = Status::Error(err.user_message());
            }
        }
        self.preview_version += 1;
    }

    fn cancel_removal(&mut self) {
        if let Some(pending) = self.removal.take() {
            log::info!("cancelling background removal {:?}", pending.ticket);
            pending.cancel.cancel();
        }
    }

    fn cancel_outstanding(&mut self) {
        self.cancel_removal();
        self.palette_dirty = false;
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

//! State management module
//!
//! This module handles all editing state:
//! - Filter settings (edit.rs)
//! - Shared data structures (data.rs)
//! - The session controller and its recompute graph (editor.rs)

pub mod data;
pub mod edit;
pub mod editor;

pub use data::{EditorState, Session, Status, Ticket};
pub use edit::{Filter, FilterSettings};
pub use editor::{Editor, ExportJob, Input, Node, Outcome, PaletteJob, SegmentJob};

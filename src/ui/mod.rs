//! Custom widgets for the GUI shell
//!
//! - `swatches.rs` - palette strip drawn on a canvas

pub mod swatches;

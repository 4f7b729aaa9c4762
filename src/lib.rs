//! Lumacraft: a small image studio
//!
//! Load one image, adjust brightness, contrast and saturation, strip the
//! background, and get a dominant-color palette with CSS and layout
//! suggestions. The GUI in `main.rs` is a thin shell over `state::Editor`.

pub mod codec;
pub mod color;
pub mod config;
pub mod error;
pub mod render;
pub mod segment;
pub mod state;
pub mod suggest;
pub mod swatch;

pub use color::Swatch;
pub use config::EditorConfig;
pub use error::{ConfigError, EditorError};
pub use state::Editor;

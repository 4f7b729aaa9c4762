//! Filter rendering
//!
//! Produces the preview image from the base image and the current filter
//! settings. All three tone filters are applied in a single pass through the
//! fused `ToneTransform`; see `pipeline.rs`.

pub mod pipeline;

pub use pipeline::render;

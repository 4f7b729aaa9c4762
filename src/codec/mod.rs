//! Image codec adapter
//!
//! This module handles:
//! - Validating and decoding user uploads (decode.rs)
//! - Encoding images back to PNG for export (export.rs)

pub mod decode;
pub mod export;

pub use decode::{decode, decode_async, read_upload, validate, DecodedUpload, Upload};
pub use export::{encode_png, export_file_name, Export};

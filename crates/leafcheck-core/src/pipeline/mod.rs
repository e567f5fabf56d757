//! Input stages ahead of classification.
//!
//! - **validate**: size and magic-byte checks on the raw upload
//! - **decode**: format detection and decoding into pixels

pub mod decode;
pub mod validate;

pub use decode::{format_to_string, DecodedImage, ImageDecoder};
pub use validate::Validator;

//! Image codecs: turning files into face payloads and back.
//!
//! - **Backend**: [`FaceCodec`] trait + [`CodecError`]
//! - **Image crate**: [`ImageCrateCodec`], the pure Rust implementation
//!
//! Formats come from the `image` crate's compiled-in features. Reading
//! sniffs the content; writing picks the encoder from the file extension.

pub mod backend;
pub mod rust_backend;

pub use backend::{CodecError, FaceCodec};
pub use rust_backend::{ImageCrateCodec, output_format, supported_output_extensions};

//! Image codec trait and shared error type.
//!
//! The [`FaceCodec`] trait is the seam between the bulk orchestrator and the
//! actual pixel work: decode a file into a [`DynamicImage`], encode one back
//! to a file. The production implementation is
//! [`ImageCrateCodec`](super::rust_backend::ImageCrateCodec).

use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Unsupported image format: {0:?}")]
    UnsupportedFormat(String),
    #[error("No image loaded")]
    MissingImage,
}

/// Trait for image codecs.
///
/// Must be `Sync`: the parallel orchestrator calls one codec from every
/// worker thread.
pub trait FaceCodec: Sync {
    /// Decode the image at `path`.
    fn decode(&self, path: &Path) -> Result<DynamicImage, CodecError>;

    /// Encode `image` to `path`. The format follows the path's extension.
    /// Missing parent directories are created once the format is known to
    /// be writable.
    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<(), CodecError>;
}

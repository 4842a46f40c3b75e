//! JSON documents describing a face pool.
//!
//! The document holds structure only; image bytes live next to it on disk and
//! are loaded separately by [`bulk`](crate::bulk).
//!
//! ```json
//! {
//!   "name": "OneShot",
//!   "description": "Faces from the base game",
//!   "credits": ["Art: Nightmargin", "Packaging: someone"],
//!   "categories": {
//!     "Niko": {
//!       "characterName": "Niko",
//!       "faces": {
//!         "Niko, happy": "niko/happy.png",
//!         "Niko, sad": { "path": "niko/sad.png", "order": 5000 }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! ## Shape
//!
//! | Level | Required | Optional |
//! |---|---|---|
//! | pool | `categories` | `name`, `description`, `credits` |
//! | category | `faces` | `order`, `characterName`, `description` |
//! | face | `path` (alias `imagePath`) | `order`, `characterName`, `description` |
//!
//! - A face is either a bare path string or an object.
//! - `description` and `credits` are a string or an array of strings.
//! - Unknown keys are skipped, so newer documents still load.
//!
//! ## Canonical form
//!
//! Encoding sorts the pool first and omits everything that is unset: a face
//! with nothing but a path becomes a bare string, a one-line description
//! becomes a bare string. Decoding the output yields an equal pool.

mod decode;
mod encode;

pub use decode::{DecodeError, DecodeOptions, decode_pool};
pub use encode::{encode_pool, encode_pool_to_writer};

use crate::catalog::Pool;
use std::path::Path;
use thiserror::Error;

pub(crate) mod fields {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const CREDITS: &str = "credits";
    pub const CATEGORIES: &str = "categories";
    pub const ORDER: &str = "order";
    pub const CHARACTER_NAME: &str = "characterName";
    pub const FACES: &str = "faces";
    pub const PATH: &str = "path";
    pub const IMAGE_PATH: &str = "imagePath";
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("JSON encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Read and decode a pool document from disk.
pub fn load_pool(path: &Path, options: &DecodeOptions) -> Result<Pool, DocumentError> {
    let content = std::fs::read_to_string(path)?;
    Ok(decode_pool(&content, options)?)
}

/// Encode a pool in canonical form and write it to disk.
pub fn save_pool(pool: &mut Pool, path: &Path) -> Result<(), DocumentError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut json = encode_pool(pool)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

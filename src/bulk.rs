//! Bulk image I/O: read or write the image of every face in a pool.
//!
//! Each face's file lives at `root / image_path`. A failing face never stops
//! its siblings; failures are collected per category and per pool:
//!
//! ```text
//! PoolImageError "OneShot"
//! ├── CategoryImageError "Niko"
//! │   └── FaceImageError "Niko, sad"   niko/sad.png: IO error: No such file
//! └── CategoryImageError "Alula"
//!     └── FaceImageError "Alula"       alula/normal.xyz: Unsupported image format
//! ```
//!
//! ## Sequential and parallel
//!
//! [`read_images`] and [`write_images`] run on the calling thread, category by
//! category. The `_par` variants run inside a caller-supplied
//! [`rayon::ThreadPool`]: categories and, within each, faces are parallel
//! iterators, so every face is available to the workers at once. The call
//! returns when every face is done. A panic in a worker is not a face
//! failure; rayon re-raises it on the calling thread.
//!
//! Both variants sort the pool first and report failures in display order.
//!
//! ## Progress
//!
//! An optional [`ProgressSink`] observes the run; see [`crate::progress`]
//! for the hook sequence.

use crate::catalog::{Category, Face, Pool};
use crate::imaging::{CodecError, FaceCodec};
use crate::naming;
use crate::progress::ProgressSink;
use rayon::ThreadPool;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// One face whose image could not be read or written.
#[derive(Error, Debug)]
#[error("face \"{face}\" in category \"{category}\" ({path}): {source}", path = .path.display())]
pub struct FaceImageError {
    pub category: String,
    pub face: String,
    /// Resolved file path (`root / image_path`).
    pub path: PathBuf,
    pub source: CodecError,
}

/// Every face failure of one category.
#[derive(Error, Debug)]
#[error("{} face image(s) failed in category \"{category}\"", .failures.len())]
pub struct CategoryImageError {
    pub category: String,
    pub failures: Vec<FaceImageError>,
}

/// Every category with at least one face failure.
#[derive(Error, Debug)]
#[error(
    "{} face image(s) failed across {} category(ies)",
    .failures.iter().map(|c| c.failures.len()).sum::<usize>(),
    .failures.len()
)]
pub struct PoolImageError {
    pub pool: Option<String>,
    pub failures: Vec<CategoryImageError>,
}

impl PoolImageError {
    /// Number of failed faces.
    pub fn face_count(&self) -> usize {
        self.failures.iter().map(|c| c.failures.len()).sum()
    }

    /// `pool/category/face` path and cause of every failure, in display order.
    /// An unnamed pool contributes no segment.
    pub fn failures_by_path(&self) -> Vec<(String, String)> {
        self.failures
            .iter()
            .flat_map(|category| {
                category.failures.iter().map(|face| {
                    let path = naming::join_path([
                        self.pool.as_deref(),
                        Some(category.category.as_str()),
                        Some(face.face.as_str()),
                    ]);
                    (path, face.source.to_string())
                })
            })
            .collect()
    }

    /// Iterate over every face failure.
    pub fn faces(&self) -> impl Iterator<Item = &FaceImageError> {
        self.failures.iter().flat_map(|c| c.failures.iter())
    }
}

/// Decode every face's image into its payload.
pub fn read_images(
    pool: &mut Pool,
    root: &Path,
    codec: &impl FaceCodec,
    sink: Option<&dyn ProgressSink>,
) -> Result<(), PoolImageError> {
    run(pool, root, codec, Hooks::new(Op::Read, sink), None)
}

/// [`read_images`] on `scheduler`'s workers.
pub fn read_images_par(
    pool: &mut Pool,
    root: &Path,
    codec: &impl FaceCodec,
    sink: Option<&dyn ProgressSink>,
    scheduler: &ThreadPool,
) -> Result<(), PoolImageError> {
    run(pool, root, codec, Hooks::new(Op::Read, sink), Some(scheduler))
}

/// Encode every face's payload to its file, creating parent directories.
/// Faces without a payload fail with [`CodecError::MissingImage`].
pub fn write_images(
    pool: &mut Pool,
    root: &Path,
    codec: &impl FaceCodec,
    sink: Option<&dyn ProgressSink>,
) -> Result<(), PoolImageError> {
    run(pool, root, codec, Hooks::new(Op::Write, sink), None)
}

/// [`write_images`] on `scheduler`'s workers.
pub fn write_images_par(
    pool: &mut Pool,
    root: &Path,
    codec: &impl FaceCodec,
    sink: Option<&dyn ProgressSink>,
    scheduler: &ThreadPool,
) -> Result<(), PoolImageError> {
    run(pool, root, codec, Hooks::new(Op::Write, sink), Some(scheduler))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Read,
    Write,
}

impl Op {
    fn verb(self) -> &'static str {
        match self {
            Op::Read => "read",
            Op::Write => "write",
        }
    }
}

/// Routes each event to the read or write hook of the sink.
#[derive(Clone, Copy)]
struct Hooks<'a> {
    op: Op,
    sink: Option<&'a dyn ProgressSink>,
}

impl<'a> Hooks<'a> {
    fn new(op: Op, sink: Option<&'a dyn ProgressSink>) -> Self {
        Self { op, sink }
    }

    fn before_pool(&self, pool: Option<&str>) {
        match (self.sink, self.op) {
            (Some(s), Op::Read) => s.before_pool_read(pool),
            (Some(s), Op::Write) => s.before_pool_write(pool),
            (None, _) => {}
        }
    }

    fn before_category(&self, category: &str) {
        match (self.sink, self.op) {
            (Some(s), Op::Read) => s.before_category_read(category),
            (Some(s), Op::Write) => s.before_category_write(category),
            (None, _) => {}
        }
    }

    fn before_face(&self, category: &str, face: &str) {
        match (self.sink, self.op) {
            (Some(s), Op::Read) => s.before_face_read(category, face),
            (Some(s), Op::Write) => s.before_face_write(category, face),
            (None, _) => {}
        }
    }

    fn after_face(&self, category: &str, face: &str, error: Option<&FaceImageError>) {
        match (self.sink, self.op) {
            (Some(s), Op::Read) => s.after_face_read(category, face, error),
            (Some(s), Op::Write) => s.after_face_write(category, face, error),
            (None, _) => {}
        }
    }

    fn after_category(&self, category: &str, error: Option<&CategoryImageError>) {
        match (self.sink, self.op) {
            (Some(s), Op::Read) => s.after_category_read(category, error),
            (Some(s), Op::Write) => s.after_category_write(category, error),
            (None, _) => {}
        }
    }

    fn after_pool(&self, pool: Option<&str>, error: Option<&PoolImageError>) {
        match (self.sink, self.op) {
            (Some(s), Op::Read) => s.after_pool_read(pool, error),
            (Some(s), Op::Write) => s.after_pool_write(pool, error),
            (None, _) => {}
        }
    }
}

fn run<C: FaceCodec + ?Sized>(
    pool: &mut Pool,
    root: &Path,
    codec: &C,
    hooks: Hooks<'_>,
    scheduler: Option<&ThreadPool>,
) -> Result<(), PoolImageError> {
    let pool_name = pool.name().map(str::to_string);
    let total = pool.face_count();
    hooks.before_pool(pool_name.as_deref());

    let categories = pool.categories_for_io();
    let failures: Vec<CategoryImageError> = match scheduler {
        None => categories
            .iter_mut()
            .filter_map(|category| {
                hooks.before_category(category.name());
                run_category(category, root, codec, hooks, false).err()
            })
            .collect(),
        Some(scheduler) => {
            for category in categories.iter() {
                hooks.before_category(category.name());
            }
            scheduler.install(|| {
                categories
                    .par_iter_mut()
                    .filter_map(|category| run_category(category, root, codec, hooks, true).err())
                    .collect()
            })
        }
    };

    let result = if failures.is_empty() {
        Ok(())
    } else {
        Err(PoolImageError {
            pool: pool_name.clone(),
            failures,
        })
    };
    let failed = result.as_ref().err().map_or(0, PoolImageError::face_count);
    info!(
        op = hooks.op.verb(),
        pool = pool_name.as_deref().unwrap_or_default(),
        faces = total,
        failed,
        parallel = scheduler.is_some(),
        "Bulk image I/O finished"
    );
    hooks.after_pool(pool_name.as_deref(), result.as_ref().err());
    result
}

/// Process every face of one category; the caller has already announced it.
fn run_category<C: FaceCodec + ?Sized>(
    category: &mut Category,
    root: &Path,
    codec: &C,
    hooks: Hooks<'_>,
    parallel: bool,
) -> Result<(), CategoryImageError> {
    let name = category.name().to_string();
    let process = |face: &mut Face| {
        hooks.before_face(&name, face.name());
        let result = run_face(face, &name, root, codec, hooks.op);
        hooks.after_face(&name, face.name(), result.as_ref().err());
        result.err()
    };

    let faces = category.faces_for_io();
    let failures: Vec<FaceImageError> = if parallel {
        faces.par_iter_mut().filter_map(&process).collect()
    } else {
        faces.iter_mut().filter_map(&process).collect()
    };

    let result = if failures.is_empty() {
        Ok(())
    } else {
        Err(CategoryImageError {
            category: name.clone(),
            failures,
        })
    };
    hooks.after_category(&name, result.as_ref().err());
    result
}

fn run_face<C: FaceCodec + ?Sized>(
    face: &mut Face,
    category: &str,
    root: &Path,
    codec: &C,
    op: Op,
) -> Result<(), FaceImageError> {
    let path = root.join(face.image_path());
    debug!(op = op.verb(), category, face = face.name(), path = %path.display(), "Face image");

    let outcome = match op {
        Op::Read => codec.decode(&path).map(|image| face.set_image(image)),
        Op::Write => write_face(face, &path, codec),
    };

    outcome.map_err(|source| {
        warn!(
            op = op.verb(),
            category,
            face = face.name(),
            path = %path.display(),
            error = %source,
            "Face image failed"
        );
        FaceImageError {
            category: category.to_string(),
            face: face.name().to_string(),
            path,
            source,
        }
    })
}

fn write_face<C: FaceCodec + ?Sized>(face: &Face, path: &Path, codec: &C) -> Result<(), CodecError> {
    let image = face.image().ok_or(CodecError::MissingImage)?;
    codec.encode(image, path)
}

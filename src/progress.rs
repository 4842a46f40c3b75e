//! Progress reporting for bulk image I/O.
//!
//! [`bulk`](crate::bulk) drives a [`ProgressSink`] through a fixed hook
//! sequence. For a pool with one category of two faces:
//!
//! ```text
//! before_pool_read
//!   before_category_read "Niko"
//!     before_face_read "Niko, happy"   after_face_read "Niko, happy"
//!     before_face_read "Niko, sad"     after_face_read "Niko, sad"
//!   after_category_read "Niko"
//! after_pool_read
//! ```
//!
//! In the parallel variants every `before_category_*` fires before any face
//! is dispatched, and face hooks of different faces interleave freely.
//! Hooks run on worker threads, so sinks must be `Sync`.

use crate::bulk::{CategoryImageError, FaceImageError, PoolImageError};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Observer for bulk image I/O. Every hook defaults to a no-op.
#[allow(unused_variables)]
pub trait ProgressSink: Sync {
    fn before_pool_read(&self, pool: Option<&str>) {}
    fn before_category_read(&self, category: &str) {}
    fn before_face_read(&self, category: &str, face: &str) {}
    fn after_face_read(&self, category: &str, face: &str, error: Option<&FaceImageError>) {}
    fn after_category_read(&self, category: &str, error: Option<&CategoryImageError>) {}
    fn after_pool_read(&self, pool: Option<&str>, error: Option<&PoolImageError>) {}

    fn before_pool_write(&self, pool: Option<&str>) {}
    fn before_category_write(&self, category: &str) {}
    fn before_face_write(&self, category: &str, face: &str) {}
    fn after_face_write(&self, category: &str, face: &str, error: Option<&FaceImageError>) {}
    fn after_category_write(&self, category: &str, error: Option<&CategoryImageError>) {}
    fn after_pool_write(&self, pool: Option<&str>, error: Option<&PoolImageError>) {}
}

/// A sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Pending,
    InProgress,
    Finished,
    Error(String),
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

/// One node of a [`StatusTree`]: the pool at the root, categories below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNode {
    pub name: String,
    pub status: Status,
    /// Faces completed so far (successful or not).
    pub done: usize,
    /// Faces that failed.
    pub failed: usize,
    pub children: Vec<StatusNode>,
}

impl StatusNode {
    fn new(name: impl Into<String>, status: Status) -> Self {
        Self {
            name: name.into(),
            status,
            done: 0,
            failed: 0,
            children: Vec::new(),
        }
    }

    pub fn child(&self, name: &str) -> Option<&StatusNode> {
        self.children.iter().find(|c| c.name == name)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut StatusNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }
}

/// Display name of the root node when the pool has none.
pub const UNNAMED_POOL: &str = "(unnamed pool)";

/// A [`ProgressSink`] that keeps the latest state of every node.
///
/// Read and write hooks update the tree the same way; a new
/// `before_pool_*` starts a fresh tree.
#[derive(Debug)]
pub struct StatusTree {
    root: Mutex<StatusNode>,
}

impl Default for StatusTree {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTree {
    pub fn new() -> Self {
        Self {
            root: Mutex::new(StatusNode::new(UNNAMED_POOL, Status::Pending)),
        }
    }

    /// Copy of the current tree.
    pub fn snapshot(&self) -> StatusNode {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, StatusNode> {
        // A panicking hook caller must not take the tree down with it.
        self.root.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_pool(&self, pool: Option<&str>) {
        *self.lock() = StatusNode::new(pool.unwrap_or(UNNAMED_POOL), Status::InProgress);
    }

    fn start_category(&self, category: &str) {
        let mut root = self.lock();
        match root.child_mut(category) {
            Some(node) => *node = StatusNode::new(category, Status::Pending),
            None => root
                .children
                .push(StatusNode::new(category, Status::Pending)),
        }
    }

    fn start_face(&self, category: &str) {
        if let Some(node) = self.lock().child_mut(category)
            && node.status == Status::Pending
        {
            node.status = Status::InProgress;
        }
    }

    fn finish_face(&self, category: &str, failed: bool) {
        let mut root = self.lock();
        root.done += 1;
        if failed {
            root.failed += 1;
        }
        if let Some(node) = root.child_mut(category) {
            node.done += 1;
            if failed {
                node.failed += 1;
            }
        }
    }

    fn finish_category(&self, category: &str, error: Option<&CategoryImageError>) {
        if let Some(node) = self.lock().child_mut(category) {
            node.status = resolved(error);
        }
    }

    fn finish_pool(&self, error: Option<&PoolImageError>) {
        self.lock().status = resolved(error);
    }
}

fn resolved(error: Option<&impl std::error::Error>) -> Status {
    match error {
        Some(e) => Status::Error(e.to_string()),
        None => Status::Finished,
    }
}

impl ProgressSink for StatusTree {
    fn before_pool_read(&self, pool: Option<&str>) {
        self.start_pool(pool);
    }
    fn before_category_read(&self, category: &str) {
        self.start_category(category);
    }
    fn before_face_read(&self, category: &str, _face: &str) {
        self.start_face(category);
    }
    fn after_face_read(&self, category: &str, _face: &str, error: Option<&FaceImageError>) {
        self.finish_face(category, error.is_some());
    }
    fn after_category_read(&self, category: &str, error: Option<&CategoryImageError>) {
        self.finish_category(category, error);
    }
    fn after_pool_read(&self, _pool: Option<&str>, error: Option<&PoolImageError>) {
        self.finish_pool(error);
    }

    fn before_pool_write(&self, pool: Option<&str>) {
        self.start_pool(pool);
    }
    fn before_category_write(&self, category: &str) {
        self.start_category(category);
    }
    fn before_face_write(&self, category: &str, _face: &str) {
        self.start_face(category);
    }
    fn after_face_write(&self, category: &str, _face: &str, error: Option<&FaceImageError>) {
        self.finish_face(category, error.is_some());
    }
    fn after_category_write(&self, category: &str, error: Option<&CategoryImageError>) {
        self.finish_category(category, error);
    }
    fn after_pool_write(&self, _pool: Option<&str>, error: Option<&PoolImageError>) {
        self.finish_pool(error);
    }
}

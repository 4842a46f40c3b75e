//! The face catalogue: pools own categories, categories own faces.
//!
//! ```text
//! Pool "OneShot"
//! ├── Category "Niko"        order 0     characterName "Niko"
//! │   ├── Face "Niko, happy"  → niko/happy.png
//! │   └── Face "Niko, sad"    → niko/sad.png
//! └── Category "Alula"       order 1000
//!     └── Face "Alula"        → alula/normal.png
//! ```
//!
//! ## Ownership and back-references
//!
//! Children are owned by value. The upward links (face → category, face and
//! category → pool) are plain typed ids ([`CategoryId`], [`PoolId`]), so
//! detaching or reattaching is a relation update and nothing can dangle. An
//! entity whose back-reference is set is "owned": adding it to another
//! container fails with [`CatalogError::AlreadyOwned`]. That can only happen
//! to a `Clone` of an attached face; [`Face::detached_copy`] and
//! [`Category::detached_copy`] produce values that can be added anywhere.
//!
//! ## Lazy ordering
//!
//! Containers keep their children in a `Vec` and a dirty flag. Anything that
//! may change display order (adding, removing, renaming, `*_mut` access) only
//! sets the flag; the stable sort runs when an ordered view is requested or
//! [`Pool::sort_if_needed`] is called. Both need `&mut self`, so a sort can
//! never interleave with structural mutation.

mod category;
mod face;
mod pool;

pub use category::Category;
pub use face::Face;
pub use pool::Pool;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Identity of a [`Pool`], used as a non-owning back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(u64);

impl PoolId {
    fn next() -> Self {
        Self(next_id())
    }
}

/// Identity of a [`Category`], used as a non-owning back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryId(u64);

impl CategoryId {
    fn next() -> Self {
        Self(next_id())
    }
}

/// Which level of the catalogue an error or hook refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Pool,
    Category,
    Face,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Pool => "face pool",
            EntityKind::Category => "category",
            EntityKind::Face => "face",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{kind} with name \"{name}\" already exists")]
    DuplicateName { kind: EntityKind, name: String },
    #[error("{kind} \"{name}\" is already part of another container")]
    AlreadyOwned { kind: EntityKind, name: String },
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: EntityKind, name: String },
    #[error("path \"{0}\" is missing delimiter '{delim}'", delim = crate::naming::PATH_DELIMITER)]
    InvalidPath(String),
}

/// A rejected `add`: the error plus the child, handed back untouched.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct AddError<T: fmt::Debug> {
    pub error: CatalogError,
    pub rejected: T,
}

impl<T: fmt::Debug> AddError<T> {
    pub fn into_inner(self) -> T {
        self.rejected
    }
}

//! # facepool
//!
//! A catalogue of character portraits ("faces") for games and visual
//! novels. Faces are grouped into categories, categories into pools. A pool
//! is stored as a compact JSON document; the images it names live next to it
//! on disk and are loaded or saved in bulk.
//!
//! ```text
//! faces.json  ──decode──▶  Pool ──read_images──▶  Pool with payloads
//!     ▲                     │                          │
//!     └──────encode─────────┘       write_images ◀─────┘
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | `Pool` → `Category` → `Face` ownership tree with lazy, cached ordering |
//! | [`order`] | Default order assignment and the display-order comparison |
//! | [`naming`] | Character names derived from face names; `category/face` paths |
//! | [`document`] | JSON encode/decode with optional-field elision |
//! | [`imaging`] | Image codec trait and the `image` crate implementation |
//! | [`bulk`] | Sequential and parallel bulk image I/O with aggregated errors |
//! | [`progress`] | Progress hooks for bulk I/O and a status tree that records them |
//! | [`config`] | `facepool.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Lazy Ordering
//!
//! Categories and faces are displayed by a numeric `order`, ties broken by
//! name. Containers only mark themselves dirty on mutation; sorting happens
//! when an ordered view is requested. Ordered views take `&mut self`, so the
//! borrow checker rules out a sort racing a mutation.
//!
//! ## Quantized Default Orders
//!
//! An entry added without an order lands one block (default 1000) after the
//! previously added sibling. Hand-written documents stay short, and there is
//! always room to slot a new entry between two blocks. See [`order`].
//!
//! ## Failures Are Collected, Not Raised
//!
//! One unreadable image should not hide the state of a thousand others. Bulk
//! I/O processes every face and returns one error tree describing every
//! failure; see [`bulk`].

pub mod bulk;
pub mod catalog;
pub mod config;
pub mod document;
pub mod imaging;
pub mod naming;
pub mod order;
pub mod output;
pub mod progress;

#[cfg(test)]
pub(crate) mod test_helpers;

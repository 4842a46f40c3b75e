//! Shared test utilities for the facepool test suite.
//!
//! Provides a small sample pool, on-disk fixtures with real PNG files, and
//! lookup helpers that panic with a clear message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let mut pool = sample_pool_on_disk(tmp.path());
//!
//! let niko = find_category(&pool, "Niko");
//! let face = find_face(niko, "Niko, happy");
//! assert_eq!(face.image_path(), "niko/happy.png");
//! ```

use image::{DynamicImage, Rgba, RgbaImage};
use std::path::Path;

use crate::catalog::{Category, Face, Pool};

/// Width and height of every fixture image.
pub const FIXTURE_SIZE: u32 = 8;

// =========================================================================
// Fixture setup
// =========================================================================

/// The sample catalogue:
///
/// ```text
/// Pool "OneShot"
/// ├── Niko   (characterName "Niko")
/// │   ├── Niko, happy      niko/happy.png
/// │   ├── Niko, sad        niko/sad.png
/// │   └── Niko, surprised  niko/surprised.png
/// └── Alula
///     └── Alula            alula/normal.png
/// ```
pub fn sample_pool() -> Pool {
    let mut pool = Pool::named("OneShot");

    let mut niko = Category::new("Niko");
    niko.set_character_name("Niko");
    for (name, path) in [
        ("Niko, happy", "niko/happy.png"),
        ("Niko, sad", "niko/sad.png"),
        ("Niko, surprised", "niko/surprised.png"),
    ] {
        niko.add(Face::new(name, path)).unwrap();
    }
    pool.add(niko).unwrap();

    let mut alula = Category::new("Alula");
    alula.add(Face::new("Alula", "alula/normal.png")).unwrap();
    pool.add(alula).unwrap();

    pool
}

/// [`sample_pool`] with a PNG written under `root` for every face.
pub fn sample_pool_on_disk(root: &Path) -> Pool {
    let pool = sample_pool();
    for category in pool.categories_unsorted() {
        for face in category.faces_unsorted() {
            write_fixture_png(&root.join(face.image_path()));
        }
    }
    pool
}

/// A pool holding exactly one category with one face.
pub fn single_face_pool(pool: Option<&str>, category: &str, face: &str, path: &str) -> Pool {
    let mut out = match pool {
        Some(name) => Pool::named(name),
        None => Pool::new(),
    };
    let mut c = Category::new(category);
    c.add(Face::new(face, path)).unwrap();
    out.add(c).unwrap();
    out
}

/// A small opaque image with one marked pixel.
pub fn fixture_image() -> DynamicImage {
    let mut img = RgbaImage::from_pixel(FIXTURE_SIZE, FIXTURE_SIZE, Rgba([255, 255, 255, 255]));
    img.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
    DynamicImage::ImageRgba8(img)
}

/// Write [`fixture_image`] as PNG, creating parent directories.
pub fn write_fixture_png(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    fixture_image()
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

// =========================================================================
// Catalogue lookups (panic with a clear message on miss)
// =========================================================================

/// Find a category by name. Panics if not found.
pub fn find_category<'a>(pool: &'a Pool, name: &str) -> &'a Category {
    pool.category(name).unwrap_or_else(|| {
        panic!(
            "category '{name}' not found. Available: {:?}",
            category_names(pool)
        )
    })
}

/// Find a face by name within a category. Panics if not found.
pub fn find_face<'a>(category: &'a Category, name: &str) -> &'a Face {
    category.face(name).unwrap_or_else(|| {
        panic!(
            "face '{name}' not found in '{}'. Available: {:?}",
            category.name(),
            face_names(category)
        )
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Category names in storage order.
pub fn category_names(pool: &Pool) -> Vec<&str> {
    pool.categories_unsorted().iter().map(|c| c.name()).collect()
}

/// Face names in storage order.
pub fn face_names(category: &Category) -> Vec<&str> {
    category.faces_unsorted().iter().map(|f| f.name()).collect()
}

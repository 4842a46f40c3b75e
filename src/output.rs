//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (category, face) is its name and positional index in
//! display order, with image paths shown as secondary context via indented
//! `Source:` lines.
//!
//! # Output Format
//!
//! ## Catalogue
//!
//! ```text
//! OneShot (4 faces)
//!     Faces from the base game
//! 001 Niko (3 faces)
//!     Character: Niko
//!     001 Niko, happy
//!         Source: niko/happy.png
//!         Character: Niko
//!     002 Niko, sad
//!         Source: niko/sad.png
//!         Order: 1000
//!         Character: Niko
//! 002 Alula (1 face)
//!     001 Alula
//!         Source: alula/normal.png
//! ```
//!
//! ## Image errors
//!
//! ```text
//! 1 face image(s) failed
//!     OneShot/Niko/Niko, sad: IO error: No such file or directory (os error 2)
//! ```
//!
//! ## Status
//!
//! ```text
//! OneShot: error (4 done, 1 failed)
//!     Niko: error (3 done, 1 failed)
//!     Alula: finished (1 done)
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::bulk::PoolImageError;
use crate::catalog::{Category, Face, Pool};
use crate::progress::{Status, StatusNode, UNNAMED_POOL};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn face_count(n: usize) -> String {
    match n {
        1 => "1 face".to_string(),
        n => format!("{n} faces"),
    }
}

/// Format an entity header: positional index + name, with optional face count.
///
/// ```text
/// 001 Niko (3 faces)
/// 001 Niko, happy
/// ```
fn entity_header(index: usize, name: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), name, face_count(n)),
        None => format!("{} {}", format_index(index), name),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// First description line as a truncated preview, if any.
fn description_preview(lines: &[String]) -> Option<String> {
    let first = lines.iter().map(|l| l.trim()).find(|l| !l.is_empty())?;
    Some(truncate_desc(first, 60))
}

// ============================================================================
// Catalogue
// ============================================================================

/// Format the catalogue tree in display order.
pub fn format_pool(pool: &mut Pool) -> Vec<String> {
    let mut lines = Vec::new();

    let title = pool.name().unwrap_or(UNNAMED_POOL);
    lines.push(format!("{} ({})", title, face_count(pool.face_count())));
    if let Some(desc) = description_preview(pool.description()) {
        lines.push(format!("{}{}", indent(1), desc));
    }
    for credit in pool.credits() {
        lines.push(format!("{}Credits: {}", indent(1), credit));
    }

    for (i, category) in pool.categories().iter().enumerate() {
        format_category(&mut lines, i + 1, category);
    }
    lines
}

fn format_category(lines: &mut Vec<String>, index: usize, category: &Category) {
    lines.push(entity_header(index, category.name(), Some(category.len())));
    if let Some(character) = category.character_name() {
        lines.push(format!("{}Character: {}", indent(1), character));
    }
    if let Some(desc) = description_preview(category.description()) {
        lines.push(format!("{}{}", indent(1), desc));
    }
    for (i, face) in category.faces_unsorted().iter().enumerate() {
        format_face(lines, i + 1, category, face);
    }
}

fn format_face(lines: &mut Vec<String>, index: usize, category: &Category, face: &Face) {
    let ctx = indent(2);
    lines.push(format!("{}{}", indent(1), entity_header(index, face.name(), None)));
    lines.push(format!("{}Source: {}", ctx, face.image_path()));
    if let Some(order) = face.order() {
        lines.push(format!("{}Order: {}", ctx, order));
    }
    let character = category.character_name_of(face);
    if character != face.name() {
        lines.push(format!("{}Character: {}", ctx, character));
    }
    if let Some(desc) = description_preview(face.description()) {
        lines.push(format!("{}{}", ctx, desc));
    }
    if let Some(image) = face.image() {
        lines.push(format!("{}Image: {}x{}", ctx, image.width(), image.height()));
    }
}

/// Print the catalogue tree to stdout.
pub fn print_pool(pool: &mut Pool) {
    for line in format_pool(pool) {
        println!("{}", line);
    }
}

// ============================================================================
// Image errors
// ============================================================================

/// Format a bulk I/O failure: one line per failing face path with its cause.
pub fn format_image_errors(err: &PoolImageError) -> Vec<String> {
    let mut lines = vec![format!("{} face image(s) failed", err.face_count())];
    for (path, cause) in err.failures_by_path() {
        lines.push(format!("{}{}: {}", indent(1), path, cause));
    }
    lines
}

/// Print a bulk I/O failure to stderr.
pub fn print_image_errors(err: &PoolImageError) {
    for line in format_image_errors(err) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Status
// ============================================================================

fn status_label(status: &Status) -> &'static str {
    match status {
        Status::Pending => "pending",
        Status::InProgress => "in progress",
        Status::Finished => "finished",
        Status::Error(_) => "error",
    }
}

fn status_line(depth: usize, node: &StatusNode) -> String {
    let counts = if node.failed > 0 {
        format!("{} done, {} failed", node.done, node.failed)
    } else {
        format!("{} done", node.done)
    };
    format!(
        "{}{}: {} ({})",
        indent(depth),
        node.name,
        status_label(&node.status),
        counts
    )
}

/// Format a status tree summary: the pool line, then one line per category.
pub fn format_status(root: &StatusNode) -> Vec<String> {
    let mut lines = vec![status_line(0, root)];
    for child in &root.children {
        lines.push(status_line(1, child));
    }
    lines
}

/// Print a status tree summary to stdout.
pub fn print_status(root: &StatusNode) {
    for line in format_status(root) {
        println!("{}", line);
    }
}

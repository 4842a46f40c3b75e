//! Centralized name handling for faces.
//!
//! Face names follow a loose `Character, expression` convention:
//!
//! - `"Niko, happy"` → character `"Niko"`
//! - `"Niko"` → character `"Niko"`
//! - `", blank"` → character `""`
//!
//! Faces are also addressed across a pool by a `<category>/<face>` path, split
//! on the first delimiter so face names may themselves contain `/`.

/// Delimiter between the category and face segments of a face path.
pub const PATH_DELIMITER: char = '/';

/// Character name derived from a face name: everything before the first comma.
pub fn derive_character_name(face_name: &str) -> &str {
    match face_name.find(',') {
        Some(idx) => &face_name[..idx],
        None => face_name,
    }
}

/// Split a face path into `(category, face)`. `None` if the delimiter is missing.
pub fn split_face_path(path: &str) -> Option<(&str, &str)> {
    path.split_once(PATH_DELIMITER)
}

/// Join path segments with [`PATH_DELIMITER`], skipping absent segments.
pub fn join_path<'a>(segments: impl IntoIterator<Item = Option<&'a str>>) -> String {
    let mut out = String::new();
    for segment in segments.into_iter().flatten() {
        if !out.is_empty() {
            out.push(PATH_DELIMITER);
        }
        out.push_str(segment);
    }
    out
}

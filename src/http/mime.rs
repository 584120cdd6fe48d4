//! MIME type detection module
//!
//! Maps a file extension (leading dot included) to its Content-Type.
//! Lookup is purely extension based; file contents are never inspected.

/// Content-Type used when an extension has no table entry
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extension to Content-Type table, fixed for the life of the process
pub static MIME_TYPES: &[(&str, &str)] = &[
    (".html", "text/html"),
    (".js", "text/javascript"),
    (".css", "text/css"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".wasm", "application/wasm"),
    (".data", "application/octet-stream"),
    (".worker.js", "text/javascript"),
];

/// Get MIME Content-Type for an extension such as `.wasm`
///
/// Unknown or empty extensions fall back to [`DEFAULT_CONTENT_TYPE`].
pub fn get_content_type(extension: &str) -> &'static str {
    MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map_or(DEFAULT_CONTENT_TYPE, |&(_, content_type)| content_type)
}

/// Extract the extension of the last path segment, leading dot included
///
/// Trailing slashes are ignored. A segment with no dot, a segment whose only
/// dot is its first character (`.bashrc`), and `..` have no extension.
pub fn extension_of(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);

    match segment.rfind('.') {
        None | Some(0) => "",
        Some(_) if segment == ".." => "",
        Some(dot) => &segment[dot..],
    }
}

/// Resolve the Content-Type for a filesystem path
pub fn content_type_for(path: &str) -> &'static str {
    get_content_type(extension_of(path))
}

//! String helpers for splitting a path into stem and extension.

use crate::config::CONTAINER_EXT;
use crate::error::{HzipError, Result};

fn is_dir_separator(c: char) -> bool {
    c == '/' || c == std::path::MAIN_SEPARATOR
}

/// Byte index of the dot that starts the extension of the last component.
fn extension_dot(path: &str) -> Result<usize> {
    for (i, c) in path.char_indices().rev() {
        if c == '.' {
            return Ok(i);
        }
        if is_dir_separator(c) {
            break;
        }
    }
    Err(HzipError::MissingExtension(path.to_string()))
}

/// Text after the last `.` of the file name, without the dot.
pub fn extension(path: &str) -> Result<&str> {
    let dot = extension_dot(path)?;
    Ok(&path[dot + 1..])
}

/// `path` with its trailing `.extension` removed.
pub fn stem(path: &str) -> Result<&str> {
    let dot = extension_dot(path)?;
    Ok(&path[..dot])
}

pub fn is_container(path: &str) -> bool {
    matches!(extension(path), Ok(ext) if ext == CONTAINER_EXT)
}

/// `dir/name.ext` -> `dir/name.hzip`
pub fn compressed_path(path: &str) -> Result<String> {
    Ok(format!("{}.{CONTAINER_EXT}", stem(path)?))
}

/// `dir/name.hzip` + `ext` -> `dir/name.ext`
///
/// The extension comes out of the container, so it may not name another
/// directory.
pub fn restored_path(container: &str, extension: &str) -> Result<String> {
    if extension.contains(is_dir_separator) || extension.contains('\\') {
        return Err(HzipError::InvalidExtension);
    }
    Ok(format!("{}.{extension}", stem(container)?))
}

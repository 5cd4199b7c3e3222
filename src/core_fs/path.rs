use crate::core_fs::error::PathError;
use std::path::{Path, PathBuf};

/// Resolves a client-supplied path against the session's working directory.
///
/// Both `cwd` and the result are virtual absolute paths, where `/` is the
/// user's home directory. Resolution is purely lexical: `.` segments and
/// empty segments are dropped and `..` pops one segment. A `..` that would
/// climb above `/` is a [`PathError::Violation`].
///
/// # Arguments
///
/// * `cwd` - The normalized virtual working directory.
/// * `arg` - The path as sent by the client, absolute or relative.
///
/// # Returns
///
/// The normalized virtual path, always starting with `/`.
pub fn resolve_virtual(cwd: &str, arg: &str) -> Result<String, PathError> {
    if arg.contains('\0') {
        return Err(PathError::InvalidCharacter);
    }

    let mut segments: Vec<&str> = if arg.starts_with('/') {
        Vec::new()
    } else {
        cwd.split('/').filter(|s| !s.is_empty()).collect()
    };

    for segment in arg.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(PathError::Violation(arg.to_string()));
                }
            }
            name => segments.push(name),
        }
    }

    Ok(format!("/{}", segments.join("/")))
}

/// Maps a resolved virtual path onto the real filesystem below `home`.
pub fn to_real_path(home: &Path, virtual_path: &str) -> PathBuf {
    let relative = virtual_path.trim_start_matches('/');
    if relative.is_empty() {
        home.to_path_buf()
    } else {
        home.join(relative)
    }
}

/// The parent of a virtual path; `/` is its own parent.
pub fn virtual_parent(virtual_path: &str) -> String {
    match virtual_path.trim_end_matches('/').rsplit_once('/') {
        Some(("", _)) | None => "/".to_string(),
        Some((parent, _)) => parent.to_string(),
    }
}

/// The last segment of a virtual path, or `/` for the root.
pub fn virtual_file_name(virtual_path: &str) -> &str {
    match virtual_path.rsplit_once('/') {
        Some((_, "")) | None => "/",
        Some((_, name)) => name,
    }
}

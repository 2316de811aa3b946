//! File validation utilities for loading and saving documents
//!
//! Validates paths before touching the file system, checking for:
//! - Empty or whitespace-only names
//! - Characters the platform rejects in file names
//! - File existence, permissions and directories

use std::fs;
use std::path::Path;

use crate::ini::IniError;

/// Characters Windows rejects anywhere in a file name
#[cfg(windows)]
const INVALID_NAME_CHARS: &[char] = &['<', '>', '"', '|', '?', '*'];

/// Validate the shape of a path argument without touching the file system
pub fn validate_path_argument(path: &Path) -> Result<(), IniError> {
    let raw = path.as_os_str().to_string_lossy();
    if raw.trim().is_empty() {
        return Err(IniError::EmptyPath);
    }

    if raw.contains('\0') {
        return Err(IniError::InvalidPath {
            path: path.to_path_buf(),
            reason: "contains a NUL character",
        });
    }

    #[cfg(windows)]
    if let Some(name) = path.file_name().map(|n| n.to_string_lossy()) {
        if name.contains(INVALID_NAME_CHARS) || name.chars().any(|c| (c as u32) < 0x20) {
            return Err(IniError::InvalidPath {
                path: path.to_path_buf(),
                reason: "contains characters not allowed in file names",
            });
        }
    }

    Ok(())
}

/// Validate a file before attempting to open it
///
/// Checks:
/// - The path argument is well formed
/// - File exists
/// - Is not a directory
/// - Has read permissions
pub fn validate_file_for_opening(path: &Path) -> Result<(), IniError> {
    validate_path_argument(path)?;

    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IniError::NotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => IniError::PermissionDenied(path.to_path_buf()),
        _ => IniError::Io(e),
    })?;

    if metadata.is_dir() {
        return Err(IniError::IsDirectory(path.to_path_buf()));
    }

    Ok(())
}

/// Get the filename from a path for display in messages
pub fn filename_for_display(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

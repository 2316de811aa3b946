//! Errors raised by document loading, saving and writes

use std::path::PathBuf;

use super::encoding::TextEncoding;

/// Errors that can occur when working with an INI document
///
/// Malformed INI text is never an error: it parses into undefined tokens.
#[derive(Debug)]
pub enum IniError {
    /// Path argument is empty or only whitespace
    EmptyPath,
    /// Path contains characters the platform does not allow in file names
    InvalidPath { path: PathBuf, reason: &'static str },
    /// Path is a directory, not a file
    IsDirectory(PathBuf),
    /// File does not exist
    NotFound(PathBuf),
    /// Permission denied to read file
    PermissionDenied(PathBuf),
    /// Key cannot be written as an entry
    InvalidKey { key: String, reason: &'static str },
    /// Value would not read back unchanged once written
    InvalidValue { value: String, reason: &'static str },
    /// Section name cannot be written as a header
    InvalidSection { section: String, reason: &'static str },
    /// `save` on a document that has no file behind it
    NoPath,
    /// Bytes are not valid in the selected encoding
    Decode {
        encoding: TextEncoding,
        message: String,
    },
    /// Other I/O error, passed through from the storage layer
    Io(std::io::Error),
}

impl std::fmt::Display for IniError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "file name is empty"),
            Self::InvalidPath { path, reason } => {
                write!(f, "invalid file name {}: {}", path.display(), reason)
            }
            Self::IsDirectory(path) => write!(f, "{} is a directory", path.display()),
            Self::NotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::PermissionDenied(path) => write!(f, "permission denied: {}", path.display()),
            Self::InvalidKey { key, reason } => write!(f, "invalid key {:?}: {}", key, reason),
            Self::InvalidValue { value, reason } => {
                write!(f, "invalid value {:?}: {}", value, reason)
            }
            Self::InvalidSection { section, reason } => {
                write!(f, "invalid section {:?}: {}", section, reason)
            }
            Self::NoPath => write!(f, "document has no file path"),
            Self::Decode { encoding, message } => {
                write!(f, "cannot decode {} text: {}", encoding, message)
            }
            Self::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for IniError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IniError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

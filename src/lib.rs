//! iniedit - format-preserving INI documents
//!
//! This crate provides an INI document type that reads and writes values
//! without disturbing the rest of the file, plus the configuration, logging
//! and command-line plumbing of the `iniedit` tool.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod ini;
pub mod tracing;
pub mod util;

// Re-export commonly used types
pub use config::ToolConfig;
pub use ini::{Comparison, DocumentOptions, IniDocument, IniError, TextEncoding};

//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::path::PathBuf;

use iniedit::{DocumentOptions, IniDocument, TextEncoding};
use tempfile::TempDir;

/// A small document with comments, blank lines and a global section
pub const SAMPLE: &str = "\
; generated by setup
name=demo

[Server]
host = localhost ; primary
port=8080

# storage
[Paths]
data=/var/lib/demo
";

/// Parse text with default options
pub fn doc(text: &str) -> IniDocument {
    IniDocument::with_options(text, &DocumentOptions::default())
}

/// Parse text with escape sequences enabled
pub fn escaped_doc(text: &str) -> IniDocument {
    IniDocument::with_options(text, &DocumentOptions::new().with_escapes(true))
}

/// Write `text` encoded as `encoding` into a fresh temp dir
///
/// The TempDir must be kept alive for as long as the file is used.
pub fn write_temp(text: &str, encoding: TextEncoding) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.ini");
    std::fs::write(&path, encoding.encode(text)).unwrap();
    (dir, path)
}

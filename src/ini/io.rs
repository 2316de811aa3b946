//! Loading and saving documents
//!
//! Bytes are decoded once on load and encoded once on save; in between the
//! document only deals in text.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use super::document::IniDocument;
use super::encoding::{self, TextEncoding};
use super::error::IniError;
use super::options::DocumentOptions;
use crate::util::{filename_for_display, validate_file_for_opening, validate_path_argument};

impl IniDocument {
    /// Read a document from any byte source
    ///
    /// A byte-order mark picks the encoding; without one the encoding in
    /// `options` is used, or UTF-8.
    pub fn from_reader<R: Read>(mut reader: R, options: &DocumentOptions) -> Result<Self, IniError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let encoding = encoding::detect(&bytes)
            .or(options.encoding)
            .unwrap_or_default();
        let text = encoding.decode(&bytes)?;

        let mut doc = Self::with_options(&text, options);
        doc.encoding = encoding;
        Ok(doc)
    }

    /// Load a document from a file
    pub fn load(path: impl AsRef<Path>, options: &DocumentOptions) -> Result<Self, IniError> {
        let path = path.as_ref();
        validate_file_for_opening(path)?;

        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let mut doc = Self::from_reader(BufReader::new(file), options)?;
        doc.file_path = Some(path.to_path_buf());

        tracing::info!(
            "Loaded {} ({}, {} chars)",
            filename_for_display(path),
            doc.encoding,
            doc.text().chars().count()
        );
        Ok(doc)
    }

    /// Load a document, creating an empty file first when it does not exist
    pub fn load_or_create(
        path: impl AsRef<Path>,
        options: &DocumentOptions,
    ) -> Result<Self, IniError> {
        let path = path.as_ref();
        validate_path_argument(path)?;

        if !path.exists() {
            tracing::info!("Creating {}", path.display());
            File::create(path).map_err(|e| open_error(path, e))?;
        }
        Self::load(path, options)
    }

    /// Write the text back to the file it was loaded from
    ///
    /// `encoding` replaces the document's encoding when given.
    pub fn save(&mut self, encoding: Option<TextEncoding>) -> Result<(), IniError> {
        let path = self.file_path.clone().ok_or(IniError::NoPath)?;
        let encoding = encoding.unwrap_or(self.encoding);
        self.write_file(&path, encoding)?;
        self.encoding = encoding;
        self.is_modified = false;
        Ok(())
    }

    /// Write the text to `path`, which becomes the document's file
    ///
    /// `encoding` replaces the document's encoding when given.
    pub fn save_as(
        &mut self,
        path: impl AsRef<Path>,
        encoding: Option<TextEncoding>,
    ) -> Result<(), IniError> {
        let path = path.as_ref();
        validate_path_argument(path)?;

        let encoding = encoding.unwrap_or(self.encoding);
        self.write_file(path, encoding)?;

        self.file_path = Some(path.to_path_buf());
        self.encoding = encoding;
        self.is_modified = false;
        Ok(())
    }

    /// Encode the text into `writer`, preamble included
    pub fn write_to<W: Write>(
        &self,
        mut writer: W,
        encoding: Option<TextEncoding>,
    ) -> Result<(), IniError> {
        let encoding = encoding.unwrap_or(self.encoding);
        writer.write_all(&encoding.encode(&self.text()))?;
        writer.flush()?;
        Ok(())
    }

    fn write_file(&self, path: &Path, encoding: TextEncoding) -> Result<(), IniError> {
        if path.is_dir() {
            return Err(IniError::IsDirectory(path.to_path_buf()));
        }
        let bytes = encoding.encode(&self.text());
        fs::write(path, &bytes).map_err(|e| open_error(path, e))?;
        tracing::info!(
            "Saved {} ({}, {} bytes)",
            filename_for_display(path),
            encoding,
            bytes.len()
        );
        Ok(())
    }
}

fn open_error(path: &Path, e: std::io::Error) -> IniError {
    let path: PathBuf = path.to_path_buf();
    match e.kind() {
        std::io::ErrorKind::NotFound => IniError::NotFound(path),
        std::io::ErrorKind::PermissionDenied => IniError::PermissionDenied(path),
        _ => IniError::Io(e),
    }
}

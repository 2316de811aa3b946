//! INI document - the text buffer plus its lookup index
//!
//! The rope buffer is the only source of truth. Reads go through an index
//! built lazily from the buffer; every buffer change drops the index.
//!
//! Writes take one of two paths:
//! - **fast path**: the key is indexed, so its last value is replaced in place
//!   at the recorded span
//! - **slow path**: the key is new, so the text is scanned for an insertion
//!   point and a `key=value` line (and, if needed, a `[section]` header) is
//!   spliced in
//!
//! Nothing else in the text is touched, so comments, ordering, spacing and
//! line breaks survive edits.

use ropey::Rope;
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::encoding::TextEncoding;
use super::error::IniError;
use super::escape::escape;
use super::index::{CacheState, Index, IndexCache, GLOBAL_SECTION};
use super::options::{Comparison, DocumentOptions};
use super::tokenizer::{Span, TokenKind, Tokenizer};

/// Line break used when the text has none to copy
#[cfg(windows)]
pub const DEFAULT_LINE_BREAK: &str = "\r\n";
#[cfg(not(windows))]
pub const DEFAULT_LINE_BREAK: &str = "\n";

/// Pick the line break a text already uses
///
/// `\r\n` when both `\r` and `\n` occur, otherwise whichever one occurs,
/// otherwise [`DEFAULT_LINE_BREAK`].
pub fn detect_line_break(text: &str) -> &'static str {
    match (text.contains('\r'), text.contains('\n')) {
        (true, true) => "\r\n",
        (false, true) => "\n",
        (true, false) => "\r",
        (false, false) => DEFAULT_LINE_BREAK,
    }
}

/// Where the slow path puts a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Insertion {
    /// Overwrite an entry the index did not know about
    Replace(Span),
    /// New line after the line containing this character offset
    AfterLine(usize),
    /// New line at the very start (empty global section)
    AtStart,
    /// New `[section]` block at the end of the text
    AppendSection,
}

/// An INI document backed by a mutable text buffer
#[derive(Debug, Clone)]
pub struct IniDocument {
    /// The text buffer
    buffer: Rope,
    line_break: &'static str,
    comparison: Comparison,
    allow_escapes: bool,
    /// Derived lookup structures, dropped on every buffer change
    index: IndexCache,
    /// File the document was loaded from (None for in-memory documents)
    pub(crate) file_path: Option<PathBuf>,
    /// Encoding used by `save(None)`
    pub(crate) encoding: TextEncoding,
    /// Whether the buffer changed since load or the last save
    pub(crate) is_modified: bool,
}

impl IniDocument {
    /// Create an empty document with default options
    pub fn new() -> Self {
        Self::with_options("", &DocumentOptions::default())
    }

    /// Create a document from text
    pub fn with_options(text: &str, options: &DocumentOptions) -> Self {
        Self {
            buffer: Rope::from_str(text),
            line_break: detect_line_break(text),
            comparison: options.comparison,
            allow_escapes: options.allow_escapes,
            index: IndexCache::default(),
            file_path: None,
            encoding: options.encoding.unwrap_or_default(),
            is_modified: false,
        }
    }

    /// The whole buffer as a string
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn line_break(&self) -> &'static str {
        self.line_break
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn allows_escapes(&self) -> bool {
        self.allow_escapes
    }

    pub fn path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub fn cache_state(&self) -> CacheState {
        self.index.state()
    }

    fn index(&self) -> &Index {
        self.index.get_or_build(|| {
            Index::build(&self.buffer.to_string(), self.comparison, self.allow_escapes)
        })
    }

    fn mark_changed(&mut self) {
        self.index.invalidate();
        self.is_modified = true;
    }

    // ========================================================================
    // Read path
    // ========================================================================

    /// Value of the last occurrence of `key`, `None` section meaning global
    pub fn get(&self, section: Option<&str>, key: &str) -> Option<&str> {
        self.index()
            .last_value(section.unwrap_or(GLOBAL_SECTION), key)
    }

    /// Like [`get`](Self::get), falling back to `default`
    pub fn get_value<'a>(&'a self, section: Option<&str>, key: &str, default: &'a str) -> &'a str {
        self.get(section, key).unwrap_or(default)
    }

    /// Every value of `key` in document order
    pub fn get_values(&self, section: Option<&str>, key: &str) -> &[String] {
        self.index()
            .key(section.unwrap_or(GLOBAL_SECTION), key)
            .map(|entry| entry.values())
            .unwrap_or(&[])
    }

    /// Parse the value of `key` via `FromStr`
    pub fn get_parsed<T: FromStr>(
        &self,
        section: Option<&str>,
        key: &str,
    ) -> Result<Option<T>, T::Err> {
        self.get(section, key).map(str::parse).transpose()
    }

    pub fn contains_key(&self, section: Option<&str>, key: &str) -> bool {
        self.index()
            .key(section.unwrap_or(GLOBAL_SECTION), key)
            .is_some()
    }

    /// Whether a `[section]` header exists (the global section always does)
    pub fn contains_section(&self, section: Option<&str>) -> bool {
        self.index()
            .section(section.unwrap_or(GLOBAL_SECTION))
            .is_some()
    }

    /// Keys of a section in order of first appearance
    pub fn keys(&self, section: Option<&str>) -> Vec<&str> {
        self.index()
            .section(section.unwrap_or(GLOBAL_SECTION))
            .map(|s| s.keys().map(|k| k.name()).collect())
            .unwrap_or_default()
    }

    /// Section names in order of first appearance
    ///
    /// The global section is listed (as `""`) only when it has keys.
    pub fn sections(&self) -> Vec<&str> {
        self.index()
            .sections()
            .filter(|s| !(s.is_global() && s.is_empty()))
            .map(|s| s.name())
            .collect()
    }

    // ========================================================================
    // Write path
    // ========================================================================

    /// Set the value of `key`, `None` section meaning global
    ///
    /// Overwrites the last occurrence when the key exists, otherwise adds a
    /// new entry (creating the section at the end if necessary). Values that
    /// would not read back unchanged (edge whitespace, comment markers, raw
    /// line breaks) are rejected with [`IniError::InvalidValue`].
    pub fn set_value(
        &mut self,
        section: Option<&str>,
        key: &str,
        value: &str,
    ) -> Result<(), IniError> {
        validate_key(key)?;
        let section = section.unwrap_or(GLOBAL_SECTION);
        validate_section(section)?;

        let raw = if self.allow_escapes {
            escape(value)
        } else {
            Cow::Borrowed(value)
        };
        validate_value(value, &raw)?;

        if let Some(span) = self.index().last_span(section, key) {
            tracing::trace!("Fast path write [{}] {} at {:?}", section, key, span);
            self.replace_span(span, &raw);
            return Ok(());
        }

        let insertion = self.plan_insertion(section, key);
        tracing::debug!("Slow path write [{}] {}: {:?}", section, key, insertion);
        match insertion {
            Insertion::Replace(span) => self.replace_span(span, &raw),
            Insertion::AfterLine(offset) => {
                let at = self.end_of_line(offset);
                let line = format!("{}{}={}", self.line_break, key, raw);
                self.buffer.insert(at, &line);
                self.mark_changed();
            }
            Insertion::AtStart => {
                let line = format!("{}={}{}", key, raw, self.line_break);
                self.buffer.insert(0, &line);
                self.mark_changed();
            }
            Insertion::AppendSection => self.append_section(section, key, &raw),
        }
        Ok(())
    }

    /// Replace the characters at `span`; identical text leaves the buffer alone
    fn replace_span(&mut self, span: Span, raw: &str) {
        if self.buffer.slice(span.range()) == raw {
            return;
        }
        self.buffer.remove(span.range());
        self.buffer.insert(span.start, raw);
        self.mark_changed();
    }

    /// Scan the text for where a value of `key` in `section` belongs
    fn plan_insertion(&self, section: &str, key: &str) -> Insertion {
        let text = self.buffer.to_string();
        let global = section == GLOBAL_SECTION;
        let mut in_section = global;
        let mut existing = None;
        let mut last_entry_end = None;
        let mut last_header_end = None;

        for token in Tokenizer::new(&text) {
            match token.kind {
                // Global entries must precede every header
                TokenKind::Section { .. } if global => break,
                TokenKind::Section { name } => {
                    in_section = self.comparison.matches(name, section);
                    if in_section {
                        last_header_end = Some(token.span.end());
                    }
                }
                TokenKind::Entry {
                    key: entry_key,
                    value_span,
                    ..
                } if in_section => {
                    if self.comparison.matches(entry_key, key) {
                        existing = Some(value_span);
                    }
                    last_entry_end = Some(token.span.end());
                }
                _ => {}
            }
        }

        if let Some(span) = existing {
            Insertion::Replace(span)
        } else if let Some(end) = last_entry_end.or(last_header_end) {
            Insertion::AfterLine(end)
        } else if global {
            Insertion::AtStart
        } else {
            Insertion::AppendSection
        }
    }

    /// Character offset of the line break ending the line that contains `offset`
    fn end_of_line(&self, offset: usize) -> usize {
        let rest = self
            .buffer
            .chars_at(offset)
            .take_while(|&ch| ch != '\r' && ch != '\n')
            .count();
        offset + rest
    }

    fn append_section(&mut self, section: &str, key: &str, raw: &str) {
        let len = self.buffer.len_chars();
        let mut block = String::new();
        if len > 0 {
            let last = self.buffer.char(len - 1);
            if last != '\n' && last != '\r' {
                block.push_str(self.line_break);
            }
            block.push_str(self.line_break);
        }
        block.push_str(&format!(
            "[{}]{lb}{}={}{lb}",
            section,
            key,
            raw,
            lb = self.line_break
        ));
        self.buffer.insert(len, &block);
        self.mark_changed();
    }
}

/// Keys must read back as the same key once written
fn validate_key(key: &str) -> Result<(), IniError> {
    let reason = if key.trim().is_empty() {
        Some("key is blank")
    } else if key.trim() != key {
        Some("key has leading or trailing whitespace")
    } else if key.contains(['=', ':']) {
        Some("key contains a delimiter")
    } else if key.contains(['[', ']']) {
        Some("key contains a bracket")
    } else if key.contains(['\r', '\n']) {
        Some("key contains a line break")
    } else if key.starts_with(['#', ';']) {
        Some("key starts with a comment marker")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(IniError::InvalidKey {
            key: key.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Values must read back unchanged from their raw (possibly escaped) form
fn validate_value(value: &str, raw: &str) -> Result<(), IniError> {
    let reason = if raw.trim() != raw {
        Some("value has leading or trailing whitespace")
    } else if raw.contains(['#', ';']) {
        Some("value contains a comment marker")
    } else if raw.contains(['\r', '\n']) {
        Some("value contains a line break")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(IniError::InvalidValue {
            value: value.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Section names must read back as the same header once written
fn validate_section(section: &str) -> Result<(), IniError> {
    if section == GLOBAL_SECTION {
        return Ok(());
    }
    let reason = if section.trim().is_empty() {
        Some("section name is blank")
    } else if section.trim() != section {
        Some("section name has leading or trailing whitespace")
    } else if section.contains(['[', ']']) {
        Some("section name contains a bracket")
    } else if section.contains(['\r', '\n']) {
        Some("section name contains a line break")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(IniError::InvalidSection {
            section: section.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

impl Default for IniDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for IniDocument {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::with_options(s, &DocumentOptions::default()))
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.buffer.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

/// `doc[("section", "key")]`, empty string when missing; `""` is the global section
impl<'s, 'k> std::ops::Index<(&'s str, &'k str)> for IniDocument {
    type Output = str;

    fn index(&self, (section, key): (&'s str, &'k str)) -> &str {
        self.get_value(Some(section), key, "")
    }
}

/// `doc[("section", "key", "default")]`
impl<'s, 'k> std::ops::Index<(&'s str, &'k str, &'static str)> for IniDocument {
    type Output = str;

    fn index(&self, (section, key, default): (&'s str, &'k str, &'static str)) -> &str {
        self.get_value(Some(section), key, default)
    }
}

//! Lookup index derived from document text
//!
//! The index is a pure function of the text. It is never patched: any change
//! to the text throws it away and the next read rebuilds it.

use std::cell::OnceCell;
use std::collections::HashMap;

use super::escape::unescape;
use super::options::Comparison;
use super::tokenizer::{Span, TokenKind, Tokenizer};

/// Name of the implicit section before the first header
pub const GLOBAL_SECTION: &str = "";

/// Every occurrence of one key within a section
#[derive(Debug, Clone)]
pub struct KeyEntry {
    /// Spelling of the first occurrence
    name: String,
    /// Decoded values in document order
    values: Vec<String>,
    /// Raw value locations in document order, parallel to `values`
    spans: Vec<Span>,
}

impl KeyEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Value of the last occurrence
    pub fn last_value(&self) -> Option<&str> {
        self.values.last().map(String::as_str)
    }

    pub fn last_span(&self) -> Option<Span> {
        self.spans.last().copied()
    }
}

/// One logical section; repeated headers merge into the same entry
#[derive(Debug, Clone)]
pub struct SectionEntry {
    name: String,
    lookup: HashMap<String, usize>,
    keys: Vec<KeyEntry>,
}

impl SectionEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            lookup: HashMap::new(),
            keys: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_global(&self) -> bool {
        self.name == GLOBAL_SECTION
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in order of first appearance
    pub fn keys(&self) -> impl Iterator<Item = &KeyEntry> {
        self.keys.iter()
    }

    pub fn key(&self, name: &str, comparison: Comparison) -> Option<&KeyEntry> {
        self.lookup
            .get(comparison.fold(name).as_ref())
            .map(|&i| &self.keys[i])
    }

    fn push(&mut self, key: &str, value: String, span: Span, comparison: Comparison) {
        let folded = comparison.fold(key);
        let slot = match self.lookup.get(folded.as_ref()) {
            Some(&i) => i,
            None => {
                self.lookup.insert(folded.into_owned(), self.keys.len());
                self.keys.push(KeyEntry {
                    name: key.to_string(),
                    values: Vec::new(),
                    spans: Vec::new(),
                });
                self.keys.len() - 1
            }
        };
        let entry = &mut self.keys[slot];
        entry.values.push(value);
        entry.spans.push(span);
    }
}

/// Sections, keys, values and value spans of one text snapshot
#[derive(Debug, Clone)]
pub struct Index {
    comparison: Comparison,
    lookup: HashMap<String, usize>,
    /// Sections in order of first appearance; the global section is first
    sections: Vec<SectionEntry>,
}

impl Index {
    fn empty(comparison: Comparison) -> Self {
        let mut lookup = HashMap::new();
        lookup.insert(GLOBAL_SECTION.to_string(), 0);
        Self {
            comparison,
            lookup,
            sections: vec![SectionEntry::new(GLOBAL_SECTION)],
        }
    }

    /// Build the index for `text`
    ///
    /// Never fails: text that is not a comment, header or entry contributes
    /// nothing.
    pub fn build(text: &str, comparison: Comparison, allow_escapes: bool) -> Self {
        let mut index = Self::empty(comparison);
        let mut current = 0;
        let mut entries = 0usize;

        for token in Tokenizer::new(text) {
            match token.kind {
                TokenKind::Section { name } => current = index.section_slot(name),
                TokenKind::Entry {
                    key,
                    value,
                    value_span,
                } => {
                    let value = if allow_escapes {
                        unescape(value).into_owned()
                    } else {
                        value.to_string()
                    };
                    index.sections[current].push(key, value, value_span, comparison);
                    entries += 1;
                }
                _ => {}
            }
        }

        tracing::debug!(
            "Built index: {} sections, {} entries from {} chars",
            index.sections.len(),
            entries,
            text.chars().count()
        );
        index
    }

    fn section_slot(&mut self, name: &str) -> usize {
        let folded = self.comparison.fold(name);
        if let Some(&i) = self.lookup.get(folded.as_ref()) {
            return i;
        }
        self.lookup.insert(folded.into_owned(), self.sections.len());
        self.sections.push(SectionEntry::new(name));
        self.sections.len() - 1
    }

    pub fn section(&self, name: &str) -> Option<&SectionEntry> {
        self.lookup
            .get(self.comparison.fold(name).as_ref())
            .map(|&i| &self.sections[i])
    }

    /// All sections, including the global one even when it is empty
    pub fn sections(&self) -> impl Iterator<Item = &SectionEntry> {
        self.sections.iter()
    }

    pub fn key(&self, section: &str, key: &str) -> Option<&KeyEntry> {
        self.section(section)?.key(key, self.comparison)
    }

    pub fn last_value(&self, section: &str, key: &str) -> Option<&str> {
        self.key(section, key)?.last_value()
    }

    pub fn last_span(&self, section: &str, key: &str) -> Option<Span> {
        self.key(section, key)?.last_span()
    }
}

/// Whether the cached index matches the current text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Text changed since the last build; the next read rebuilds
    Stale,
    Fresh,
}

/// Memoized index, built on first read after a change
#[derive(Debug, Clone, Default)]
pub struct IndexCache {
    cell: OnceCell<Index>,
}

impl IndexCache {
    pub fn state(&self) -> CacheState {
        if self.cell.get().is_some() {
            CacheState::Fresh
        } else {
            CacheState::Stale
        }
    }

    /// Return the cached index, building it first when stale
    pub fn get_or_build(&self, build: impl FnOnce() -> Index) -> &Index {
        self.cell.get_or_init(build)
    }

    pub fn invalidate(&mut self) {
        if self.cell.take().is_some() {
            tracing::trace!("Index invalidated");
        }
    }
}

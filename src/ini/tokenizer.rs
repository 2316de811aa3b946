//! INI tokenizer
//!
//! Splits text into a gapless sequence of tokens. At each position the
//! candidates are tried in priority order:
//!
//! 1. comment: `#`/`;` markers, then text to end of line
//! 2. section header: `[ name ]`
//! 3. entry: `key = value` or `key: value`, value stopping at `#`, `;` or EOL
//! 4. undefined: any other run of non-whitespace
//! 5. line break: `\r\n`, `\n` or `\r`
//! 6. whitespace: a run of non-newline whitespace
//!
//! No token other than whitespace starts or ends on whitespace, so the value
//! of an entry never picks up the padding around it. Every input is
//! tokenizable; concatenating the raw text of all tokens gives back the input.

use std::ops::Range;

/// A character range inside the scanned text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Offset in characters from the start of the text
    pub start: usize,
    /// Length in characters
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Comment {
        /// The run of `#`/`;` characters
        marker: &'a str,
        /// Comment text after the marker, without leading whitespace
        body: &'a str,
    },
    Section {
        name: &'a str,
    },
    Entry {
        key: &'a str,
        /// Raw value text, still escaped
        value: &'a str,
        /// Where `value` lives; zero-length right after the delimiter when empty
        value_span: Span,
    },
    Undefined,
    LineBreak,
    Whitespace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// Exact source text of the token
    pub raw: &'a str,
    pub span: Span,
}

/// Lazy token iterator over a borrowed text
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    text: &'a str,
    /// Byte position of the next token
    pos: usize,
    /// Character position of the next token
    char_pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            char_pos: 0,
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = &self.text[self.pos..];
        if rest.is_empty() {
            return None;
        }

        let (kind, byte_len) = scan_token(rest, self.char_pos);
        let raw = &rest[..byte_len];
        let char_len = raw.chars().count();
        let token = Token {
            kind,
            raw,
            span: Span::new(self.char_pos, char_len),
        };

        self.pos += byte_len;
        self.char_pos += char_len;
        Some(token)
    }
}

/// Tokenize a whole text
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    Tokenizer::new(text).collect()
}

/// Classify the token at the start of `rest`, returning its kind and byte length
///
/// `rest` is never empty. `char_pos` is the character offset of `rest` in the
/// full text, needed to place entry value spans.
fn scan_token(rest: &str, char_pos: usize) -> (TokenKind<'_>, usize) {
    if let Some(len) = scan_line_break(rest) {
        return (TokenKind::LineBreak, len);
    }
    if let Some(len) = scan_whitespace(rest) {
        return (TokenKind::Whitespace, len);
    }
    if let Some(found) = scan_comment(rest) {
        return found;
    }
    if let Some(found) = scan_section(rest) {
        return found;
    }
    if let Some(found) = scan_entry(rest, char_pos) {
        return found;
    }
    (TokenKind::Undefined, scan_undefined(rest))
}

fn is_line_break(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}

fn is_inline_space(ch: char) -> bool {
    ch.is_whitespace() && ch != '\r' && ch != '\n'
}

/// Byte index of the end of the current line (before any line break)
fn line_end(rest: &str) -> usize {
    rest.bytes().position(is_line_break).unwrap_or(rest.len())
}

fn scan_line_break(rest: &str) -> Option<usize> {
    if rest.starts_with("\r\n") {
        Some(2)
    } else if rest.starts_with('\n') || rest.starts_with('\r') {
        Some(1)
    } else {
        None
    }
}

fn scan_whitespace(rest: &str) -> Option<usize> {
    let len = rest
        .char_indices()
        .find(|&(_, ch)| !is_inline_space(ch))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    (len > 0).then_some(len)
}

fn scan_comment(rest: &str) -> Option<(TokenKind<'_>, usize)> {
    let marker_len = rest
        .bytes()
        .position(|b| b != b'#' && b != b';')
        .unwrap_or(rest.len());
    if marker_len == 0 {
        return None;
    }

    let line = rest[..line_end(rest)].trim_end();
    let body = line[marker_len..].trim_start();
    Some((
        TokenKind::Comment {
            marker: &rest[..marker_len],
            body,
        },
        line.len(),
    ))
}

fn scan_section(rest: &str) -> Option<(TokenKind<'_>, usize)> {
    if !rest.starts_with('[') {
        return None;
    }

    let line = &rest[..line_end(rest)];
    let close = line[1..].find(|ch| ch == '[' || ch == ']')? + 1;
    if line.as_bytes()[close] != b']' {
        return None;
    }

    let name = line[1..close].trim();
    if name.is_empty() {
        return None;
    }
    Some((TokenKind::Section { name }, close + 1))
}

fn scan_entry(rest: &str, char_pos: usize) -> Option<(TokenKind<'_>, usize)> {
    let delimiter = rest
        .bytes()
        .position(|b| matches!(b, b'=' | b':' | b'\r' | b'\n' | b'[' | b']'))?;
    if !matches!(rest.as_bytes()[delimiter], b'=' | b':') {
        return None;
    }

    let key = rest[..delimiter].trim_end();
    if key.is_empty() {
        return None;
    }

    let value_from = delimiter + 1;
    let region_len = rest[value_from..]
        .bytes()
        .position(|b| matches!(b, b'#' | b';' | b'\r' | b'\n'))
        .unwrap_or(rest.len() - value_from);
    let region = &rest[value_from..value_from + region_len];

    let value = region.trim();
    let (value_start, token_end) = if value.is_empty() {
        (value_from, value_from)
    } else {
        let start = value_from + (region.len() - region.trim_start().len());
        (start, start + value.len())
    };

    let value_span = Span::new(
        char_pos + rest[..value_start].chars().count(),
        value.chars().count(),
    );
    Some((
        TokenKind::Entry {
            key,
            value,
            value_span,
        },
        token_end,
    ))
}

fn scan_undefined(rest: &str) -> usize {
    rest.char_indices()
        .find(|&(_, ch)| ch.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(rest.len())
}

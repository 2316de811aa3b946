//! Backslash escapes for values
//!
//! Only applied to entry values, never to keys or section names.

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

fn escape_sequence(ch: char) -> Option<&'static str> {
    match ch {
        '\\' => Some("\\\\"),
        '\0' => Some("\\0"),
        '\x07' => Some("\\a"),
        '\x08' => Some("\\b"),
        '\n' => Some("\\n"),
        '\r' => Some("\\r"),
        '\x0C' => Some("\\f"),
        '\t' => Some("\\t"),
        '\x0B' => Some("\\v"),
        _ => None,
    }
}

/// Replace control characters and backslashes with escape sequences
pub fn escape(value: &str) -> Cow<'_, str> {
    if !value.chars().any(|ch| escape_sequence(ch).is_some()) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match escape_sequence(ch) {
            Some(seq) => out.push_str(seq),
            None => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Resolve escape sequences
///
/// Besides the sequences [`escape`] produces, accepts `\xHH`, `\uHHHH` and
/// `\cX`. Malformed numeric escapes decode to `?`; unknown escapes are kept
/// as written.
pub fn unescape(value: &str) -> Cow<'_, str> {
    if !value.contains('\\') {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        let Some(code) = chars.next() else {
            out.push('\\');
            break;
        };
        match code {
            '\\' => out.push('\\'),
            '0' => out.push('\0'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'f' => out.push('\x0C'),
            't' => out.push('\t'),
            'v' => out.push('\x0B'),
            'x' => out.push(hex_char(&mut chars, 2)),
            'u' => out.push(hex_char(&mut chars, 4)),
            'c' => out.push(control_char(chars.next())),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Cow::Owned(out)
}

fn hex_char(chars: &mut Peekable<Chars<'_>>, digits: usize) -> char {
    let mut value = 0u32;
    for _ in 0..digits {
        match chars.peek().and_then(|ch| ch.to_digit(16)) {
            Some(digit) => {
                value = value * 16 + digit;
                chars.next();
            }
            None => return '?',
        }
    }
    char::from_u32(value).unwrap_or('?')
}

/// `\cX`: the control character at `X - 0x40` after uppercasing
fn control_char(letter: Option<char>) -> char {
    letter
        .map(|ch| ch.to_ascii_uppercase() as u32)
        .and_then(|code| code.checked_sub(0x40))
        .and_then(char::from_u32)
        .filter(|ch| ch.is_control())
        .unwrap_or('?')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(escape("line1\nline2"), "line1\\nline2");
        assert_eq!(escape("a\tb\r\n"), "a\\tb\\r\\n");
        assert_eq!(escape("\0\x07\x08\x0B\x0C"), "\\0\\a\\b\\v\\f");
        assert_eq!(escape("C:\\path"), "C:\\\\path");
    }

    #[test]
    fn test_escape_borrows_plain_text() {
        assert!(matches!(escape("plain value"), Cow::Borrowed(_)));
        assert!(matches!(unescape("plain value"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_leaves_other_characters() {
        assert_eq!(escape("#;=[]\"'ü"), "#;=[]\"'ü");
    }

    #[test]
    fn test_unescape_reverses_escape() {
        let original = "tab\there\nnew \\ line\0end\x07\x08\x0B\x0C\r";
        assert_eq!(unescape(&escape(original)), original);
    }

    #[test]
    fn test_unescape_hex() {
        assert_eq!(unescape("\\x41\\x7e"), "A~");
        assert_eq!(unescape("\\u00e9\\u263A"), "é☺");
    }

    #[test]
    fn test_unescape_bad_hex_yields_question_mark() {
        assert_eq!(unescape("\\xZ1"), "?Z1");
        assert_eq!(unescape("\\x4"), "?");
        assert_eq!(unescape("\\u12G4"), "?G4");
        // Lone surrogate is not a char
        assert_eq!(unescape("\\uD800"), "?");
    }

    #[test]
    fn test_unescape_control_notation() {
        assert_eq!(unescape("\\cA"), "\x01");
        assert_eq!(unescape("\\ca"), "\x01");
        assert_eq!(unescape("\\c["), "\x1B");
        assert_eq!(unescape("\\c@"), "\0");
        assert_eq!(unescape("\\c1"), "?");
        assert_eq!(unescape("\\c"), "?");
    }

    #[test]
    fn test_unescape_unknown_sequence_is_literal() {
        assert_eq!(unescape("\\q\\#"), "\\q\\#");
    }

    #[test]
    fn test_unescape_trailing_backslash() {
        assert_eq!(unescape("end\\"), "end\\");
    }
}

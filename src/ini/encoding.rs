//! Text encodings for INI files
//!
//! Detection only looks at byte-order marks. Files without one are decoded
//! with the caller's fallback, or UTF-8.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::IniError;

/// Encodings a document can be loaded from and saved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    #[serde(rename = "utf-7")]
    Utf7,
    /// UTF-8 without a byte-order mark
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "utf-8-bom")]
    Utf8Bom,
    #[serde(rename = "utf-16le")]
    Utf16Le,
    #[serde(rename = "utf-16be")]
    Utf16Be,
    #[serde(rename = "utf-32le")]
    Utf32Le,
    #[serde(rename = "utf-32be")]
    Utf32Be,
}

const UTF7_BOM: &[u8] = b"+/v8-";
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];
const UTF32LE_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
const UTF32BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

/// Detect an encoding from the byte-order mark at the start of `bytes`
///
/// UTF-32 LE is checked before UTF-16 LE since their marks share a prefix.
pub fn detect(bytes: &[u8]) -> Option<TextEncoding> {
    match bytes {
        [0x2B, 0x2F, 0x76, ..] => Some(TextEncoding::Utf7),
        [0xEF, 0xBB, 0xBF, ..] => Some(TextEncoding::Utf8Bom),
        [0x00, 0x00, 0xFE, 0xFF, ..] => Some(TextEncoding::Utf32Be),
        [0xFF, 0xFE, 0x00, 0x00, ..] => Some(TextEncoding::Utf32Le),
        [0xFF, 0xFE, ..] => Some(TextEncoding::Utf16Le),
        [0xFE, 0xFF, ..] => Some(TextEncoding::Utf16Be),
        _ => None,
    }
}

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf7 => "utf-7",
            Self::Utf8 => "utf-8",
            Self::Utf8Bom => "utf-8-bom",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
            Self::Utf32Le => "utf-32le",
            Self::Utf32Be => "utf-32be",
        }
    }

    /// Byte-order mark written in front of encoded text
    pub fn preamble(self) -> &'static [u8] {
        match self {
            Self::Utf7 => UTF7_BOM,
            Self::Utf8 => &[],
            Self::Utf8Bom => UTF8_BOM,
            Self::Utf16Le => UTF16LE_BOM,
            Self::Utf16Be => UTF16BE_BOM,
            Self::Utf32Le => UTF32LE_BOM,
            Self::Utf32Be => UTF32BE_BOM,
        }
    }

    /// Decode `bytes`, dropping a leading byte-order mark if present
    pub fn decode(self, bytes: &[u8]) -> Result<String, IniError> {
        let text = match self {
            Self::Utf7 => decode_utf7(bytes).map_err(|message| self.error(message))?,
            Self::Utf8 | Self::Utf8Bom => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                String::from_utf8(body.to_vec()).map_err(|e| self.error(e.to_string()))?
            }
            Self::Utf16Le | Self::Utf16Be => {
                let body = bytes.strip_prefix(self.preamble()).unwrap_or(bytes);
                if body.len() % 2 != 0 {
                    return Err(self.error("odd number of bytes".to_string()));
                }
                let units = body.chunks_exact(2).map(|pair| {
                    let pair = [pair[0], pair[1]];
                    if self == Self::Utf16Le {
                        u16::from_le_bytes(pair)
                    } else {
                        u16::from_be_bytes(pair)
                    }
                });
                char::decode_utf16(units)
                    .collect::<Result<String, _>>()
                    .map_err(|e| self.error(e.to_string()))?
            }
            Self::Utf32Le | Self::Utf32Be => {
                let body = bytes.strip_prefix(self.preamble()).unwrap_or(bytes);
                if body.len() % 4 != 0 {
                    return Err(self.error("length is not a multiple of 4".to_string()));
                }
                body.chunks_exact(4)
                    .map(|quad| {
                        let quad = [quad[0], quad[1], quad[2], quad[3]];
                        let value = if self == Self::Utf32Le {
                            u32::from_le_bytes(quad)
                        } else {
                            u32::from_be_bytes(quad)
                        };
                        char::from_u32(value)
                            .ok_or_else(|| self.error(format!("invalid scalar value {:#x}", value)))
                    })
                    .collect::<Result<String, _>>()?
            }
        };

        Ok(match text.strip_prefix('\u{FEFF}') {
            Some(rest) => rest.to_string(),
            None => text,
        })
    }

    /// Encode `text` with this encoding's preamble
    pub fn encode(self, text: &str) -> Vec<u8> {
        let mut out = self.preamble().to_vec();
        match self {
            Self::Utf7 => out.extend_from_slice(encode_utf7(text).as_bytes()),
            Self::Utf8 | Self::Utf8Bom => out.extend_from_slice(text.as_bytes()),
            Self::Utf16Le => text
                .encode_utf16()
                .for_each(|unit| out.extend_from_slice(&unit.to_le_bytes())),
            Self::Utf16Be => text
                .encode_utf16()
                .for_each(|unit| out.extend_from_slice(&unit.to_be_bytes())),
            Self::Utf32Le => text
                .chars()
                .for_each(|ch| out.extend_from_slice(&(ch as u32).to_le_bytes())),
            Self::Utf32Be => text
                .chars()
                .for_each(|ch| out.extend_from_slice(&(ch as u32).to_be_bytes())),
        }
        out
    }

    fn error(self, message: String) -> IniError {
        IniError::Decode {
            encoding: self,
            message,
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-7" | "utf7" => Ok(Self::Utf7),
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "utf-8-bom" | "utf8-bom" => Ok(Self::Utf8Bom),
            "utf-16le" | "utf-16" | "utf16le" | "utf16" => Ok(Self::Utf16Le),
            "utf-16be" | "utf16be" => Ok(Self::Utf16Be),
            "utf-32le" | "utf-32" | "utf32le" | "utf32" => Ok(Self::Utf32Le),
            "utf-32be" | "utf32be" => Ok(Self::Utf32Be),
            other => Err(format!("unknown encoding: {}", other)),
        }
    }
}

// ============================================================================
// UTF-7 (RFC 2152)
// ============================================================================

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn base64_value(byte: u8) -> Option<u32> {
    match byte {
        b'A'..=b'Z' => Some((byte - b'A') as u32),
        b'a'..=b'z' => Some((byte - b'a') as u32 + 26),
        b'0'..=b'9' => Some((byte - b'0') as u32 + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Characters written as themselves (RFC 2152 sets D and O, minus `\` and `~`)
fn is_direct(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            '\'' | '(' | ')' | ',' | '-' | '.' | '/' | ':' | '?' | ' ' | '\t' | '\r' | '\n'
        )
        || matches!(
            ch,
            '!' | '"' | '#' | '$' | '%' | '&' | '*' | ';' | '<' | '=' | '>' | '@' | '[' | ']'
                | '^' | '_' | '`' | '{' | '|' | '}'
        )
}

fn decode_utf7(bytes: &[u8]) -> Result<String, String> {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if byte != b'+' {
            if !byte.is_ascii() {
                return Err(format!("non-ASCII byte {:#04x} at offset {}", byte, i));
            }
            out.push(byte as char);
            i += 1;
            continue;
        }

        i += 1;
        if bytes.get(i) == Some(&b'-') {
            out.push('+');
            i += 1;
            continue;
        }

        let mut units = Vec::new();
        let mut bits: u32 = 0;
        let mut bit_count = 0;
        while let Some(value) = bytes.get(i).copied().and_then(base64_value) {
            bits = (bits << 6) | value;
            bit_count += 6;
            if bit_count >= 16 {
                bit_count -= 16;
                units.push((bits >> bit_count) as u16);
                bits &= (1 << bit_count) - 1;
            }
            i += 1;
        }
        // The '-' terminator is absorbed; any other terminator is a literal.
        if bytes.get(i) == Some(&b'-') {
            i += 1;
        }

        for ch in char::decode_utf16(units) {
            out.push(ch.map_err(|e| e.to_string())?);
        }
    }

    Ok(out)
}

fn encode_utf7(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending: Vec<u16> = Vec::new();

    let flush = |pending: &mut Vec<u16>, out: &mut String| {
        if pending.is_empty() {
            return;
        }
        out.push('+');
        let mut bits: u32 = 0;
        let mut bit_count = 0;
        for unit in pending.drain(..) {
            bits = (bits << 16) | unit as u32;
            bit_count += 16;
            while bit_count >= 6 {
                bit_count -= 6;
                out.push(BASE64[((bits >> bit_count) & 0x3F) as usize] as char);
            }
            bits &= (1 << bit_count) - 1;
        }
        if bit_count > 0 {
            out.push(BASE64[((bits << (6 - bit_count)) & 0x3F) as usize] as char);
        }
        out.push('-');
    };

    for ch in text.chars() {
        if ch == '+' {
            flush(&mut pending, &mut out);
            out.push_str("+-");
        } else if is_direct(ch) {
            flush(&mut pending, &mut out);
            out.push(ch);
        } else {
            let mut buf = [0u16; 2];
            pending.extend_from_slice(ch.encode_utf16(&mut buf));
        }
    }
    flush(&mut pending, &mut out);

    out
}

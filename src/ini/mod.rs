//! INI documents that round-trip byte for byte
//!
//! The text buffer is authoritative. Sections, keys and values are read from
//! an index derived from it, and writes splice the buffer directly so that
//! untouched text (comments, blank lines, ordering, line breaks) survives.
//!
//! # Architecture
//!
//! ```text
//! IniDocument
//! ├── Rope (text, authoritative)
//! └── IndexCache
//!     └── Index (built lazily by the Tokenizer)
//!         └── SectionEntry -> KeyEntry (values + spans)
//! ```

mod document;
mod encoding;
mod error;
mod escape;
mod index;
mod io;
mod options;
mod tokenizer;

pub use document::{detect_line_break, IniDocument, DEFAULT_LINE_BREAK};
pub use encoding::{detect as detect_encoding, TextEncoding};
pub use error::IniError;
pub use escape::{escape, unescape};
pub use index::{CacheState, KeyEntry, SectionEntry, GLOBAL_SECTION};
pub use options::{Comparison, DocumentOptions};
pub use tokenizer::{tokenize, Span, Token, TokenKind, Tokenizer};

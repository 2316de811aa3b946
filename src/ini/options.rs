//! Construction-time policy for a document

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::encoding::TextEncoding;

/// How section and key names are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparison {
    /// Names must match exactly
    CaseSensitive,
    /// Names match regardless of letter case (the default)
    #[default]
    IgnoreCase,
}

impl Comparison {
    /// Fold a name into the form used as a lookup key
    pub fn fold<'a>(self, name: &'a str) -> Cow<'a, str> {
        match self {
            Self::CaseSensitive => Cow::Borrowed(name),
            Self::IgnoreCase if name.chars().any(char::is_uppercase) => {
                Cow::Owned(name.to_lowercase())
            }
            Self::IgnoreCase => Cow::Borrowed(name),
        }
    }

    /// Whether two names denote the same section or key under this policy
    pub fn matches(self, a: &str, b: &str) -> bool {
        a == b || (self == Self::IgnoreCase && self.fold(a) == self.fold(b))
    }
}

/// Options fixed when a document is created or loaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOptions {
    pub comparison: Comparison,
    /// Decode/encode backslash escapes in values
    pub allow_escapes: bool,
    /// Encoding used when the input carries no byte-order mark
    pub encoding: Option<TextEncoding>,
}

impl DocumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn with_escapes(mut self, allow_escapes: bool) -> Self {
        self.allow_escapes = allow_escapes;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }
}

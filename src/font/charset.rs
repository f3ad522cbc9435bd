//! Character sets as ordered sequences of user-perceived characters.

use std::fs;
use std::path::Path;

use log::{debug, info};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::FontgenError;

/// Printable ASCII, space through tilde.
pub const DEFAULT_CHARSET: &str = concat!(
    " !\"#$%&'()*+,-./0123456789:;<=>?@",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`",
    "abcdefghijklmnopqrstuvwxyz{|}~",
);

/// Splits `text` on extended grapheme cluster boundaries.
pub fn split_graphemes(text: &str) -> Vec<String> {
    text.graphemes(true).map(str::to_owned).collect()
}

/// Line terminators that end the first line of a charset file.
#[inline(always)]
const fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0B' | '\x0C' | '\x1C' | '\x1D' | '\x1E' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

#[inline(always)]
fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{FEFF}').unwrap_or(s)
}

/// Ordered glyph units. Index in this sequence is the glyph index in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSet {
    units: Vec<String>,
}

impl Default for CharacterSet {
    fn default() -> Self {
        Self::from_text(DEFAULT_CHARSET)
    }
}

impl CharacterSet {
    pub fn from_text(text: &str) -> Self {
        Self {
            units: split_graphemes(text),
        }
    }

    /// Uses the first line of `path` as the set. An empty file gives an empty set.
    pub fn from_file(path: &Path) -> Result<Self, FontgenError> {
        let text = fs::read_to_string(path).map_err(|source| FontgenError::CharsetRead {
            path: path.to_path_buf(),
            source,
        })?;
        let first = strip_bom(&text)
            .split(is_line_break)
            .next()
            .unwrap_or_default();
        let set = Self::from_text(first);
        info!(
            "Charset '{}' -> {} glyphs ({} codepoints).",
            path.display(),
            set.len(),
            first.chars().count()
        );
        if set.len() != first.chars().count() {
            debug!("Charset contains multi-codepoint clusters.");
        }
        Ok(set)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(String::as_str)
    }
}

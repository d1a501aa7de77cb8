//! Canonical linear form of tree content
//!
//! Backed by a rope so line/offset arithmetic stays O(log n) even for
//! large documents. Invariant: the text always ends with exactly one
//! line separator, giving empty documents and line counts a
//! well-defined representation.

use std::fmt;

use ropey::Rope;

/// Newline-terminated linear text
#[derive(Clone)]
pub struct CanonicalText {
    rope: Rope,
}

impl CanonicalText {
    /// Wrap projected text, appending the trailing separator if absent
    pub(crate) fn from_projection(mut raw: String) -> Self {
        if !raw.ends_with('\n') {
            raw.push('\n');
        }
        Self {
            rope: Rope::from_str(&raw),
        }
    }

    /// Total length in chars, including the trailing separator
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of content lines (= number of separators)
    pub fn line_count(&self) -> usize {
        self.rope.len_lines().saturating_sub(1)
    }

    /// Line index containing the (clamped) char offset
    pub fn char_to_line(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// Char offset of the start of a line (clamped to the last line)
    pub fn line_to_char(&self, line: usize) -> usize {
        let line = line.min(self.rope.len_lines().saturating_sub(1));
        self.rope.line_to_char(line)
    }

    /// Length of a line in chars, excluding its separator
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// Substring between two char offsets
    pub fn slice_string(&self, start: usize, end: usize) -> String {
        let len = self.rope.len_chars();
        let start = start.min(len);
        let end = end.clamp(start, len);
        self.rope.slice(start..end).to_string()
    }

    /// Whether this is the empty document (a lone separator)
    pub fn is_empty_document(&self) -> bool {
        self.rope.len_chars() == 1
    }

    pub fn as_rope(&self) -> &Rope {
        &self.rope
    }
}

impl From<&str> for CanonicalText {
    fn from(content: &str) -> Self {
        Self::from_projection(content.to_string())
    }
}

impl PartialEq for CanonicalText {
    fn eq(&self, other: &Self) -> bool {
        self.rope == other.rope
    }
}

impl Eq for CanonicalText {}

impl fmt::Display for CanonicalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rope)
    }
}

impl fmt::Debug for CanonicalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalText({:?})", self.rope.to_string())
    }
}

//! Source location tracking.
//!
//! Every token and AST node carries a [`SourceLocation`] naming the file it
//! came from and its 1-based line and column. Locations are immutable and
//! cheap to clone (the filename is shared behind an `Arc`).

use std::fmt;
use std::sync::Arc;

/// A position in a source file: `(filename, line, column)`, 1-based.
///
/// Two locations compare equal iff all three fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Source file name, shared across all locations of one compilation.
    pub file: Arc<str>,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl SourceLocation {
    /// Create a new location.
    pub fn new(file: Arc<str>, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }

    /// A location for synthesised constructs that have no source position.
    pub fn dummy() -> Self {
        Self {
            file: Arc::from(""),
            line: 0,
            column: 0,
        }
    }

    /// Whether this is a synthesised (dummy) location.
    pub fn is_dummy(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A precomputed index of line start offsets for byte-offset lookups.
///
/// The diagnostic emitter uses this to recover the byte range of a line when
/// rendering the offending source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets where each line starts; `line_starts[0] == 0`.
    line_starts: Vec<usize>,
    /// Total source length in bytes.
    len: usize,
}

impl LineIndex {
    /// Build a line index from source text. O(n) one-time cost.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Byte offset where the given 1-based line starts.
    pub fn line_start(&self, line: u32) -> Option<usize> {
        self.line_starts.get(line.saturating_sub(1) as usize).copied()
    }

    /// Byte range `[start, end)` covering the given 1-based line, without the
    /// trailing newline.
    pub fn line_range(&self, line: u32) -> Option<(usize, usize)> {
        let idx = line.saturating_sub(1) as usize;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        Some((start, end))
    }

    /// Byte offset of a 1-based line/column position.
    pub fn offset(&self, line: u32, column: u32) -> Option<usize> {
        let start = self.line_start(line)?;
        Some(start + column.saturating_sub(1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_equality_covers_all_fields() {
        let file: Arc<str> = Arc::from("a.tspp");
        let a = SourceLocation::new(file.clone(), 1, 2);
        let b = SourceLocation::new(file, 1, 2);
        let c = SourceLocation::new(Arc::from("b.tspp"), 1, 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, SourceLocation::new(Arc::from("a.tspp"), 1, 3));
    }

    #[test]
    fn line_index_ranges() {
        let idx = LineIndex::new("let x\nlet y\n");
        assert_eq!(idx.line_range(1), Some((0, 5)));
        assert_eq!(idx.line_range(2), Some((6, 11)));
        assert_eq!(idx.offset(2, 5), Some(10));
    }

    #[test]
    fn line_index_without_trailing_newline() {
        let idx = LineIndex::new("abc");
        assert_eq!(idx.line_range(1), Some((0, 3)));
        assert_eq!(idx.line_range(2), None);
    }
}

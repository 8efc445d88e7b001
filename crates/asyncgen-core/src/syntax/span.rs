//! Source location tracking.
//!
//! Every syntax node and token carries a `Span` of byte offsets into the
//! original text. Edits are always expressed in these original coordinates.

/// `[start, end)` in bytes of the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Line starts of a source text, for offset to line/column lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                source
                    .bytes()
                    .enumerate()
                    .filter(|&(_, b)| b == b'\n')
                    .map(|(i, _)| i as u32 + 1),
            )
            .collect();
        Self { line_starts }
    }

    /// Line containing `offset` (0-indexed).
    pub fn line(&self, offset: u32) -> u32 {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));
        line as u32
    }

    /// 0-based line and byte column of `offset`.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = self.line(offset);
        (line, offset - self.line_starts[line as usize])
    }

    /// Byte offset where `line` begins.
    pub fn line_start(&self, line: u32) -> u32 {
        self.line_starts
            .get(line as usize)
            .copied()
            .unwrap_or_else(|| self.line_starts[self.line_starts.len() - 1])
    }

    /// Whether two offsets sit on different lines.
    pub fn crosses_line(&self, a: u32, b: u32) -> bool {
        self.line(a) != self.line(b)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

//! Token stream and the token locator.
//!
//! Tree nodes never point at fixed syntactic particles such as `async`,
//! `static`, `*`, `=>` or `(`, so the rewrite rules look those up here.

use super::span::Span;

/// A lexical token. Its label is the source text it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub span: Span,
}

impl Token {
    /// Create a new token.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self {
            span: Span::new(start, end),
        }
    }

    #[inline]
    pub const fn start(&self) -> u32 {
        self.span.start
    }

    #[inline]
    pub const fn end(&self) -> u32 {
        self.span.end
    }
}

/// Tokens of one source text, sorted ascending by start offset.
#[derive(Debug, Clone)]
pub struct TokenStream<'s> {
    source: &'s str,
    tokens: Vec<Token>,
}

impl<'s> TokenStream<'s> {
    /// Build a stream. Tokens are sorted and de-duplicated by start offset.
    pub fn new(source: &'s str, mut tokens: Vec<Token>) -> Self {
        tokens.sort_by_key(Token::start);
        tokens.dedup_by_key(|t| t.start());
        Self { source, tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// The label (source text) of the token at `index`.
    pub fn text(&self, index: usize) -> &'s str {
        self.tokens.get(index).map_or("", |t| {
            self.source
                .get(t.start() as usize..t.end() as usize)
                .unwrap_or("")
        })
    }

    pub fn is(&self, index: usize, label: &str) -> bool {
        self.text(index) == label
    }

    /// Index of the token containing `offset`, see [`find_token_index`].
    pub fn locate(&self, offset: u32) -> Option<usize> {
        find_token_index(&self.tokens, offset)
    }

    /// Index of the first token starting at or after `offset`.
    pub fn first_at_or_after(&self, offset: u32) -> usize {
        self.tokens.partition_point(|t| t.start() < offset)
    }

    /// Scan forward from the first token at or after `from` for `label`.
    pub fn find_forward(&self, from: u32, label: &str) -> Option<usize> {
        (self.first_at_or_after(from)..self.tokens.len()).find(|&i| self.is(i, label))
    }

    /// Scan backward from the last token starting before `before` for `label`.
    pub fn find_backward(&self, before: u32, label: &str) -> Option<usize> {
        (0..self.first_at_or_after(before))
            .rev()
            .find(|&i| self.is(i, label))
    }
}

/// Binary search for the token whose `[start, end)` contains `offset`.
///
/// Returns `None` when the offset falls into a gap between tokens
/// (whitespace or comments); callers then walk to the neighbouring token
/// they actually want.
pub fn find_token_index(tokens: &[Token], offset: u32) -> Option<usize> {
    let mut min = 0usize;
    let mut max = tokens.len();

    while min < max {
        let ptr = min + (max - min) / 2;
        let span = tokens[ptr].span;
        if span.contains(offset) {
            return Some(ptr);
        }
        if span.end <= offset {
            min = ptr + 1;
        } else {
            max = ptr;
        }
    }
    None
}

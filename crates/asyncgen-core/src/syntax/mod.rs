//! Syntax layer: the parser contract, the node model, tokens and traversal.
//!
//! The transform never depends on a concrete parser. Anything implementing
//! [`SourceParser`] can feed it, as long as it produces the closed node model
//! in [`ast`], a sorted token stream and a line index.

pub mod ast;
pub mod span;
pub mod swc;
pub mod token;
pub mod walk;

pub use ast::{Child, Field, Node, NodeFlags, NodeKind};
pub use span::{LineIndex, Span};
pub use swc::SwcParser;
pub use token::{find_token_index, Token, TokenStream};
pub use walk::{walk, ParentSlot, Visit, Visitor};

use crate::config::TransformOptions;
use crate::error::TransformError;

/// Syntax switches handed to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub jsx: bool,
    pub typescript: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            jsx: true,
            typescript: false,
        }
    }
}

impl From<&TransformOptions> for ParseOptions {
    fn from(options: &TransformOptions) -> Self {
        Self {
            jsx: options.jsx,
            typescript: options.typescript,
        }
    }
}

/// Everything the transform needs from a parse.
#[derive(Debug, Clone)]
pub struct ParsedSource<'s> {
    /// Root node, kind `Program`.
    pub program: Node,
    pub tokens: TokenStream<'s>,
    pub lines: LineIndex,
}

/// A parser the transform can run on.
///
/// Implementations must be `Send + Sync` so one instance can serve parallel
/// transforms.
pub trait SourceParser: Send + Sync {
    /// Parser name, for logs.
    fn name(&self) -> &'static str;

    /// Parse `source` completely.
    ///
    /// # Errors
    ///
    /// Any syntax error, recoverable or not, is reported as
    /// [`TransformError::Syntax`]; no partial tree is returned.
    fn parse<'s>(&self, source: &'s str, options: &ParseOptions) -> Result<ParsedSource<'s>, TransformError>;
}

//! The transform: parse, walk with the rewrite rules, serialize.

mod for_await;
pub mod helpers;
pub mod rules;
pub mod scope;

use std::fmt;

use tracing::debug;

pub use helpers::HelperUsage;
pub use rules::AsyncRewriter;
pub use scope::{ScopeRecord, ScopeStack};

use crate::config::TransformOptions;
use crate::edit::{EditBuffer, Mapping, SourceMapBuilder};
use crate::error::TransformError;
use crate::syntax::{walk, LineIndex, ParseOptions, SourceParser, SwcParser, TokenStream};

/// Keyword whose absence lets a source pass through unparsed.
const CANDIDATE_KEYWORD: &str = "async";

/// State threaded through one walk.
#[derive(Debug)]
pub struct TransformContext<'s> {
    pub source: &'s str,
    pub tokens: TokenStream<'s>,
    pub lines: LineIndex,
    pub edits: EditBuffer<'s>,
    pub scopes: ScopeStack,
    pub usage: HelperUsage,
    /// Register node boundaries for the source map.
    pub source_map: bool,
    /// Number of functions rewritten so far.
    pub rewritten: usize,
    temps: u32,
}

impl<'s> TransformContext<'s> {
    pub fn new(source: &'s str, tokens: TokenStream<'s>, lines: LineIndex, source_map: bool) -> Self {
        Self {
            source,
            tokens,
            lines,
            edits: EditBuffer::new(source),
            scopes: ScopeStack::new(),
            usage: HelperUsage::default(),
            source_map,
            rewritten: 0,
            temps: 0,
        }
    }

    /// Suffix for a fresh set of temporaries.
    pub fn next_temp(&mut self) -> u32 {
        let n = self.temps;
        self.temps += 1;
        n
    }
}

/// Result of a transform.
#[derive(Debug, Clone)]
pub struct EditedText {
    code: String,
    /// Kept only in source-map mode.
    original: Option<String>,
    mappings: Vec<Mapping>,
    edited: bool,
    usage: HelperUsage,
}

impl EditedText {
    fn unchanged(source: &str, options: &TransformOptions) -> Self {
        Self {
            code: source.to_string(),
            original: options.source_map.then(|| source.to_string()),
            mappings: Vec::new(),
            edited: false,
            usage: HelperUsage::default(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn into_code(self) -> String {
        self.code
    }

    /// Whether any rewrite happened.
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// Whether a plain async function or async arrow was rewritten.
    pub fn contains_async(&self) -> bool {
        self.usage.async_fn
    }

    pub fn contains_async_generator(&self) -> bool {
        self.usage.async_generator
    }

    pub fn contains_for_await(&self) -> bool {
        self.usage.for_await
    }

    pub fn usage(&self) -> HelperUsage {
        self.usage
    }

    /// Source Map v3 JSON for the output, or `None` unless the transform ran
    /// with `source_map` enabled.
    pub fn generate_map(&self, file: &str) -> Option<String> {
        let original = self.original.as_deref()?;
        let mut builder = SourceMapBuilder::new(file, original);
        builder.extend(&self.mappings);
        Some(builder.generate(file))
    }
}

impl fmt::Display for EditedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Transform `source` with the swc parser.
pub fn transform(source: &str, options: &TransformOptions) -> Result<EditedText, TransformError> {
    transform_with(&SwcParser::new(), source, options)
}

/// Transform `source` with any parser.
pub fn transform_with<P>(parser: &P, source: &str, options: &TransformOptions) -> Result<EditedText, TransformError>
where
    P: SourceParser + ?Sized,
{
    if options.fast_skip && !source.contains(CANDIDATE_KEYWORD) {
        debug!(bytes = source.len(), "no async keyword, passing through");
        return Ok(EditedText::unchanged(source, options));
    }

    let parsed = parser.parse(source, &ParseOptions::from(options))?;
    debug!(
        parser = parser.name(),
        tokens = parsed.tokens.len(),
        lines = parsed.lines.line_count(),
        "parsed"
    );

    let mut ctx = TransformContext::new(source, parsed.tokens, parsed.lines, options.source_map);
    walk(&parsed.program, &mut ctx, &mut AsyncRewriter)?;

    let edited = ctx.edits.is_edited();
    if edited && options.include_helper {
        ctx.edits.append(&helpers::render(ctx.usage));
    }
    let output = ctx.edits.serialize();
    debug!(
        rewritten = ctx.rewritten,
        edited,
        for_await = ctx.usage.for_await,
        "transformed"
    );

    Ok(EditedText {
        code: output.code,
        original: options.source_map.then(|| source.to_string()),
        mappings: output.mappings,
        edited,
        usage: ctx.usage,
    })
}

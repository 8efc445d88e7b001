//! Editable view of the original source text.
//!
//! The text is cut into chunks on demand. Each chunk covers an original range
//! and can have its content replaced, text attached before it (`intro`) and
//! text attached after it (`outro`). All offsets refer to the original text;
//! earlier edits never renumber later ones.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
struct Chunk {
    end: u32,
    /// Replacement content. `None` keeps the original text.
    content: Option<String>,
    intro: String,
    outro: String,
}

#[derive(Debug, Clone, Copy)]
struct Move {
    start: u32,
    end: u32,
    dest: u32,
}

/// A position in the generated output paired with the original offset it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub generated_line: u32,
    /// Column in UTF-16 code units.
    pub generated_column: u32,
    pub original: u32,
}

/// Output of [`EditBuffer::serialize`].
#[derive(Debug, Clone, Default)]
pub struct Serialized {
    pub code: String,
    pub mappings: Vec<Mapping>,
}

/// Accumulates range edits against one source text.
///
/// Overlapping overwrites are a bug in the caller and panic at issue time.
#[derive(Debug, Clone)]
pub struct EditBuffer<'s> {
    original: &'s str,
    chunks: BTreeMap<u32, Chunk>,
    intro: String,
    outro: String,
    moves: Vec<Move>,
    mapped: BTreeSet<u32>,
    edited: bool,
}

impl<'s> EditBuffer<'s> {
    pub fn new(original: &'s str) -> Self {
        let mut chunks = BTreeMap::new();
        if !original.is_empty() {
            chunks.insert(
                0,
                Chunk {
                    end: original.len() as u32,
                    ..Chunk::default()
                },
            );
        }
        Self {
            original,
            chunks,
            intro: String::new(),
            outro: String::new(),
            moves: Vec::new(),
            mapped: BTreeSet::new(),
            edited: false,
        }
    }

    pub fn original(&self) -> &'s str {
        self.original
    }

    /// Whether any edit has been issued.
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    fn len(&self) -> u32 {
        self.original.len() as u32
    }

    /// Make `offset` a chunk boundary.
    fn split(&mut self, offset: u32) {
        assert!(
            offset <= self.len(),
            "edit offset {offset} past end of source ({})",
            self.len()
        );
        if offset == 0 || offset == self.len() || self.chunks.contains_key(&offset) {
            return;
        }
        let Some((_, chunk)) = self.chunks.range_mut(..offset).next_back() else {
            return;
        };
        assert!(
            chunk.content.is_none(),
            "cannot split an already edited span at offset {offset}"
        );
        let tail = Chunk {
            end: chunk.end,
            content: None,
            intro: String::new(),
            outro: std::mem::take(&mut chunk.outro),
        };
        chunk.end = offset;
        self.chunks.insert(offset, tail);
    }

    /// Replace `[start, end)` with `text`. Text attached at either boundary is kept.
    pub fn overwrite(&mut self, start: u32, end: u32, text: &str) {
        assert!(start < end, "empty overwrite range {start}..{end}");
        self.split(start);
        self.split(end);
        let mut first = true;
        for (&chunk_start, chunk) in self.chunks.range_mut(start..end) {
            assert!(
                chunk.content.is_none(),
                "overlapping edit at {chunk_start}..{} (requested {start}..{end})",
                chunk.end
            );
            chunk.content = Some(if first { text.to_string() } else { String::new() });
            first = false;
        }
        self.edited = true;
    }

    pub fn remove(&mut self, start: u32, end: u32) {
        self.overwrite(start, end, "");
    }

    /// Insert `text` before `offset`, attached to the text that ends there.
    ///
    /// Repeated calls at one offset appear in call order.
    pub fn insert_before(&mut self, offset: u32, text: &str) {
        self.split(offset);
        self.edited = true;
        if offset == 0 {
            self.intro.push_str(text);
        } else if let Some((_, chunk)) = self.chunks.range_mut(..offset).next_back() {
            chunk.outro.push_str(text);
        }
    }

    /// Insert `text` after `offset`, attached to the text that starts there.
    ///
    /// Repeated calls at one offset appear in reverse call order, and all of
    /// them appear after any [`insert_before`](Self::insert_before) text at
    /// the same offset.
    pub fn insert_after(&mut self, offset: u32, text: &str) {
        self.split(offset);
        self.edited = true;
        match self.chunks.get_mut(&offset) {
            Some(chunk) => chunk.intro.insert_str(0, text),
            None => self.outro.insert_str(0, text),
        }
    }

    /// Relocate `[start, end)` to `dest`, leaving a gap at the origin.
    ///
    /// Text inserted after `start` and before `end` travels with the range.
    /// At the destination the range lands after text inserted before `dest`
    /// and before text inserted after it.
    pub fn move_range(&mut self, start: u32, end: u32, dest: u32) {
        assert!(start < end, "empty move range {start}..{end}");
        assert!(
            dest <= start || dest >= end,
            "move destination {dest} inside moved range {start}..{end}"
        );
        assert!(
            self.moves.iter().all(|m| end <= m.start || start >= m.end),
            "overlapping move of {start}..{end}"
        );
        self.split(start);
        self.split(end);
        self.split(dest);
        self.moves.push(Move { start, end, dest });
        self.edited = true;
    }

    /// Append `text` after everything else.
    pub fn append(&mut self, text: &str) {
        self.outro.push_str(text);
        self.edited = true;
    }

    /// Register an original offset that should receive a source-map entry.
    pub fn add_mapping(&mut self, offset: u32) {
        if offset <= self.len() {
            self.mapped.insert(offset);
        }
    }

    fn is_moved(&self, offset: u32) -> bool {
        self.moves.iter().any(|m| offset >= m.start && offset < m.end)
    }

    /// Produce the edited text and the positions of mapped offsets in it.
    pub fn serialize(&self) -> Serialized {
        let mut out = Output::default();
        out.push(&self.intro);

        for (&start, chunk) in &self.chunks {
            self.emit_moves_to(start, &mut out);
            if !self.is_moved(start) {
                self.emit_chunk(start, chunk, &mut out);
            }
        }
        self.emit_moves_to(self.len(), &mut out);

        out.push(&self.outro);
        Serialized {
            code: out.code,
            mappings: out.mappings,
        }
    }

    fn emit_moves_to(&self, dest: u32, out: &mut Output) {
        for m in self.moves.iter().filter(|m| m.dest == dest) {
            for (&start, chunk) in self.chunks.range(m.start..m.end) {
                self.emit_chunk(start, chunk, out);
            }
        }
    }

    fn emit_chunk(&self, start: u32, chunk: &Chunk, out: &mut Output) {
        out.push(&chunk.intro);
        match &chunk.content {
            Some(text) => out.push(text),
            None => {
                let mut cursor = start;
                for &offset in self.mapped.range(start..chunk.end) {
                    out.push(self.slice(cursor, offset));
                    out.mark(offset);
                    cursor = offset;
                }
                out.push(self.slice(cursor, chunk.end));
            }
        }
        out.push(&chunk.outro);
    }

    fn slice(&self, start: u32, end: u32) -> &'s str {
        self.original
            .get(start as usize..end as usize)
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct Output {
    code: String,
    line: u32,
    column: u32,
    mappings: Vec<Mapping>,
}

impl Output {
    fn push(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += c.len_utf16() as u32;
            }
        }
        self.code.push_str(text);
    }

    fn mark(&mut self, original: u32) {
        self.mappings.push(Mapping {
            generated_line: self.line,
            generated_column: self.column,
            original,
        });
    }
}

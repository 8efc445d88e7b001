//! Source Map v3 writer.

use serde::Serialize;

use super::buffer::Mapping;
use crate::syntax::span::LineIndex;

/// VLQ-encode a signed integer and append to output string.
fn vlq_encode(value: i64, out: &mut String) {
    const B64: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    #[allow(clippy::cast_sign_loss)]
    let mut v = (if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    }) as u64;
    loop {
        let mut digit = (v & 0x1f) as u8;
        v >>= 5;
        if v > 0 {
            digit |= 0x20; // continuation bit
        }
        out.push(B64[digit as usize] as char);
        if v == 0 {
            break;
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceMapJson<'a> {
    version: u8,
    file: &'a str,
    sources: Vec<&'a str>,
    sources_content: Vec<&'a str>,
    names: Vec<&'a str>,
    mappings: String,
}

/// Builds a single-source map from buffer mappings.
#[derive(Debug)]
pub struct SourceMapBuilder<'s> {
    source_name: String,
    source: &'s str,
    lines: LineIndex,
    /// Segments: (generated_line, generated_col, source_line, source_col).
    segments: Vec<(u32, u32, u32, u32)>,
}

impl<'s> SourceMapBuilder<'s> {
    pub fn new(source_name: impl Into<String>, source: &'s str) -> Self {
        Self {
            source_name: source_name.into(),
            source,
            lines: LineIndex::new(source),
            segments: Vec::new(),
        }
    }

    /// Original line and UTF-16 column of a byte offset.
    fn original_position(&self, offset: u32) -> (u32, u32) {
        let line = self.lines.line(offset);
        let line_start = self.lines.line_start(line);
        let column = self
            .source
            .get(line_start as usize..offset as usize)
            .map_or(offset - line_start, |prefix| prefix.encode_utf16().count() as u32);
        (line, column)
    }

    pub fn add(&mut self, mapping: Mapping) {
        let (line, column) = self.original_position(mapping.original);
        self.segments
            .push((mapping.generated_line, mapping.generated_column, line, column));
    }

    pub fn extend(&mut self, mappings: &[Mapping]) {
        for &mapping in mappings {
            self.add(mapping);
        }
    }

    /// Encode the `mappings` field.
    fn encode(&self) -> String {
        let mut segments = self.segments.clone();
        segments.sort_unstable();
        segments.dedup_by_key(|s| (s.0, s.1));

        let mut out = String::new();
        let mut line = 0u32;
        let mut prev_column: i64 = 0;
        let mut prev_source_line: i64 = 0;
        let mut prev_source_column: i64 = 0;
        let mut first_on_line = true;

        for (gen_line, gen_column, source_line, source_column) in segments {
            while line < gen_line {
                out.push(';');
                line += 1;
                prev_column = 0;
                first_on_line = true;
            }
            if !first_on_line {
                out.push(',');
            }
            first_on_line = false;

            vlq_encode(i64::from(gen_column) - prev_column, &mut out);
            vlq_encode(0, &mut out);
            vlq_encode(i64::from(source_line) - prev_source_line, &mut out);
            vlq_encode(i64::from(source_column) - prev_source_column, &mut out);

            prev_column = i64::from(gen_column);
            prev_source_line = i64::from(source_line);
            prev_source_column = i64::from(source_column);
        }
        out
    }

    /// Generate the v3 JSON document.
    pub fn generate(&self, file: &str) -> String {
        let json = SourceMapJson {
            version: 3,
            file,
            sources: vec![self.source_name.as_str()],
            sources_content: vec![self.source],
            names: Vec::new(),
            mappings: self.encode(),
        };
        serde_json::to_string(&json).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vlq(value: i64) -> String {
        let mut out = String::new();
        vlq_encode(value, &mut out);
        out
    }

    #[test]
    fn test_vlq_encode() {
        assert_eq!(vlq(0), "A");
        assert_eq!(vlq(1), "C");
        assert_eq!(vlq(-1), "D");
        assert_eq!(vlq(15), "e");
        assert_eq!(vlq(16), "gB");
        assert_eq!(vlq(-17), "jB");
    }

    #[test]
    fn test_mappings_field() {
        let mut builder = SourceMapBuilder::new("in.js", "ab\ncd");
        builder.extend(&[
            Mapping {
                generated_line: 0,
                generated_column: 0,
                original: 0,
            },
            Mapping {
                generated_line: 0,
                generated_column: 5,
                original: 1,
            },
            Mapping {
                generated_line: 2,
                generated_column: 1,
                original: 4,
            },
        ]);
        assert_eq!(builder.encode(), "AAAA,KAAC;;CACA");
    }

    #[test]
    fn test_generate_json() {
        let mut builder = SourceMapBuilder::new("in.js", "x\u{e9}y");
        builder.add(Mapping {
            generated_line: 0,
            generated_column: 0,
            original: 3,
        });
        let map: serde_json::Value = serde_json::from_str(&builder.generate("out.js")).unwrap();
        assert_eq!(map["version"], 3);
        assert_eq!(map["file"], "out.js");
        assert_eq!(map["sources"][0], "in.js");
        assert_eq!(map["sourcesContent"][0], "x\u{e9}y");
        assert!(map["names"].as_array().unwrap().is_empty());
        // `é` is two bytes but one UTF-16 unit, so `y` sits at column 2.
        assert_eq!(map["mappings"], "AAAE");
    }
}

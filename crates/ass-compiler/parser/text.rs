//! Dialogue text segmentation

use crate::parser::ast::{ParsedSegment, ParsedText};
use crate::parser::tags::{parse_tags, NumericTag, ParsedTag};
use crate::tokenizer::{split_override_blocks, tokenize_drawing};

/// Split a dialogue `Text` field into tagged segments
///
/// Text before the first override block becomes an untagged segment when it
/// is non-empty. Every block then opens a segment holding its tags and the
/// text up to the next block. When the block's last `\p` is positive the text
/// is tokenized as a drawing instead.
///
/// # Example
///
/// ```rust
/// use ass_compiler::parser::parse_text;
///
/// let text = parse_text("Hello {\\b1}World");
/// assert_eq!(text.combined, "Hello World");
/// assert_eq!(text.segments.len(), 2);
/// assert!(text.segments[0].tags.is_empty());
/// ```
#[must_use]
pub fn parse_text(text: &str) -> ParsedText {
    let split = split_override_blocks(text);
    let mut segments = Vec::with_capacity(split.blocks.len() + 1);

    if !split.leading.is_empty() {
        segments.push(ParsedSegment {
            text: split.leading.to_string(),
            ..ParsedSegment::default()
        });
    }

    for (block, following) in split.blocks {
        let tags = parse_tags(block);
        if drawing_mode(&tags) {
            segments.push(ParsedSegment {
                tags,
                text: String::new(),
                drawing: tokenize_drawing(following),
            });
        } else {
            segments.push(ParsedSegment {
                tags,
                text: following.to_string(),
                drawing: Vec::new(),
            });
        }
    }

    let combined = segments.iter().map(|s| s.text.as_str()).collect();

    ParsedText {
        raw: text.to_string(),
        combined,
        segments,
    }
}

/// Whether the last `\p` in the block switches drawing mode on
fn drawing_mode(tags: &[ParsedTag]) -> bool {
    tags.iter()
        .rev()
        .find_map(|tag| match tag {
            ParsedTag::Numeric(NumericTag::P, scale) => Some(*scale > 0.0),
            _ => None,
        })
        .unwrap_or(false)
}

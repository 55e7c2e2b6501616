//! Override block and tag token splitting
//!
//! `{...}` blocks never nest: the innermost `{` before a `}` opens the block
//! and any earlier unmatched `{` stays literal text. Inside a block, tags are
//! separated by backslashes, except inside parentheses where `\t(...)` and
//! `\clip(...)` carry their own nested backslashes and commas.

/// Dialogue text split around its override blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideSplit<'a> {
    /// Text before the first block
    pub leading: &'a str,
    /// Each block's contents (without braces) and the text following it
    pub blocks: Vec<(&'a str, &'a str)>,
}

/// Split dialogue text into leading text and `(block, following text)` pairs
#[must_use]
pub fn split_override_blocks(text: &str) -> OverrideSplit<'_> {
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut search = 0;

    while let Some(open_rel) = text[search..].find('{') {
        let open = search + open_rel;
        let body_start = open + 1;
        match text[body_start..].find(['{', '}']) {
            Some(rel) if text[body_start + rel..].starts_with('}') => {
                let close = body_start + rel;
                pieces.push(&text[text_start..open]);
                pieces.push(&text[body_start..close]);
                text_start = close + 1;
                search = text_start;
            }
            // A later `{` opens the candidate block instead
            Some(rel) => search = body_start + rel,
            None => break,
        }
    }
    pieces.push(&text[text_start..]);

    let leading = pieces[0];
    let blocks = pieces[1..]
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();

    OverrideSplit { leading, blocks }
}

/// Split an override block into raw tag tokens
///
/// Backslashes only separate tokens at parenthesis depth zero. The depth
/// never drops below zero, so a stray `)` does not swallow later tags.
/// Text before the first backslash is returned as a token too; it matches
/// no tag and is dropped by the grammar parser.
#[must_use]
pub fn split_tags(block: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut token_start = 0;

    for (index, ch) in block.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '\\' if depth == 0 => {
                if index > token_start {
                    tokens.push(&block[token_start..index]);
                }
                token_start = index + 1;
            }
            _ => {}
        }
    }

    if block.len() > token_start {
        tokens.push(&block[token_start..]);
    }

    tokens
}

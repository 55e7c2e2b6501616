//! Override tag grammar
//!
//! Maps one raw tag token (the text between two top-level backslashes of an
//! override block) to a [`ParsedTag`]. Dispatch order is significant: the
//! numeric tags are tried first, in the order of [`NumericTag::ALL`], so that
//! for example `fsp2` is letter spacing rather than a font size and `an5` is
//! never read as the legacy `a` tag.
//!
//! Tokens that match no rule produce `None`; they are dropped silently by the
//! compiler.
//!
//! # Example
//!
//! ```rust
//! use ass_compiler::parser::tags::{parse_tag, NumericTag, ParsedTag};
//!
//! assert_eq!(parse_tag("b1"), Some(ParsedTag::Numeric(NumericTag::B, 1.0)));
//! assert_eq!(parse_tag("pos(10,20)"), Some(ParsedTag::Pos(vec![10.0, 20.0])));
//! assert_eq!(parse_tag("nonsense"), None);
//! ```

use crate::tokenizer::{split_tags, tokenize_drawing, RawDrawingCommand};
use crate::utils::coerce_number;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tags whose payload is a single number
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericTag {
    B,
    I,
    U,
    S,
    Fsp,
    /// `\k`, karaoke duration in centiseconds
    K,
    /// `\K`, sweeping karaoke
    KUpper,
    Kf,
    Ko,
    Kt,
    Fe,
    Q,
    P,
    Pbo,
    /// Legacy SSA alignment
    A,
    An,
    Fscx,
    Fscy,
    Fax,
    Fay,
    Frx,
    Fry,
    Frz,
    /// Legacy rotation, same as `frz`
    Fr,
    Be,
    Blur,
    Bord,
    Xbord,
    Ybord,
    Shad,
    Xshad,
    Yshad,
}

impl NumericTag {
    /// Every numeric tag in matching priority order
    pub const ALL: [Self; 32] = [
        Self::B,
        Self::I,
        Self::U,
        Self::S,
        Self::Fsp,
        Self::K,
        Self::KUpper,
        Self::Kf,
        Self::Ko,
        Self::Kt,
        Self::Fe,
        Self::Q,
        Self::P,
        Self::Pbo,
        Self::A,
        Self::An,
        Self::Fscx,
        Self::Fscy,
        Self::Fax,
        Self::Fay,
        Self::Frx,
        Self::Fry,
        Self::Frz,
        Self::Fr,
        Self::Be,
        Self::Blur,
        Self::Bord,
        Self::Xbord,
        Self::Ybord,
        Self::Shad,
        Self::Xshad,
        Self::Yshad,
    ];

    /// Tag name as written after the backslash
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::B => "b",
            Self::I => "i",
            Self::U => "u",
            Self::S => "s",
            Self::Fsp => "fsp",
            Self::K => "k",
            Self::KUpper => "K",
            Self::Kf => "kf",
            Self::Ko => "ko",
            Self::Kt => "kt",
            Self::Fe => "fe",
            Self::Q => "q",
            Self::P => "p",
            Self::Pbo => "pbo",
            Self::A => "a",
            Self::An => "an",
            Self::Fscx => "fscx",
            Self::Fscy => "fscy",
            Self::Fax => "fax",
            Self::Fay => "fay",
            Self::Frx => "frx",
            Self::Fry => "fry",
            Self::Frz => "frz",
            Self::Fr => "fr",
            Self::Be => "be",
            Self::Blur => "blur",
            Self::Bord => "bord",
            Self::Xbord => "xbord",
            Self::Ybord => "ybord",
            Self::Shad => "shad",
            Self::Xshad => "xshad",
            Self::Yshad => "yshad",
        }
    }

    /// Match `^<name>-?<digit>` and return the remaining value text
    fn strip_from(self, token: &str) -> Option<&str> {
        let rest = token.strip_prefix(self.name())?;
        let digits = rest.strip_prefix('-').unwrap_or(rest);
        digits
            .bytes()
            .next()
            .filter(u8::is_ascii_digit)
            .map(|_| rest)
    }
}

/// Clip region arguments
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum ClipArgs {
    /// `\clip(drawing)` or `\clip(scale, drawing)`
    Drawing(Vec<RawDrawingCommand>),
    /// `\clip(x1, y1, x2, y2)`
    Rect([f64; 4]),
}

/// Parsed `\clip` / `\iclip`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSpec {
    /// `\iclip` masks the inside instead of the outside
    pub inverse: bool,
    /// Drawing scale, 1 unless given explicitly
    pub scale: f64,
    pub args: ClipArgs,
}

/// Parsed `\t(...)` animation group
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSpec {
    /// Start offset in milliseconds
    pub t1: f64,
    /// End offset in milliseconds, 0 means the end of the event
    pub t2: f64,
    /// Acceleration exponent
    pub accel: f64,
    /// Tags to animate towards
    pub tags: Vec<ParsedTag>,
}

/// One override tag with a lightly typed payload
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedTag {
    /// Any tag from [`NumericTag`], value may be `NaN` for garbage input
    Numeric(NumericTag, f64),
    /// `\fn`
    FontName(String),
    /// `\r`, empty for a reset to the line's own style
    Reset(String),
    /// `\fs`, kept as text so a leading sign can be detected
    FontSize(String),
    /// `\c`, `\1c`..`\4c`; `None` when the color was left empty
    Color { slot: u8, value: Option<String> },
    /// `\1a`..`\4a`
    Alpha { slot: u8, value: String },
    /// `\alpha`, all four slots
    AllAlpha(String),
    Pos(Vec<f64>),
    Org(Vec<f64>),
    Move(Vec<f64>),
    /// `\fad` and `\fade`
    Fade(Vec<f64>),
    Clip(ClipSpec),
    Transition(TransitionSpec),
}

/// Parse every tag of an override block, dropping unrecognized tokens
#[must_use]
pub fn parse_tags(block: &str) -> Vec<ParsedTag> {
    split_tags(block).into_iter().filter_map(parse_tag).collect()
}

/// Parse a single raw tag token
#[must_use]
pub fn parse_tag(token: &str) -> Option<ParsedTag> {
    for tag in NumericTag::ALL {
        if let Some(value) = tag.strip_from(token) {
            return Some(ParsedTag::Numeric(tag, coerce_number(value)));
        }
    }

    if let Some(name) = token.strip_prefix("fn") {
        return Some(ParsedTag::FontName(name.to_string()));
    }
    if let Some(name) = token.strip_prefix('r') {
        return Some(ParsedTag::Reset(name.to_string()));
    }
    if let Some(size) = token.strip_prefix("fs") {
        if size.starts_with(|c: char| c.is_ascii_digit() || c == '+' || c == '-') {
            return Some(ParsedTag::FontSize(size.to_string()));
        }
    }
    if let Some(tag) = parse_color(token) {
        return Some(tag);
    }
    if let Some(tag) = parse_slot_alpha(token) {
        return Some(tag);
    }
    if let Some(tag) = parse_all_alpha(token) {
        return Some(tag);
    }
    if let Some(tag) = parse_call(token) {
        return Some(tag);
    }
    if token.starts_with("clip") || token.starts_with("iclip") {
        return parse_clip(token);
    }
    if let Some(inner) = token.strip_prefix("t(") {
        return parse_transition(call_body(inner));
    }

    tracing::trace!(token, "unrecognized override tag");
    None
}

/// Contents of `name(...)` with an optional closing parenthesis removed
fn call_body(after_open: &str) -> &str {
    after_open.strip_suffix(')').unwrap_or(after_open)
}

/// Split call arguments on commas, trimming each one
fn split_args(body: &str) -> Vec<&str> {
    body.trim().split(',').map(str::trim).collect()
}

fn numeric_args(body: &str) -> Vec<f64> {
    split_args(body).into_iter().map(coerce_number).collect()
}

/// `&H` / `H` / `&` prefixes are all optional in override colors
fn strip_hex_prefix(text: &str) -> &str {
    let text = text.strip_prefix('&').unwrap_or(text);
    text.strip_prefix(['H', 'h']).unwrap_or(text)
}

fn leading_slot(token: &str) -> (Option<u8>, &str) {
    match token.as_bytes().first() {
        Some(digit) if digit.is_ascii_digit() => (Some(digit - b'0'), &token[1..]),
        _ => (None, token),
    }
}

fn parse_color(token: &str) -> Option<ParsedTag> {
    let (slot, rest) = leading_slot(token);
    let rest = rest.strip_prefix('c')?;
    let hex = strip_hex_prefix(rest);

    let digits_len = hex.bytes().take_while(u8::is_ascii_hexdigit).count();
    if digits_len == 0 && !rest.is_empty() {
        return None;
    }

    let digits = &hex[..digits_len];
    let value = (!digits.is_empty()).then(|| {
        let tail = &digits[digits.len().saturating_sub(6)..];
        format!("{:0>6}", tail.to_ascii_uppercase())
    });

    Some(ParsedTag::Color {
        slot: slot.unwrap_or(1),
        value,
    })
}

fn parse_slot_alpha(token: &str) -> Option<ParsedTag> {
    let (slot, rest) = leading_slot(token);
    let slot = slot?;
    let hex = strip_hex_prefix(rest.strip_prefix('a')?);

    let digits_len = hex.bytes().take_while(u8::is_ascii_hexdigit).count();
    if digits_len == 0 {
        return None;
    }
    let value = &hex[..digits_len.min(2)];

    Some(ParsedTag::Alpha {
        slot,
        value: format!("{:0>2}", value.to_ascii_uppercase()),
    })
}

fn parse_all_alpha(token: &str) -> Option<ParsedTag> {
    let hex = strip_hex_prefix(token.strip_prefix("alpha")?);

    let digits_len = hex.bytes().take_while(u8::is_ascii_hexdigit).count();
    if digits_len == 0 {
        return None;
    }
    let digits = &hex[..digits_len];
    let tail = &digits[digits.len().saturating_sub(2)..];

    Some(ParsedTag::AllAlpha(format!("{:0>2}", tail.to_ascii_uppercase())))
}

fn parse_call(token: &str) -> Option<ParsedTag> {
    let (name, after_open) = token.split_once('(')?;
    let args = || numeric_args(call_body(after_open));

    match name {
        "pos" => Some(ParsedTag::Pos(args())),
        "org" => Some(ParsedTag::Org(args())),
        "move" => Some(ParsedTag::Move(args())),
        "fad" | "fade" => Some(ParsedTag::Fade(args())),
        _ => None,
    }
}

fn parse_clip(token: &str) -> Option<ParsedTag> {
    let (inverse, rest) = match token.strip_prefix("iclip") {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix("clip")?),
    };

    let Some(after_open) = rest.strip_prefix('(') else {
        tracing::debug!(token, "clip without arguments dropped");
        return None;
    };

    let args = split_args(call_body(after_open));
    let (scale, args) = match args.as_slice() {
        [drawing] => (1.0, ClipArgs::Drawing(tokenize_drawing(drawing))),
        [scale, drawing] => (coerce_number(scale), ClipArgs::Drawing(tokenize_drawing(drawing))),
        [x1, y1, x2, y2] => (
            1.0,
            ClipArgs::Rect([
                coerce_number(x1),
                coerce_number(y1),
                coerce_number(x2),
                coerce_number(y2),
            ]),
        ),
        _ => {
            tracing::debug!(token, count = args.len(), "clip with invalid argument count dropped");
            return None;
        }
    };

    Some(ParsedTag::Clip(ClipSpec {
        inverse,
        scale,
        args,
    }))
}

fn parse_transition(body: &str) -> Option<ParsedTag> {
    let body = body.trim();

    // Commas inside the nested tags belong to them, not to `\t`
    let (timing, tags) = body.find('\\').map_or((body, ""), |index| body.split_at(index));
    let args = split_args(timing);

    let first_is_empty = args[0].is_empty() && (args.len() > 1 || tags.is_empty());
    if first_is_empty {
        tracing::trace!(body, "empty transition dropped");
        return None;
    }

    let mut spec = TransitionSpec {
        t1: 0.0,
        t2: 0.0,
        accel: 1.0,
        tags: parse_tags(tags),
    };

    match args.as_slice() {
        [accel, _] => spec.accel = coerce_number(accel),
        [t1, t2, _] => {
            spec.t1 = coerce_number(t1);
            spec.t2 = coerce_number(t2);
        }
        [t1, t2, accel, _] => {
            spec.t1 = coerce_number(t1);
            spec.t2 = coerce_number(t2);
            spec.accel = coerce_number(accel);
        }
        _ => {}
    }

    Some(ParsedTag::Transition(spec))
}

//! Tag semantic compiler
//!
//! Resolves a [`ParsedTag`] against the ambient state of the fragment being
//! compiled. The result is a [`TagDelta`]: either fragment-level tag
//! assignments, an animation group, or one of the event-level settings
//! (position, movement, fade, clip, alignment, style reset).
//!
//! Resolution rules:
//!
//! - `\bord`/`\shad` expand to their x and y axes and clamp negatives to 0
//! - an empty color falls back to the ambient color of the same slot
//! - `\alpha` sets all four alpha slots
//! - `\fr` is `\frz`
//! - a signed `\fs` below 10 in magnitude scales the ambient size by tenths
//! - `\t` keeps only animatable tags, its end defaults to the event duration
//!
//! # Example
//!
//! ```rust
//! use ass_compiler::compiler::tags::{compile_tag, TagDelta, TagKey, TagPresets};
//! use ass_compiler::parser::parse_tag;
//!
//! let presets = TagPresets {
//!     fs: 20.0,
//!     ..TagPresets::default()
//! };
//! let tag = parse_tag("fs-5").unwrap();
//! match compile_tag(&tag, &presets) {
//!     Some(TagDelta::Tags(tags)) => assert_eq!(tags.number(TagKey::Fs), Some(10.0)),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

use std::collections::BTreeMap;

use crate::drawing::{compile_drawing, CompiledDrawing};
use crate::parser::tags::{ClipArgs, ClipSpec, NumericTag, ParsedTag, TransitionSpec};
use crate::utils::{coerce_number, nonzero_or};

#[cfg(feature = "serde")]
use crate::utils::float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Legacy `\a` values mapped to numpad alignment
const LEGACY_ALIGNMENT: [Option<u8>; 12] = [
    None,
    Some(1),
    Some(2),
    Some(3),
    None,
    Some(7),
    Some(8),
    Some(9),
    None,
    Some(4),
    Some(5),
    Some(6),
];

/// Canonical name of a resolved fragment tag
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagKey {
    Fn,
    Fs,
    C1,
    C2,
    C3,
    C4,
    A1,
    A2,
    A3,
    A4,
    B,
    I,
    U,
    S,
    Fsp,
    K,
    #[cfg_attr(feature = "serde", serde(rename = "K"))]
    KUpper,
    Kf,
    Ko,
    Kt,
    Fe,
    Q,
    P,
    Pbo,
    Fscx,
    Fscy,
    Fax,
    Fay,
    Frx,
    Fry,
    Frz,
    Be,
    Blur,
    Xbord,
    Ybord,
    Xshad,
    Yshad,
    /// Only present inside animation groups
    Clip,
}

impl TagKey {
    const COLORS: [Self; 4] = [Self::C1, Self::C2, Self::C3, Self::C4];
    const ALPHAS: [Self; 4] = [Self::A1, Self::A2, Self::A3, Self::A4];

    /// Color key of slot 1 to 4
    #[must_use]
    pub fn color(slot: u8) -> Option<Self> {
        Self::COLORS.get(usize::from(slot).checked_sub(1)?).copied()
    }

    /// Alpha key of slot 1 to 4
    #[must_use]
    pub fn alpha(slot: u8) -> Option<Self> {
        Self::ALPHAS.get(usize::from(slot).checked_sub(1)?).copied()
    }

    /// Key that a numeric tag assigns directly, `None` for tags with
    /// special handling
    const fn from_numeric(tag: NumericTag) -> Option<Self> {
        Some(match tag {
            NumericTag::B => Self::B,
            NumericTag::I => Self::I,
            NumericTag::U => Self::U,
            NumericTag::S => Self::S,
            NumericTag::Fsp => Self::Fsp,
            NumericTag::K => Self::K,
            NumericTag::KUpper => Self::KUpper,
            NumericTag::Kf => Self::Kf,
            NumericTag::Ko => Self::Ko,
            NumericTag::Kt => Self::Kt,
            NumericTag::Fe => Self::Fe,
            NumericTag::Q => Self::Q,
            NumericTag::P => Self::P,
            NumericTag::Pbo => Self::Pbo,
            NumericTag::Fscx => Self::Fscx,
            NumericTag::Fscy => Self::Fscy,
            NumericTag::Fax => Self::Fax,
            NumericTag::Fay => Self::Fay,
            NumericTag::Frx => Self::Frx,
            NumericTag::Fry => Self::Fry,
            NumericTag::Frz | NumericTag::Fr => Self::Frz,
            NumericTag::Be => Self::Be,
            NumericTag::Blur => Self::Blur,
            NumericTag::Xbord => Self::Xbord,
            NumericTag::Ybord => Self::Ybord,
            NumericTag::Xshad => Self::Xshad,
            NumericTag::Yshad => Self::Yshad,
            NumericTag::A | NumericTag::An | NumericTag::Bord | NumericTag::Shad => return None,
        })
    }
}

/// Value of a resolved tag
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Number(#[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))] f64),
    /// Font names, `BBGGRR` colors and `AA` alphas
    Text(String),
    Clip(Clip),
}

/// Resolved tag set of a fragment or style
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedTags {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub values: BTreeMap<TagKey, TagValue>,
    /// Animation groups in source order
    #[cfg_attr(
        feature = "serde",
        serde(rename = "t", default, skip_serializing_if = "Vec::is_empty")
    )]
    pub transitions: Vec<Transition>,
}

impl ResolvedTags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag set with a single assignment
    #[must_use]
    pub fn single(key: TagKey, value: TagValue) -> Self {
        let mut tags = Self::new();
        tags.insert(key, value);
        tags
    }

    pub fn insert(&mut self, key: TagKey, value: TagValue) {
        self.values.insert(key, value);
    }

    #[must_use]
    pub fn get(&self, key: TagKey) -> Option<&TagValue> {
        self.values.get(&key)
    }

    /// Numeric value of `key`
    #[must_use]
    pub fn number(&self, key: TagKey) -> Option<f64> {
        match self.values.get(&key)? {
            TagValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Text value of `key`
    #[must_use]
    pub fn text(&self, key: TagKey) -> Option<&str> {
        match self.values.get(&key)? {
            TagValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Apply `other` on top of this set
    pub fn merge(&mut self, other: Self) {
        self.values.extend(other.values);
        self.transitions.extend(other.transitions);
    }

    /// No assignments and no animation groups
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.transitions.is_empty()
    }
}

/// `\t` animation group
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Start offset in milliseconds
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub t1: f64,
    /// End offset in milliseconds
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub t2: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub accel: f64,
    /// Animated target values
    pub tag: ResolvedTags,
}

/// `\pos` or `\org` coordinates
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub x: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub y: f64,
}

/// `\move`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub x1: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub y1: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub x2: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub y2: f64,
    /// Zero when the times were omitted
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub t1: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub t2: f64,
}

/// `\fad` / `\fade`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fade {
    /// Fade in over `t1` and out over `t2` milliseconds
    #[cfg_attr(feature = "serde", serde(rename = "fad"))]
    Simple {
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        t1: f64,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        t2: f64,
    },
    /// Three alpha stages switched at four times
    #[cfg_attr(feature = "serde", serde(rename = "fade"))]
    Complex {
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        a1: f64,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        a2: f64,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        a3: f64,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        t1: f64,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        t2: f64,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        t3: f64,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        t4: f64,
    },
}

/// Clip region shape
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum ClipShape {
    Drawing(CompiledDrawing),
    Rect {
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        x1: f64,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        y1: f64,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        x2: f64,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        y2: f64,
    },
}

/// Compiled `\clip` / `\iclip`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub inverse: bool,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub scale: f64,
    pub shape: ClipShape,
}

/// Ambient values a tag may resolve against
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagPresets {
    /// Current `c1` to `c4`
    pub colors: [Option<String>; 4],
    /// Current font size, base for relative `\fs`
    pub fs: f64,
    /// Event start in seconds
    pub start: f64,
    /// Event end in seconds
    pub end: f64,
}

impl TagPresets {
    /// Presets taking colors from a slice's base tags
    #[must_use]
    pub fn from_base(base: &ResolvedTags, fs: f64, start: f64, end: f64) -> Self {
        let colors = TagKey::COLORS.map(|key| base.text(key).map(ToString::to_string));
        Self {
            colors,
            fs,
            start,
            end,
        }
    }
}

/// Outcome of compiling one tag
#[derive(Debug, Clone, PartialEq)]
pub enum TagDelta {
    /// Assignments to the fragment's tag set
    Tags(ResolvedTags),
    /// Animation group appended to the fragment
    Transition(Transition),
    Position(Position),
    Origin(Position),
    Move(Movement),
    Fade(Fade),
    Clip(Clip),
    /// Numpad alignment 1 to 9
    Alignment(u8),
    /// Style reset, empty for the line's own style
    Reset(String),
}

/// Compile one parsed tag
///
/// Returns `None` when the tag is dropped: wrong argument counts, color or
/// alpha slots outside 1 to 4, alignments outside the numpad.
#[must_use]
pub fn compile_tag(tag: &ParsedTag, presets: &TagPresets) -> Option<TagDelta> {
    let delta = match tag {
        ParsedTag::Numeric(numeric, value) => compile_numeric(*numeric, *value)?,
        ParsedTag::FontName(name) => TagDelta::Tags(ResolvedTags::single(
            TagKey::Fn,
            TagValue::Text(name.clone()),
        )),
        ParsedTag::Reset(name) => TagDelta::Reset(name.clone()),
        ParsedTag::FontSize(raw) => TagDelta::Tags(ResolvedTags::single(
            TagKey::Fs,
            TagValue::Number(font_size(raw, presets.fs)),
        )),
        ParsedTag::Color { slot, value } => {
            let key = TagKey::color(*slot)?;
            let color = value
                .clone()
                .or_else(|| presets.colors[usize::from(*slot) - 1].clone())?;
            TagDelta::Tags(ResolvedTags::single(key, TagValue::Text(color)))
        }
        ParsedTag::Alpha { slot, value } => {
            let key = TagKey::alpha(*slot)?;
            TagDelta::Tags(ResolvedTags::single(key, TagValue::Text(value.clone())))
        }
        ParsedTag::AllAlpha(value) => {
            let mut tags = ResolvedTags::new();
            for key in TagKey::ALPHAS {
                tags.insert(key, TagValue::Text(value.clone()));
            }
            TagDelta::Tags(tags)
        }
        ParsedTag::Pos(args) => TagDelta::Position(position(args)?),
        ParsedTag::Org(args) => TagDelta::Origin(position(args)?),
        ParsedTag::Move(args) => TagDelta::Move(movement(args)?),
        ParsedTag::Fade(args) => TagDelta::Fade(fade(args)?),
        ParsedTag::Clip(spec) => TagDelta::Clip(clip(spec)),
        ParsedTag::Transition(spec) => TagDelta::Transition(transition(spec, presets)),
    };

    Some(delta)
}

fn compile_numeric(tag: NumericTag, value: f64) -> Option<TagDelta> {
    match tag {
        NumericTag::A => {
            let index = numpad_index(value, LEGACY_ALIGNMENT.len())?;
            LEGACY_ALIGNMENT[index].map(TagDelta::Alignment)
        }
        NumericTag::An => {
            let index = numpad_index(value, 10).filter(|&i| i >= 1)?;
            u8::try_from(index).ok().map(TagDelta::Alignment)
        }
        NumericTag::Bord => Some(axis_pair(TagKey::Xbord, TagKey::Ybord, value)),
        NumericTag::Shad => Some(axis_pair(TagKey::Xshad, TagKey::Yshad, value)),
        NumericTag::Xbord | NumericTag::Ybord | NumericTag::Xshad | NumericTag::Yshad => {
            let key = TagKey::from_numeric(tag)?;
            Some(TagDelta::Tags(ResolvedTags::single(
                key,
                TagValue::Number(clamp_non_negative(value)),
            )))
        }
        _ => {
            let key = TagKey::from_numeric(tag)?;
            Some(TagDelta::Tags(ResolvedTags::single(key, TagValue::Number(value))))
        }
    }
}

/// Integral `value` in `0..len`
fn numpad_index(value: f64, len: usize) -> Option<usize> {
    if value.fract() != 0.0 || value < 0.0 || value >= len as f64 {
        tracing::trace!(value, "alignment out of range");
        return None;
    }
    Some(value as usize)
}

/// Negative outline and shadow sizes are 0, `NaN` stays visible
fn clamp_non_negative(value: f64) -> f64 {
    if value < 0.0 {
        0.0
    } else {
        value
    }
}

fn axis_pair(x: TagKey, y: TagKey, value: f64) -> TagDelta {
    let value = clamp_non_negative(value);
    let mut tags = ResolvedTags::new();
    tags.insert(x, TagValue::Number(value));
    tags.insert(y, TagValue::Number(value));
    TagDelta::Tags(tags)
}

fn font_size(raw: &str, ambient: f64) -> f64 {
    let value = coerce_number(raw);
    let signed = raw.starts_with(['+', '-']);
    if signed && value.abs() < 10.0 {
        ambient * (1.0 + value / 10.0)
    } else {
        value
    }
}

fn position(args: &[f64]) -> Option<Position> {
    match *args {
        [x, y] => Some(Position { x, y }),
        _ => {
            tracing::trace!(count = args.len(), "position needs two arguments");
            None
        }
    }
}

fn movement(args: &[f64]) -> Option<Movement> {
    match *args {
        [x1, y1, x2, y2] => Some(Movement {
            x1,
            y1,
            x2,
            y2,
            t1: 0.0,
            t2: 0.0,
        }),
        [x1, y1, x2, y2, t1, t2] => Some(Movement {
            x1,
            y1,
            x2,
            y2,
            t1,
            t2,
        }),
        _ => {
            tracing::trace!(count = args.len(), "move needs four or six arguments");
            None
        }
    }
}

fn fade(args: &[f64]) -> Option<Fade> {
    match *args {
        [t1, t2] => Some(Fade::Simple { t1, t2 }),
        [a1, a2, a3, t1, t2, t3, t4] => Some(Fade::Complex {
            a1,
            a2,
            a3,
            t1,
            t2,
            t3,
            t4,
        }),
        _ => {
            tracing::trace!(count = args.len(), "fade needs two or seven arguments");
            None
        }
    }
}

fn clip(spec: &ClipSpec) -> Clip {
    let shape = match &spec.args {
        ClipArgs::Drawing(commands) => ClipShape::Drawing(compile_drawing(commands)),
        ClipArgs::Rect([x1, y1, x2, y2]) => ClipShape::Rect {
            x1: *x1,
            y1: *y1,
            x2: *x2,
            y2: *y2,
        },
    };
    Clip {
        inverse: spec.inverse,
        scale: spec.scale,
        shape,
    }
}

/// Tags that may appear inside `\t`
fn is_animatable(tag: &ParsedTag) -> bool {
    match tag {
        ParsedTag::FontSize(_)
        | ParsedTag::Color { .. }
        | ParsedTag::Alpha { .. }
        | ParsedTag::AllAlpha(_) => true,
        ParsedTag::Clip(spec) => matches!(spec.args, ClipArgs::Rect(_)),
        ParsedTag::Numeric(numeric, _) => matches!(
            numeric,
            NumericTag::Fscx
                | NumericTag::Fscy
                | NumericTag::Fax
                | NumericTag::Fay
                | NumericTag::Frx
                | NumericTag::Fry
                | NumericTag::Frz
                | NumericTag::Fr
                | NumericTag::Be
                | NumericTag::Blur
                | NumericTag::Bord
                | NumericTag::Xbord
                | NumericTag::Ybord
                | NumericTag::Shad
                | NumericTag::Xshad
                | NumericTag::Yshad
        ),
        _ => false,
    }
}

fn transition(spec: &TransitionSpec, presets: &TagPresets) -> Transition {
    let duration_ms = (presets.end - presets.start) * 1000.0;
    let mut tag = ResolvedTags::new();

    for nested in &spec.tags {
        if !is_animatable(nested) {
            tracing::trace!(?nested, "non-animatable tag in transition dropped");
            continue;
        }
        match compile_tag(nested, presets) {
            Some(TagDelta::Tags(values)) => tag.merge(values),
            Some(TagDelta::Clip(clip)) => tag.insert(TagKey::Clip, TagValue::Clip(clip)),
            _ => {}
        }
    }

    Transition {
        t1: spec.t1,
        t2: nonzero_or(spec.t2, duration_ms),
        accel: spec.accel,
        tag,
    }
}

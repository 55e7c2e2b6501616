//! Dialogue and fragment compiler
//!
//! Walks the parsed segments of each dialogue row and produces slices of
//! fragments with fully resolved tags. Each fragment starts from the tags of
//! the fragment before it, so overrides carry forward until a `\r` clears
//! them. Event-level settings (alignment, position, origin, movement, fade,
//! clip) take the first occurrence anywhere in the line.

use crate::compiler::styles::CompiledStyle;
use crate::compiler::tags::{
    compile_tag, Clip, Fade, Movement, Position, ResolvedTags, TagDelta, TagKey, TagPresets,
};
use crate::drawing::{compile_drawing, CompiledDrawing};
use crate::parser::ast::{DialogueRecord, Effect, ParsedSegment};
use crate::parser::ParsedTag;
use crate::utils::{nonzero_or, AssHashMap};

#[cfg(feature = "serde")]
use crate::utils::float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Run of text or drawing sharing one tag set
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Overrides on top of the slice's base tags
    pub tag: ResolvedTags,
    pub text: String,
    pub drawing: Option<CompiledDrawing>,
}

/// Fragments rendered with one style
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    /// Style name as referenced, which may name a missing style after `\r`
    pub name: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub border_style: f64,
    /// Base tags of the style
    pub tag: ResolvedTags,
    pub fragments: Vec<Fragment>,
}

impl Slice {
    fn new(name: &str, style: &CompiledStyle) -> Self {
        Self {
            name: name.to_string(),
            border_style: style.style.border_style,
            tag: style.tag.clone(),
            fragments: Vec::new(),
        }
    }

    /// Append a fragment, joining plain text to the previous fragment when
    /// its tags are empty or equal to the previous ones
    fn push(&mut self, fragment: Fragment) {
        if let Some(prev) = self.fragments.last_mut() {
            let same_tags = fragment.tag.is_empty() || fragment.tag == prev.tag;
            if !prev.text.is_empty() && !fragment.text.is_empty() && same_tags {
                prev.text.push_str(&fragment.text);
                return;
            }
        }
        self.fragments.push(fragment);
    }
}

/// Effective event margins
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub left: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub right: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub vertical: f64,
}

/// Compiled dialogue event
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueEvent {
    /// Layer shifted so the lowest layer of the batch is 0
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub layer: f64,
    /// Seconds
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub start: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub end: f64,
    pub margin: Margin,
    pub effect: Option<Effect>,
    /// Numpad alignment 1 to 9
    pub alignment: u8,
    pub pos: Option<Position>,
    pub org: Option<Position>,
    #[cfg_attr(feature = "serde", serde(rename = "move"))]
    pub movement: Option<Movement>,
    pub fade: Option<Fade>,
    pub clip: Option<Clip>,
    pub slices: Vec<Slice>,
}

/// Result of [`compile_text`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledText {
    pub alignment: Option<u8>,
    pub pos: Option<Position>,
    pub org: Option<Position>,
    pub movement: Option<Movement>,
    pub fade: Option<Fade>,
    pub clip: Option<Clip>,
    pub slices: Vec<Slice>,
}

/// Inputs of [`compile_text`] for one dialogue row
#[derive(Debug, Clone, Copy)]
pub struct TextContext<'a> {
    pub styles: &'a AssHashMap<String, CompiledStyle>,
    /// Style of the row, already resolved to an existing entry
    pub name: &'a str,
    pub style: &'a CompiledStyle,
    pub start: f64,
    pub end: f64,
}

/// Compile the segments of one dialogue row
#[must_use]
pub fn compile_text(context: &TextContext<'_>, segments: &[ParsedSegment]) -> CompiledText {
    let mut out = CompiledText::default();
    let mut slice = Slice::new(context.name, context.style);
    let mut prev_tag = ResolvedTags::new();

    for segment in segments {
        let reset = segment.tags.iter().rev().find_map(|tag| match tag {
            ParsedTag::Reset(name) => Some(name.as_str()),
            _ => None,
        });

        let mut fragment = Fragment {
            tag: if reset.is_some() {
                ResolvedTags::new()
            } else {
                prev_tag.clone()
            },
            text: segment.text.clone(),
            drawing: (!segment.drawing.is_empty()).then(|| compile_drawing(&segment.drawing)),
        };

        let fs = prev_tag
            .number(TagKey::Fs)
            .map_or_else(|| base_font_size(&slice), |fs| nonzero_or(fs, base_font_size(&slice)));
        let presets = TagPresets::from_base(&slice.tag, fs, context.start, context.end);

        for tag in &segment.tags {
            match compile_tag(tag, &presets) {
                Some(TagDelta::Tags(values)) => fragment.tag.merge(values),
                Some(TagDelta::Transition(transition)) => fragment.tag.transitions.push(transition),
                Some(TagDelta::Alignment(value)) => {
                    out.alignment.get_or_insert(value);
                }
                Some(TagDelta::Position(value)) => {
                    out.pos.get_or_insert(value);
                }
                Some(TagDelta::Origin(value)) => {
                    out.org.get_or_insert(value);
                }
                Some(TagDelta::Move(value)) => {
                    out.movement.get_or_insert(value);
                }
                Some(TagDelta::Fade(value)) => {
                    out.fade.get_or_insert(value);
                }
                Some(TagDelta::Clip(value)) => {
                    out.clip.get_or_insert(value);
                }
                Some(TagDelta::Reset(_)) | None => {}
            }
        }

        prev_tag = fragment.tag.clone();

        if let Some(name) = reset {
            let next = next_slice(context, name);
            out.slices.push(std::mem::replace(&mut slice, next));
        }

        if !fragment.text.is_empty() || fragment.drawing.is_some() {
            slice.push(fragment);
        }
    }

    out.slices.push(slice);
    out
}

fn base_font_size(slice: &Slice) -> f64 {
    slice.tag.number(TagKey::Fs).unwrap_or_default()
}

/// Slice started by `\r<name>`
///
/// An empty name returns to the row's style. An unknown name keeps the name
/// but renders with the row's style.
fn next_slice(context: &TextContext<'_>, name: &str) -> Slice {
    if name.is_empty() {
        return Slice::new(context.name, context.style);
    }
    match context.styles.get(name) {
        Some(style) => Slice::new(name, style),
        None => {
            tracing::debug!(style = name, "reset to unknown style");
            Slice::new(name, context.style)
        }
    }
}

/// Alignment of a style, 2 when the field is not a numpad value
fn style_alignment(style: &CompiledStyle) -> u8 {
    let value = style.style.alignment;
    if value.fract() == 0.0 && (1.0..=9.0).contains(&value) {
        value as u8
    } else {
        2
    }
}

/// Compile dialogue rows into events
///
/// Rows without a valid time range are skipped and rows naming a missing
/// style use `Default`. Layers are shifted so the lowest becomes 0 and the
/// events are stably sorted by start, then end.
#[must_use]
pub fn compile_dialogues(
    styles: &AssHashMap<String, CompiledStyle>,
    dialogues: &[DialogueRecord],
) -> Vec<DialogueEvent> {
    let mut events = Vec::with_capacity(dialogues.len());

    for dialogue in dialogues {
        let (Some(start), Some(end)) = (dialogue.start, dialogue.end) else {
            tracing::debug!(style = %dialogue.style, "dialogue without valid times skipped");
            continue;
        };
        if start >= end {
            tracing::debug!(start, end, "dialogue with empty time range skipped");
            continue;
        }

        let (name, style) = match styles.get_key_value(dialogue.style.as_str()) {
            Some((name, style)) => (name.as_str(), style),
            None => match styles.get_key_value("Default") {
                Some((name, style)) => (name.as_str(), style),
                None => {
                    tracing::debug!(style = %dialogue.style, "no style available, dialogue skipped");
                    continue;
                }
            },
        };

        let context = TextContext {
            styles,
            name,
            style,
            start,
            end,
        };
        let text = compile_text(&context, &dialogue.text.segments);
        let record = &style.style;

        events.push(DialogueEvent {
            layer: if dialogue.layer.is_finite() {
                dialogue.layer
            } else {
                0.0
            },
            start,
            end,
            margin: Margin {
                left: nonzero_or(dialogue.margin_l, record.margin_l),
                right: nonzero_or(dialogue.margin_r, record.margin_r),
                vertical: nonzero_or(dialogue.margin_v, record.margin_v),
            },
            effect: dialogue.effect.clone(),
            alignment: text.alignment.unwrap_or_else(|| style_alignment(style)),
            pos: text.pos,
            org: text.org,
            movement: text.movement,
            fade: text.fade,
            clip: text.clip,
            slices: text.slices,
        });
    }

    let min_layer = events
        .iter()
        .map(|event| event.layer)
        .fold(f64::INFINITY, f64::min);
    for event in &mut events {
        event.layer -= min_layer;
    }

    events.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));
    events
}

//! Row-level parsing for the styles and events sections
//!
//! Rows are comma separated with no quoting. The final declared column
//! absorbs any extra commas, which is what lets dialogue text contain them.

use crate::parser::ast::{DialogueRecord, Effect, ScrollDirection};
use crate::parser::text::parse_text;
use crate::utils::{coerce_number, nonzero_or, parse_time, CoreError};

/// Strip a `Descriptor:` prefix, matching the descriptor case-insensitively
///
/// Whitespace is allowed between the descriptor and the colon. Returns the
/// trimmed remainder of the line.
#[must_use]
pub fn strip_descriptor<'a>(line: &'a str, descriptor: &str) -> Option<&'a str> {
    let head = line.get(..descriptor.len())?;
    if !head.eq_ignore_ascii_case(descriptor) {
        return None;
    }
    let rest = line[descriptor.len()..].trim_start().strip_prefix(':')?;
    Some(rest.trim())
}

/// Parse the column list of a `Format:` line
///
/// Returns `None` when the line is not a format line.
#[must_use]
pub fn parse_format(line: &str) -> Option<Vec<String>> {
    let columns = strip_descriptor(line, "Format")?;
    Some(columns.split(',').map(|c| c.trim().to_string()).collect())
}

/// Split a row into at most `columns` trimmed fields
fn split_fields(data: &str, columns: usize) -> Vec<&str> {
    if columns == 0 {
        data.split(',').map(str::trim).collect()
    } else {
        data.splitn(columns, ',').map(str::trim).collect()
    }
}

/// Parse the fields of a `Style:` line against the style format
#[must_use]
pub fn parse_style_row(line: &str, format: &[String]) -> Option<Vec<String>> {
    let data = strip_descriptor(line, "Style")?;
    Some(
        split_fields(data, format.len())
            .into_iter()
            .map(str::to_string)
            .collect(),
    )
}

/// Parse the data part of a `Dialogue:` or `Comment:` line
///
/// # Example
///
/// ```rust
/// use ass_compiler::parser::parse_dialogue;
///
/// let format: Vec<String> = ["Layer", "Start", "End", "Style", "Text"]
///     .iter()
///     .map(ToString::to_string)
///     .collect();
/// let row = parse_dialogue("1,0:00:01.00,0:00:02.50,Default,Hi, there", &format);
/// assert_eq!(row.start, Some(1.0));
/// assert_eq!(row.end, Some(2.5));
/// assert_eq!(row.text.combined, "Hi, there");
/// ```
#[must_use]
pub fn parse_dialogue(data: &str, format: &[String]) -> DialogueRecord {
    let mut record = DialogueRecord::default();
    if let Err(err) = require_format(format) {
        tracing::debug!(%err, "event row ignored");
        return record;
    }

    for (column, field) in format.iter().zip(split_fields(data, format.len())) {
        match column.as_str() {
            "Layer" => record.layer = coerce_number(field),
            "Start" => record.start = read_time(field),
            "End" => record.end = read_time(field),
            "Style" => record.style = field.to_string(),
            "Name" => record.name = field.to_string(),
            "MarginL" => record.margin_l = coerce_number(field),
            "MarginR" => record.margin_r = coerce_number(field),
            "MarginV" => record.margin_v = coerce_number(field),
            "Effect" => record.effect = parse_effect(field),
            "Text" => record.text = parse_text(field),
            _ => record.extra.push((column.clone(), field.to_string())),
        }
    }

    record
}

fn require_format(format: &[String]) -> Result<(), CoreError> {
    if format.is_empty() {
        Err(CoreError::parse("event row before any Format line"))
    } else {
        Ok(())
    }
}

fn read_time(field: &str) -> Option<f64> {
    parse_time(field)
        .map_err(|err| tracing::debug!(%err, "event time ignored"))
        .ok()
}

/// Parse the legacy `Effect` column
///
/// # Example
///
/// ```rust
/// use ass_compiler::parser::{parse_effect, Effect, ScrollDirection};
///
/// let effect = parse_effect("Scroll up;400;100;20");
/// assert_eq!(
///     effect,
///     Some(Effect::Scroll {
///         direction: ScrollDirection::Up,
///         y1: 100.0,
///         y2: 400.0,
///         delay: 20.0,
///         fade_away_height: 0.0,
///     })
/// );
/// assert_eq!(parse_effect("Karaoke"), None);
/// ```
#[must_use]
pub fn parse_effect(text: &str) -> Option<Effect> {
    let lowered = text.trim().to_lowercase();
    let params: Vec<&str> = lowered.split(';').map(str::trim).collect();
    let number = |index: usize| params.get(index).map_or(0.0, |p| nonzero_or(coerce_number(p), 0.0));

    let name = params.first().copied().unwrap_or_default();
    if name == "banner" {
        return Some(Effect::Banner {
            delay: number(1),
            left_to_right: number(2) != 0.0,
            fade_away_width: number(3),
        });
    }

    let direction = match name.strip_prefix("scroll")?.trim_start() {
        "up" => ScrollDirection::Up,
        "down" => ScrollDirection::Down,
        _ => return None,
    };
    let (a, b) = (number(1), number(2));

    Some(Effect::Scroll {
        direction,
        y1: a.min(b),
        y2: a.max(b),
        delay: number(3),
        fade_away_height: number(4),
    })
}

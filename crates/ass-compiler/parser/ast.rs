//! Parsed script tree
//!
//! Owned data produced by [`crate::parser::parse`] and by the streaming
//! session. Field values are interpreted only as far as the compiler needs:
//! times become seconds, margins and layers become numbers, dialogue text is
//! split into tagged segments, everything else stays raw text.

use crate::parser::tags::ParsedTag;
use crate::tokenizer::RawDrawingCommand;

#[cfg(feature = "serde")]
use crate::utils::float;
#[cfg(feature = "serde")]
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

/// `[Script Info]` entries in first-seen order
///
/// Repeated keys keep their original position and take the latest value.
/// Serializes as a map in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptInfo {
    entries: Vec<(String, String)>,
}

impl ScriptInfo {
    /// Value of `key`, matched case-sensitively
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Set `key`, replacing any earlier value in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Entries in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(feature = "serde")]
impl Serialize for ScriptInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for ScriptInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct InfoVisitor;

        impl<'de> Visitor<'de> for InfoVisitor {
            type Value = ScriptInfo;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a map of script info entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut info = ScriptInfo::default();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    info.insert(key, value);
                }
                Ok(info)
            }
        }

        deserializer.deserialize_map(InfoVisitor)
    }
}

/// `[V4+ Styles]` section: column names and raw rows
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleTable {
    /// Column names from the `Format:` line
    pub format: Vec<String>,
    /// Field values of each `Style:` line
    pub rows: Vec<Vec<String>>,
}

/// `[Events]` section
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    /// Column names from the `Format:` line
    pub format: Vec<String>,
    pub comments: Vec<DialogueRecord>,
    pub dialogues: Vec<DialogueRecord>,
}

/// Complete parse of a script
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedScript {
    pub info: ScriptInfo,
    pub styles: StyleTable,
    pub events: EventTable,
}

/// Scroll direction of a `Scroll up` / `Scroll down` effect
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Legacy SSA transition effect from the `Effect` column
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Text scrolls horizontally across the screen
    Banner {
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        delay: f64,
        left_to_right: bool,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        fade_away_width: f64,
    },
    /// Text scrolls vertically between `y1` and `y2` (`y1 <= y2`)
    Scroll {
        direction: ScrollDirection,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        y1: f64,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        y2: f64,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        delay: f64,
        #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
        fade_away_height: f64,
    },
}

/// One piece of dialogue text and the override block that precedes it
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSegment {
    /// Recognized tags of the preceding block, in order
    pub tags: Vec<ParsedTag>,
    /// Plain text, empty in drawing mode
    pub text: String,
    /// Drawing commands when the block enabled drawing mode
    pub drawing: Vec<RawDrawingCommand>,
}

/// Dialogue `Text` column split into segments
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedText {
    /// Field as written
    pub raw: String,
    /// Concatenated segment text without override blocks
    pub combined: String,
    pub segments: Vec<ParsedSegment>,
}

/// A `Dialogue:` or `Comment:` row
///
/// Missing columns keep their defaults; absent or malformed times stay
/// `None` and make the compiler skip the row.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogueRecord {
    pub layer: f64,
    /// Start time in seconds
    pub start: Option<f64>,
    /// End time in seconds
    pub end: Option<f64>,
    pub style: String,
    /// Actor name
    pub name: String,
    pub margin_l: f64,
    pub margin_r: f64,
    pub margin_v: f64,
    pub effect: Option<Effect>,
    pub text: ParsedText,
    /// Columns the compiler does not interpret, in format order
    pub extra: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_info_keeps_first_position() {
        let mut info = ScriptInfo::default();
        info.insert("Title", "A");
        info.insert("PlayResX", "640");
        info.insert("Title", "B");

        assert_eq!(info.len(), 2);
        assert_eq!(info.get("Title"), Some("B"));
        assert_eq!(
            info.iter().collect::<Vec<_>>(),
            vec![("Title", "B"), ("PlayResX", "640")]
        );
        assert_eq!(info.get("title"), None);
    }
}

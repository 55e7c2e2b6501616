//! ASS script parser module
//!
//! Turns script text into a [`ParsedScript`]: the `[Script Info]` key/value
//! table, the raw style rows and parsed dialogue rows. Parsing never fails;
//! lines that fit no rule are skipped.
//!
//! The line-level state machine lives in [`ScriptParser`] so that the
//! streaming session can feed it text in several chunks while keeping the
//! current section between calls.
//!
//! # Example
//!
//! ```rust
//! use ass_compiler::parser::parse;
//!
//! let script = parse(r"
//! [Script Info]
//! Title: Example
//!
//! [Events]
//! Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
//! Dialogue: 0,0:00:00.00,0:00:05.00,Default,,0,0,0,,Hello World!
//! ");
//!
//! assert_eq!(script.info.get("Title"), Some("Example"));
//! assert_eq!(script.events.dialogues.len(), 1);
//! ```

pub mod ast;
pub mod dialogue;
pub mod tags;
pub mod text;

pub use ast::{
    DialogueRecord, Effect, EventTable, ParsedScript, ParsedSegment, ParsedText, ScriptInfo,
    ScrollDirection, StyleTable,
};
pub use dialogue::{parse_dialogue, parse_effect, parse_format, parse_style_row, strip_descriptor};
pub use tags::{parse_tag, parse_tags, ClipArgs, ClipSpec, NumericTag, ParsedTag, TransitionSpec};
pub use text::parse_text;

/// Section a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionKind {
    /// Before any header, or inside a section the compiler does not read
    #[default]
    Ignored,
    ScriptInfo,
    Styles,
    Events,
}

impl SectionKind {
    /// Classify a section header line, `None` if the line is not a header
    ///
    /// ```rust
    /// # use ass_compiler::parser::SectionKind;
    /// assert_eq!(SectionKind::from_header("[v4+ styles]"), Some(SectionKind::Styles));
    /// assert_eq!(SectionKind::from_header("[Fonts]"), Some(SectionKind::Ignored));
    /// assert_eq!(SectionKind::from_header("Title: x"), None);
    /// ```
    #[must_use]
    pub fn from_header(line: &str) -> Option<Self> {
        let starts_with = |prefix: &str| {
            line.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        };

        if starts_with("[Script Info]") {
            Some(Self::ScriptInfo)
        } else if starts_with("[V4+ Styles]") || starts_with("[V4 Styles]") {
            Some(Self::Styles)
        } else if starts_with("[Events]") {
            Some(Self::Events)
        } else if line.starts_with('[') && line[1..].contains(']') {
            Some(Self::Ignored)
        } else {
            None
        }
    }
}

/// Incremental line parser
///
/// Owns the partially built [`ParsedScript`] and the current section. Feeding
/// the same text in one call or split across several calls at line
/// boundaries produces the same result.
#[derive(Debug, Clone, Default)]
pub struct ScriptParser {
    section: SectionKind,
    script: ParsedScript,
}

impl ScriptParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every line of `text`, continuing in the current section
    pub fn feed(&mut self, text: &str) {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        for line in text.split('\n') {
            self.feed_line(line);
        }
    }

    /// Parse a single line
    pub fn feed_line(&mut self, line: &str) {
        let line = line.trim();
        if line.starts_with(';') {
            return;
        }

        if let Some(section) = SectionKind::from_header(line) {
            self.section = section;
            return;
        }

        match self.section {
            SectionKind::Ignored => {}
            SectionKind::ScriptInfo => {
                if let Some((key, value)) = line.split_once(':') {
                    self.script.info.insert(key.trim_end(), value.trim_start());
                }
            }
            SectionKind::Styles => {
                if let Some(format) = parse_format(line) {
                    self.script.styles.format = format;
                } else if let Some(row) = parse_style_row(line, &self.script.styles.format) {
                    self.script.styles.rows.push(row);
                }
            }
            SectionKind::Events => self.feed_event_line(line),
        }
    }

    fn feed_event_line(&mut self, line: &str) {
        let events = &mut self.script.events;
        if let Some(format) = parse_format(line) {
            events.format = format;
        } else if let Some(data) = strip_descriptor(line, "Dialogue") {
            events.dialogues.push(parse_dialogue(data, &events.format));
        } else if let Some(data) = strip_descriptor(line, "Comment") {
            events.comments.push(parse_dialogue(data, &events.format));
        } else if !line.is_empty() {
            tracing::trace!(line, "unhandled event line");
        }
    }

    /// Section the next line will be read in
    #[must_use]
    pub const fn section(&self) -> SectionKind {
        self.section
    }

    /// Script parsed so far
    #[must_use]
    pub const fn script(&self) -> &ParsedScript {
        &self.script
    }

    /// Remove and return dialogue rows parsed since the last call
    pub fn take_dialogues(&mut self) -> Vec<DialogueRecord> {
        std::mem::take(&mut self.script.events.dialogues)
    }

    /// Remove and return comment rows parsed since the last call
    pub fn take_comments(&mut self) -> Vec<DialogueRecord> {
        std::mem::take(&mut self.script.events.comments)
    }

    /// Finish parsing and return the tree
    #[must_use]
    pub fn finish(self) -> ParsedScript {
        self.script
    }
}

/// Parse a complete script
#[must_use]
pub fn parse(text: &str) -> ParsedScript {
    let mut parser = ScriptParser::new();
    parser.feed(text);
    parser.finish()
}

//! Incremental compile session for growing scripts
//!
//! [`AssStream`] is fed script text in chunks, for example a live caption
//! feed that appends dialogue lines as they arrive. Each call keeps the
//! section the previous chunk ended in, recompiles the styles seen so far and
//! compiles only the dialogue rows that are new since the last call.
//!
//! # Example
//!
//! ```rust
//! use ass_compiler::stream::AssStream;
//!
//! let mut session = AssStream::new();
//! session.parse("[Events]\nFormat: Layer, Start, End, Style, Text");
//!
//! let fresh = session.compile("Dialogue: 0,0:00:01.00,0:00:02.00,Default,first");
//! assert_eq!(fresh.len(), 1);
//!
//! session.compile("Dialogue: 0,0:00:03.00,0:00:04.00,Default,second");
//! assert_eq!(session.compiled().dialogues.len(), 2);
//! assert!(session.coverage().contains(1.5));
//! assert!(!session.coverage().contains(2.5));
//! ```

mod time_segments;

pub use time_segments::{SegmentLookup, TimeSegments};

use crate::compiler::{
    compile_dialogues, compile_styles, CompileOptions, CompiledScript, CompiledStyle,
    DialogueEvent,
};
use crate::parser::{DialogueRecord, ScriptParser, SectionKind};
use crate::utils::AssHashMap;

/// Streaming compile session
///
/// Owns the running parser state, the compiled styles and events, and the
/// coverage of every event compiled so far. Calls must be serialized; all
/// mutating methods take `&mut self`.
#[derive(Debug, Clone, Default)]
pub struct AssStream {
    options: CompileOptions,
    parser: ScriptParser,
    styles: AssHashMap<String, CompiledStyle>,
    dialogues: Vec<DialogueEvent>,
    coverage: TimeSegments,
}

impl AssStream {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose style compiles use `options`
    #[must_use]
    pub fn with_options(options: CompileOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Parse `text` without compiling
    ///
    /// New dialogue rows stay pending until the next [`compile`](Self::compile).
    pub fn parse(&mut self, text: &str) {
        self.parser.feed(text);
    }

    /// Parse `text`, then compile every pending dialogue row
    ///
    /// Styles are recompiled from everything parsed so far, so a style row
    /// that arrives late applies to the rows compiled from then on. Returns
    /// the rows that were compiled by this call.
    #[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
    pub fn compile(&mut self, text: &str) -> Vec<DialogueRecord> {
        self.parse(text);

        let script = self.parser.script();
        self.styles = compile_styles(
            &script.info,
            &script.styles.format,
            &script.styles.rows,
            self.options.default_style(),
        );

        let fresh = self.parser.take_dialogues();
        let events = compile_dialogues(&self.styles, &fresh);
        for event in &events {
            self.coverage.insert(event.start, event.end);
        }
        tracing::debug!(
            rows = fresh.len(),
            events = events.len(),
            total = self.dialogues.len() + events.len(),
            "stream chunk compiled"
        );
        self.dialogues.extend(events);

        fresh
    }

    /// Dialogue rows parsed but not compiled yet
    #[must_use]
    pub fn pending(&self) -> &[DialogueRecord] {
        &self.parser.script().events.dialogues
    }

    /// Remove and return comment rows parsed since the last call
    pub fn take_comments(&mut self) -> Vec<DialogueRecord> {
        self.parser.take_comments()
    }

    /// Section the next chunk continues in
    #[must_use]
    pub const fn section(&self) -> SectionKind {
        self.parser.section()
    }

    /// Events compiled so far, in compile order
    #[must_use]
    pub fn dialogues(&self) -> &[DialogueEvent] {
        &self.dialogues
    }

    /// Time covered by the events compiled so far
    #[must_use]
    pub const fn coverage(&self) -> &TimeSegments {
        &self.coverage
    }

    /// Snapshot of the accumulated document
    #[must_use]
    pub fn compiled(&self) -> CompiledScript {
        CompiledScript::assemble(
            self.parser.script().info.clone(),
            self.styles.clone(),
            self.dialogues.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::TagKey;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "[Script Info]
PlayResX: 640

[V4+ Styles]
Format: Name, Fontname, Fontsize
Style: Big,Arial,60

[Events]
Format: Layer, Start, End, Style, Text
";

    #[test]
    fn parse_keeps_rows_pending() {
        let mut session = AssStream::new();
        session.parse(HEADER);
        session.parse("Dialogue: 0,0:00:00.00,0:00:01.00,Big,x");
        assert_eq!(session.section(), SectionKind::Events);
        assert_eq!(session.pending().len(), 1);
        assert!(session.dialogues().is_empty());

        let fresh = session.compile("");
        assert_eq!(fresh.len(), 1);
        assert!(session.pending().is_empty());
        assert_eq!(session.dialogues().len(), 1);
    }

    #[test]
    fn compile_returns_only_new_rows() {
        let mut session = AssStream::new();
        assert!(session.compile(HEADER).is_empty());

        let first = session.compile(
            "Dialogue: 1,0:00:01.00,0:00:02.00,Big,one\nDialogue: 2,0:00:05.00,0:00:06.00,Big,two",
        );
        assert_eq!(first.len(), 2);

        let second = session.compile("Dialogue: 0,0:00:02.00,0:00:03.00,Big,three");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].text.combined, "three");

        let script = session.compiled();
        assert_eq!(script.width, Some(640.0));
        assert_eq!(script.dialogues.len(), 3);
        assert_eq!(
            script.dialogues[0].slices[0].tag.number(TagKey::Fs),
            Some(60.0)
        );
        assert_eq!(session.coverage().starts(), &[1.0, 5.0]);
        assert_eq!(session.coverage().ends(), &[3.0, 6.0]);
    }

    #[test]
    fn late_style_applies_to_later_rows() {
        let mut session = AssStream::new();
        session.compile("[Events]\nFormat: Start, End, Style, Text\nDialogue: 0:00:00.00,0:00:01.00,Late,a");
        session.compile("[V4+ Styles]\nFormat: Name, Fontsize\nStyle: Late,44");
        session.compile("[Events]\nDialogue: 0:00:01.00,0:00:02.00,Late,b");

        let dialogues = session.dialogues();
        assert_eq!(dialogues[0].slices[0].name, "Default");
        assert_eq!(dialogues[1].slices[0].name, "Late");
        assert_eq!(dialogues[1].slices[0].tag.number(TagKey::Fs), Some(44.0));
    }

    #[test]
    fn options_apply_to_stream_styles() {
        let options = CompileOptions::new()
            .with_default_field("Fontsize", "30")
            .unwrap_or_default();
        let mut session = AssStream::with_options(options);
        session.compile("[Events]\nFormat: Start, End, Text\nDialogue: 0:00:00.00,0:00:01.00,x");
        assert_eq!(
            session.dialogues()[0].slices[0].tag.number(TagKey::Fs),
            Some(30.0)
        );
    }

    #[test]
    fn comments_are_collected_separately() {
        let mut session = AssStream::new();
        session.compile("[Events]\nFormat: Start, End, Text\nComment: 0:00:00.00,0:00:01.00,note");
        assert!(session.dialogues().is_empty());
        let comments = session.take_comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text.raw, "note");
        assert!(session.take_comments().is_empty());
    }
}

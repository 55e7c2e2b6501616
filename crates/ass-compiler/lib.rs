//! # ASS Compiler
//!
//! Compiles ASS (Advanced `SubStation` Alpha) subtitle scripts into
//! renderer-ready scene descriptions: resolved styles, timed dialogue events,
//! and per-fragment text or vector drawings with fully resolved override tags.
//!
//! ## Features
//!
//! - **Permissive**: malformed content is dropped or defaulted, never rejected
//! - **Cascading tags**: overrides carry forward until `\r`, relative values
//!   resolve against the style
//! - **Animations**: `\t` groups keep only animatable tags with their timing
//! - **Drawings**: path validation and uniform B-spline to Bezier conversion
//! - **Streaming**: incremental session for scripts that grow over time
//!
//! ## Quick Start
//!
//! ```rust
//! use ass_compiler::{compile, CompileOptions};
//!
//! let script_text = r"
//! [Script Info]
//! PlayResX: 1280
//! PlayResY: 720
//!
//! [V4+ Styles]
//! Format: Name, Fontname, Fontsize, PrimaryColour, Alignment
//! Style: Default,Arial,40,&H00FFFFFF,2
//!
//! [Events]
//! Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
//! Dialogue: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,{\pos(640,360)\c&H0000FF&}Hello
//! ";
//!
//! let script = compile(script_text, &CompileOptions::default());
//! let event = &script.dialogues[0];
//! assert_eq!(script.width, Some(1280.0));
//! assert_eq!(event.pos.map(|p| (p.x, p.y)), Some((640.0, 360.0)));
//! assert_eq!(event.slices[0].fragments[0].text, "Hello");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(clippy::all)]
#![deny(unsafe_code)]

pub mod compiler;
pub mod drawing;
pub mod parser;
pub mod tokenizer;
pub mod utils;

#[cfg(feature = "stream")]
#[cfg_attr(docsrs, doc(cfg(feature = "stream")))]
pub mod stream;

pub use compiler::{compile, CompileOptions, CompiledScript, CompiledStyle, DialogueEvent};
pub use drawing::{compile_drawing, CompiledDrawing};
pub use parser::{parse, ParsedScript};
pub use utils::CoreError;

#[cfg(feature = "stream")]
pub use stream::{AssStream, TimeSegments};

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for the crate's fallible helpers, using [`CoreError`]
///
/// # Examples
///
/// ```rust
/// use ass_compiler::{utils::parse_time, Result};
///
/// fn start_of(line: &str) -> Result<f64> {
///     parse_time(line.split(',').next().unwrap_or_default())
/// }
///
/// assert_eq!(start_of("0:00:02.50,0:00:03.00").ok(), Some(2.5));
/// ```
pub type Result<T> = core::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn root_reexports_compile_end_to_end() {
        let script = compile(
            "[Events]\nFormat: Start, End, Text\nDialogue: 0:00:00.00,0:00:01.00,x",
            &CompileOptions::new(),
        );
        assert_eq!(script.dialogues.len(), 1);
        assert_eq!(parse("").events.dialogues.len(), 0);
    }
}

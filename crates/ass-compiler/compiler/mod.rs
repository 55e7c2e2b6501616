//! Script compiler
//!
//! Runs the parser, compiles styles and dialogue rows, and assembles the
//! renderer-facing [`CompiledScript`]. Malformed content never fails the
//! compile; dropped constructs are reported through `tracing` at debug and
//! trace level.
//!
//! # Example
//!
//! ```rust
//! use ass_compiler::compiler::{compile, CompileOptions};
//!
//! let script = compile(
//!     "[Events]\n\
//!      Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
//!      Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello {\\b1}World",
//!     &CompileOptions::default(),
//! );
//!
//! let event = &script.dialogues[0];
//! assert_eq!((event.start, event.end), (1.0, 2.0));
//! assert_eq!(event.slices[0].fragments[1].text, "World");
//! ```

pub mod dialogues;
pub mod styles;
pub mod tags;

pub use dialogues::{
    compile_dialogues, compile_text, CompiledText, DialogueEvent, Fragment, Margin, Slice,
    TextContext,
};
pub use styles::{compile_styles, is_style_field, wrap_style, CompiledStyle, StyleRecord, DEFAULT_STYLE};
pub use tags::{
    compile_tag, Clip, ClipShape, Fade, Movement, Position, ResolvedTags, TagDelta, TagKey,
    TagPresets, TagValue, Transition,
};

use crate::parser::{parse, ScriptInfo};
use crate::utils::{coerce_number, AssHashMap, CoreError};
use crate::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Caller configuration for a compile
///
/// # Example
///
/// ```rust
/// use ass_compiler::compiler::CompileOptions;
///
/// let options = CompileOptions::new()
///     .with_default_field("Fontname", "Noto Sans")?
///     .with_default_field("Fontsize", "36")?;
/// assert_eq!(options.default_style().len(), 2);
/// assert!(CompileOptions::new().with_default_field("Fontface", "x").is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    default_style: Vec<(String, String)>,
}

impl CompileOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override one field of the built-in default style
    ///
    /// The override applies to the implicit `Default` style and is the base
    /// every script style is merged over. `Name` cannot be overridden.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] when `field` is not a style column.
    pub fn with_default_field(mut self, field: &str, value: impl Into<String>) -> Result<Self> {
        if field == "Name" || !is_style_field(field) {
            return Err(CoreError::Config(format!(
                "'{field}' is not an overridable style field"
            )));
        }
        let value = value.into();
        match self.default_style.iter_mut().find(|(name, _)| name == field) {
            Some(entry) => entry.1 = value,
            None => self.default_style.push((field.to_string(), value)),
        }
        Ok(self)
    }

    /// Default style overrides in insertion order
    #[must_use]
    pub fn default_style(&self) -> &[(String, String)] {
        &self.default_style
    }
}

/// Compiled script
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledScript {
    pub info: ScriptInfo,
    /// `PlayResX`, when set to a non-zero number
    pub width: Option<f64>,
    /// `PlayResY`, when set to a non-zero number
    pub height: Option<f64>,
    /// `Collisions`, `Normal` by default
    pub collisions: String,
    pub styles: AssHashMap<String, CompiledStyle>,
    pub dialogues: Vec<DialogueEvent>,
}

impl CompiledScript {
    /// Assemble the output document from compiled parts
    #[must_use]
    pub fn assemble(
        info: ScriptInfo,
        styles: AssHashMap<String, CompiledStyle>,
        dialogues: Vec<DialogueEvent>,
    ) -> Self {
        let resolution = |key: &str| {
            info.get(key)
                .map(coerce_number)
                .filter(|value| *value != 0.0 && !value.is_nan())
        };
        let width = resolution("PlayResX");
        let height = resolution("PlayResY");
        let collisions = info
            .get("Collisions")
            .filter(|value| !value.is_empty())
            .unwrap_or("Normal")
            .to_string();

        Self {
            info,
            width,
            height,
            collisions,
            styles,
            dialogues,
        }
    }
}

/// Compile script text
#[must_use]
#[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
pub fn compile(text: &str, options: &CompileOptions) -> CompiledScript {
    let tree = parse(text);
    let styles = compile_styles(
        &tree.info,
        &tree.styles.format,
        &tree.styles.rows,
        options.default_style(),
    );
    let dialogues = compile_dialogues(&styles, &tree.events.dialogues);
    tracing::debug!(
        styles = styles.len(),
        dialogues = dialogues.len(),
        "script compiled"
    );

    CompiledScript::assemble(tree.info, styles, dialogues)
}

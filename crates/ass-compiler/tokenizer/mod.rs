//! Lexical splitting of dialogue text
//!
//! Dialogue text mixes plain text with `{...}` override blocks, override
//! blocks hold backslash-separated tags, and drawing mode text holds vector
//! commands. This module only splits; interpretation happens in
//! [`crate::parser`] and [`crate::drawing`].
//!
//! # Example
//!
//! ```rust
//! use ass_compiler::tokenizer::{split_override_blocks, split_tags};
//!
//! let split = split_override_blocks("Hello {\\b1\\t(\\c&HFF&)}World");
//! assert_eq!(split.leading, "Hello ");
//! assert_eq!(split.blocks[0].1, "World");
//!
//! let tags = split_tags(split.blocks[0].0);
//! assert_eq!(tags, vec!["b1", "t(\\c&HFF&)"]);
//! ```

pub mod drawing;
pub mod override_block;

pub use drawing::{tokenize_drawing, RawDrawingCommand};
pub use override_block::{split_override_blocks, split_tags, OverrideSplit};

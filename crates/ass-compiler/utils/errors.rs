//! Core error type for the compiler's fallible helpers
//!
//! Subtitle content is never rejected: public entry points always produce
//! output. The helpers that interpret individual fields (times, colors,
//! numbers) still report what went wrong through `CoreError` so that callers
//! can log it before substituting the documented default.
//!
//! # Error Philosophy
//!
//! - Use `thiserror` for structured error handling (no `anyhow` bloat)
//! - Keep the offending input in the message for debugging
//! - Content errors are recovered from at the compile layer; only `Config`
//!   reaches the caller

use core::fmt;
use thiserror::Error;

/// Main error type for ASS compiler helpers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Script-level structure that cannot be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Color format parsing errors
    #[error("Invalid color format: {0}")]
    InvalidColor(String),

    /// Numeric value parsing errors
    #[error("Invalid numeric value: {0}")]
    InvalidNumeric(String),

    /// Time format parsing errors
    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Create parse error from message
    pub fn parse<T: fmt::Display>(message: T) -> Self {
        Self::Parse(message.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = core::result::Result<T, CoreError>;

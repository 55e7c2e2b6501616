//! Utility functions and shared types for the ASS compiler
//!
//! Contains the permissive field interpreters shared by the parser and the
//! compiler: numeric coercion, time parsing, number formatting for path
//! serialization, plus the color parser and hashing helpers.
//!
//! # Example
//!
//! ```rust
//! use ass_compiler::utils::{coerce_number, parse_time};
//!
//! assert_eq!(coerce_number(" 12.5 "), 12.5);
//! assert!(coerce_number("abc").is_nan());
//! assert_eq!(parse_time("0:01:30.50")?, 90.5);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use core::fmt::Write;

pub mod color;
pub mod errors;
#[cfg(feature = "serde")]
pub mod float;
pub mod hashers;

pub use color::{parse_style_color, ColorPair};
pub use errors::CoreError;
pub use hashers::{create_hash_map_with_capacity, AssHashMap};

/// Parse a numeric field the way subtitle authoring tools read them
///
/// Surrounding whitespace is ignored and an empty field reads as `0`.
/// Accepts decimal and exponent notation, an explicit sign, `0x` hex
/// integers and the literal `Infinity`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidNumeric`] when the text is not a number.
pub fn parse_number(text: &str) -> Result<f64, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Ok(f64::INFINITY),
        "-Infinity" => return Ok(f64::NEG_INFINITY),
        _ => {}
    }

    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .map(|value| value as f64)
            .map_err(|_| CoreError::InvalidNumeric(format!("Invalid hex number: {text}")));
    }

    let plain = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !plain {
        return Err(CoreError::InvalidNumeric(format!("Not a number: {text}")));
    }

    trimmed
        .parse::<f64>()
        .map_err(|e| CoreError::InvalidNumeric(format!("Failed to parse '{text}': {e}")))
}

/// Coerce a field to a number, yielding `NaN` when it is not one
///
/// Used where the compiled output keeps the invalid value visible instead of
/// substituting a default (for example `\b` with a garbage argument).
#[must_use]
pub fn coerce_number(text: &str) -> f64 {
    parse_number(text).unwrap_or(f64::NAN)
}

/// Return `value` unless it is zero or `NaN`, in which case return `fallback`
#[must_use]
pub fn nonzero_or(value: f64, fallback: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        fallback
    } else {
        value
    }
}

/// Parse ASS time format (H:MM:SS.CC) to seconds
///
/// Each component is read as a plain number, so `0:00:01.5`, `0:0:1` and
/// `1:30:00.123` are all accepted. Components after the third are ignored.
///
/// # Example
///
/// ```rust
/// # use ass_compiler::utils::parse_time;
/// assert_eq!(parse_time("0:00:01.00")?, 1.0);
/// assert_eq!(parse_time("1:00:00.00")?, 3600.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns [`CoreError::InvalidTime`] when there are fewer than three
/// components or a component is not numeric.
pub fn parse_time(time_str: &str) -> Result<f64, CoreError> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() < 3 {
        return Err(CoreError::InvalidTime(format!(
            "Invalid time format: {time_str}"
        )));
    }

    let component = |part: &str| {
        parse_number(part)
            .map_err(|_| CoreError::InvalidTime(format!("Invalid component '{part}' in {time_str}")))
    };

    let seconds = component(parts[0])? * 3600.0 + component(parts[1])? * 60.0 + component(parts[2])?;
    if seconds.is_finite() {
        Ok(seconds)
    } else {
        Err(CoreError::InvalidTime(format!("Time out of range: {time_str}")))
    }
}

/// Append a coordinate for serialized drawing paths
///
/// Uses the shortest representation that round-trips (`1`, `0.5`,
/// `0.3333333333333333`), with `-0` written as `0`. Magnitudes of `1e21` and
/// above or below `1e-6` switch to exponent form with an explicit exponent
/// sign (`1e+21`, `1.5e-7`).
pub fn write_number(out: &mut String, value: f64) {
    if value.is_nan() {
        out.push_str("NaN");
    } else if value.is_infinite() {
        out.push_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
    } else if value == 0.0 {
        out.push('0');
    } else if (1e-6..1e21).contains(&value.abs()) {
        let _ = write!(out, "{value}");
    } else {
        let exponent = format!("{value:e}");
        match exponent.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                let _ = write!(out, "{mantissa}e+{power}");
            }
            _ => out.push_str(&exponent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_accepts_script_forms() {
        assert_eq!(parse_number("42").unwrap(), 42.0);
        assert_eq!(parse_number(" -1.5 ").unwrap(), -1.5);
        assert_eq!(parse_number("+3").unwrap(), 3.0);
        assert_eq!(parse_number(".5").unwrap(), 0.5);
        assert_eq!(parse_number("2.").unwrap(), 2.0);
        assert_eq!(parse_number("1e3").unwrap(), 1000.0);
        assert_eq!(parse_number("0x10").unwrap(), 16.0);
        assert_eq!(parse_number("").unwrap(), 0.0);
    }

    #[test]
    fn parse_number_rejects_words() {
        assert!(parse_number("abc").is_err());
        assert!(parse_number("inf").is_err());
        assert!(parse_number("nan").is_err());
        assert!(parse_number("1,2").is_err());
        assert!(coerce_number("12px").is_nan());
    }

    #[test]
    fn nonzero_or_follows_truthiness() {
        assert_eq!(nonzero_or(5.0, 10.0), 5.0);
        assert_eq!(nonzero_or(0.0, 10.0), 10.0);
        assert_eq!(nonzero_or(f64::NAN, 10.0), 10.0);
    }

    #[test]
    fn parse_time_valid() {
        assert_eq!(parse_time("0:00:00.00").unwrap(), 0.0);
        assert_eq!(parse_time("0:01:30.50").unwrap(), 90.5);
        assert_eq!(parse_time("1:02:03.50").unwrap(), 3723.5);
    }

    #[test]
    fn parse_time_invalid() {
        assert!(parse_time("01:30").is_err());
        assert!(parse_time("a:b:c").is_err());
        assert!(parse_time("").is_err());
    }

    fn formatted(value: f64) -> String {
        let mut out = String::new();
        write_number(&mut out, value);
        out
    }

    #[test]
    fn write_number_matches_path_syntax() {
        assert_eq!(formatted(1.0), "1");
        assert_eq!(formatted(-2.5), "-2.5");
        assert_eq!(formatted(-0.0), "0");
        assert_eq!(formatted(1.0 / 3.0), "0.3333333333333333");
        assert_eq!(formatted(f64::NAN), "NaN");
    }

    #[test]
    fn write_number_uses_exponent_at_extremes() {
        assert_eq!(formatted(1e21), "1e+21");
        assert_eq!(formatted(-1.5e22), "-1.5e+22");
        assert_eq!(formatted(1e-7), "1e-7");
        assert_eq!(formatted(1e20), "100000000000000000000");
        assert_eq!(formatted(0.000001), "0.000001");
    }
}

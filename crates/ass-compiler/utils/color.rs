//! Style color parsing
//!
//! Style rows store colors either as `&HAABBGGRR&` hex strings or, in files
//! written by some older tools, as signed 32-bit decimal integers holding the
//! same `AABBGGRR` bits. Both forms are normalized to an alpha byte and a
//! `BBGGRR` triple, each as upper-case hex text.

use super::CoreError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Alpha and color channels of a parsed style color
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorPair {
    /// Two hex digits, `00` is opaque
    pub alpha: String,
    /// Six hex digits in `BBGGRR` order
    pub color: String,
}

impl ColorPair {
    /// Opaque black, the fallback for unreadable colors
    #[must_use]
    pub fn opaque_black() -> Self {
        Self {
            alpha: "00".to_string(),
            color: "000000".to_string(),
        }
    }
}

/// Parse a style color field
///
/// # Example
///
/// ```rust
/// # use ass_compiler::utils::parse_style_color;
/// let hex = parse_style_color("&H000000FF&")?;
/// let dec = parse_style_color("255")?;
/// assert_eq!(hex, dec);
/// assert_eq!(hex.color, "0000FF");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns [`CoreError::InvalidColor`] when the field is neither hex nor a
/// decimal integer, or when the decimal value does not fit in 32 signed bits.
pub fn parse_style_color(text: &str) -> Result<ColorPair, CoreError> {
    let trimmed = text.trim();

    if let Some(pair) = parse_hex_color(trimmed) {
        return Ok(pair);
    }

    let value = parse_leading_integer(trimmed)
        .ok_or_else(|| CoreError::InvalidColor(format!("Unrecognized color: {text}")))?;
    let value = i32::try_from(value)
        .map_err(|_| CoreError::InvalidColor(format!("Color out of 32-bit range: {text}")))?;

    // Two's complement reinterpretation of the signed field
    let aabbggrr = format!("{:08X}", value as u32);
    Ok(ColorPair {
        alpha: aabbggrr[..2].to_string(),
        color: aabbggrr[2..].to_string(),
    })
}

/// `&H`, `H` or `&` prefix followed by at least six hex digits
fn parse_hex_color(text: &str) -> Option<ColorPair> {
    let digits = ["&H", "&h", "H", "h", "&"]
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))?;

    let hex_len = digits.bytes().take_while(u8::is_ascii_hexdigit).count();
    if hex_len < 6 {
        return None;
    }

    let (alpha, color) = if hex_len >= 8 {
        (&digits[..2], &digits[2..8])
    } else {
        ("00", &digits[..6])
    };

    Some(ColorPair {
        alpha: alpha.to_ascii_uppercase(),
        color: color.to_ascii_uppercase(),
    })
}

/// Leading `[+-]?\d+` of the text, ignoring anything after the digits
fn parse_leading_integer(text: &str) -> Option<i64> {
    let unsigned = text.trim_start_matches(['+', '-']);
    let sign_len = text.len() - unsigned.len();
    if sign_len > 1 {
        return None;
    }

    let digit_len = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digit_len == 0 {
        return None;
    }

    let end = sign_len + digit_len;
    // Values too long for i64 are out of the 32-bit range anyway
    Some(text[..end].parse::<i64>().unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(alpha: &str, color: &str) -> ColorPair {
        ColorPair {
            alpha: alpha.to_string(),
            color: color.to_string(),
        }
    }

    #[test]
    fn hex_with_alpha() {
        assert_eq!(parse_style_color("&H80FF00FF&").unwrap(), pair("80", "FF00FF"));
        assert_eq!(parse_style_color("&h80ff00ff").unwrap(), pair("80", "FF00FF"));
    }

    #[test]
    fn hex_without_alpha() {
        assert_eq!(parse_style_color("&H0000FF&").unwrap(), pair("00", "0000FF"));
        assert_eq!(parse_style_color("H00FF00").unwrap(), pair("00", "00FF00"));
        // seven digits cannot hold an alpha byte
        assert_eq!(parse_style_color("&H1234567").unwrap(), pair("00", "123456"));
    }

    #[test]
    fn decimal_forms() {
        assert_eq!(parse_style_color("255").unwrap(), pair("00", "0000FF"));
        assert_eq!(parse_style_color("16777215").unwrap(), pair("00", "FFFFFF"));
        assert_eq!(parse_style_color("-1").unwrap(), pair("FF", "FFFFFF"));
        assert_eq!(
            parse_style_color("-2147483648").unwrap(),
            pair("80", "000000")
        );
    }

    #[test]
    fn hex_and_decimal_agree() {
        assert_eq!(
            parse_style_color("&H0000FF&").unwrap(),
            parse_style_color("255").unwrap()
        );
    }

    #[test]
    fn out_of_range_and_garbage_fail() {
        assert!(parse_style_color("2147483648").is_err());
        assert!(parse_style_color("-2147483649").is_err());
        assert!(parse_style_color("99999999999999999999999").is_err());
        assert!(parse_style_color("white").is_err());
        assert!(parse_style_color("&HFFF").is_err());
    }
}

//! Drawing command tokenizer
//!
//! Drawing text is case-insensitive and whitespace-insensitive:
//! `m0 0l10,0 10 10` and `M 0 0 L 10 0 10 10` tokenize identically.
//! Numbers and the command letters `m n l b s p c` are split apart, every
//! command letter starts a new group, and anything else that is not a
//! number is discarded.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Command letters recognized by the tokenizer
const COMMAND_LETTERS: &[u8] = b"mnlbspc";

/// One command group: the leading token and the numbers that follow it
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RawDrawingCommand {
    /// First token of the group, normally a single command letter
    pub code: String,
    /// Numeric arguments in source order
    pub coords: Vec<f64>,
}

impl RawDrawingCommand {
    /// Coordinate pairs of the group, ignoring an unpaired trailing value
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.coords.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }
}

#[derive(Debug, Clone, Copy)]
enum Lexeme<'a> {
    Command(u8),
    Number(&'a str),
    Other(&'a str),
}

/// Tokenize drawing text into command groups
///
/// # Example
///
/// ```rust
/// use ass_compiler::tokenizer::tokenize_drawing;
///
/// let commands = tokenize_drawing("M 0 0 L10,0 10 10");
/// assert_eq!(commands.len(), 2);
/// assert_eq!(commands[1].code, "l");
/// assert_eq!(commands[1].coords, vec![10.0, 0.0, 10.0, 10.0]);
/// ```
#[must_use]
pub fn tokenize_drawing(text: &str) -> Vec<RawDrawingCommand> {
    let lowered = text.to_lowercase();
    let mut commands: Vec<RawDrawingCommand> = Vec::new();

    for lexeme in lex(&lowered) {
        let token = match lexeme {
            Lexeme::Command(letter) => {
                commands.push(RawDrawingCommand {
                    code: char::from(letter).to_string(),
                    coords: Vec::new(),
                });
                continue;
            }
            Lexeme::Number(token) | Lexeme::Other(token) => token,
        };

        match commands.last_mut() {
            Some(command) => {
                if let (Lexeme::Number(_), Ok(value)) = (lexeme, token.parse::<f64>()) {
                    command.coords.push(value);
                }
            }
            // Text before the first command letter still opens a group
            None => commands.push(RawDrawingCommand {
                code: token.to_string(),
                coords: Vec::new(),
            }),
        }
    }

    commands
}

fn lex<'t>(text: &'t str) -> Vec<Lexeme<'t>> {
    let bytes = text.as_bytes();
    let mut lexemes = Vec::new();
    let mut other_start: Option<usize> = None;
    let mut pos = 0;

    let flush = |lexemes: &mut Vec<Lexeme<'t>>, start: &mut Option<usize>, end: usize| {
        if let Some(begin) = start.take() {
            lexemes.push(Lexeme::Other(&text[begin..end]));
        }
    };

    while pos < bytes.len() {
        let byte = bytes[pos];
        if byte.is_ascii_whitespace() {
            flush(&mut lexemes, &mut other_start, pos);
            pos += 1;
        } else if COMMAND_LETTERS.contains(&byte) {
            flush(&mut lexemes, &mut other_start, pos);
            lexemes.push(Lexeme::Command(byte));
            pos += 1;
        } else {
            let len = number_len(&bytes[pos..]);
            if len > 0 {
                flush(&mut lexemes, &mut other_start, pos);
                lexemes.push(Lexeme::Number(&text[pos..pos + len]));
                pos += len;
            } else {
                other_start.get_or_insert(pos);
                pos += 1;
            }
        }
    }
    flush(&mut lexemes, &mut other_start, bytes.len());

    lexemes
}

/// Length of `[+-]?(\d+(\.\d*)?|\.\d+)(e[+-]?\d+)?` at the start of `bytes`
fn number_len(bytes: &[u8]) -> usize {
    let digits_from = |start: usize| {
        bytes
            .get(start..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits_from(end);
    end += int_digits;

    if bytes.get(end) == Some(&b'.') {
        let frac_digits = digits_from(end + 1);
        if int_digits == 0 && frac_digits == 0 {
            return 0;
        }
        end += 1 + frac_digits;
    } else if int_digits == 0 {
        return 0;
    }

    if bytes.get(end) == Some(&b'e') {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_digits = digits_from(exp_start);
        if exp_digits > 0 {
            end = exp_start + exp_digits;
        }
    }

    end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(commands: &[RawDrawingCommand]) -> Vec<&str> {
        commands.iter().map(|c| c.code.as_str()).collect()
    }

    #[test]
    fn splits_commands_and_numbers() {
        let commands = tokenize_drawing("m 0 0 l 100 0 100 100 0 100");
        assert_eq!(codes(&commands), vec!["m", "l"]);
        assert_eq!(commands[0].coords, vec![0.0, 0.0]);
        assert_eq!(commands[1].coords.len(), 6);
    }

    #[test]
    fn glued_and_uppercase_input() {
        let commands = tokenize_drawing("M0,0L-5.5,1e1B1 2 3 4 5 6");
        assert_eq!(codes(&commands), vec!["m", "l", "b"]);
        assert_eq!(commands[1].coords, vec![-5.5, 10.0]);
        assert_eq!(commands[2].coords, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn garbage_after_command_is_dropped() {
        let commands = tokenize_drawing("m 1 x 2 . 3");
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].coords, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn leading_numbers_form_their_own_group() {
        let commands = tokenize_drawing("5 6 m 1 1");
        assert_eq!(codes(&commands), vec!["5", "m"]);
        assert_eq!(commands[0].coords, vec![6.0]);
    }

    #[test]
    fn empty_input_has_no_groups() {
        assert!(tokenize_drawing("").is_empty());
        assert!(tokenize_drawing("   ").is_empty());
    }

    #[test]
    fn number_grammar() {
        assert_eq!(number_len(b"12.5e-3x"), 7);
        assert_eq!(number_len(b".5"), 2);
        assert_eq!(number_len(b"5."), 2);
        assert_eq!(number_len(b"-"), 0);
        assert_eq!(number_len(b"."), 0);
        assert_eq!(number_len(b"1e"), 1);
    }

    #[test]
    fn odd_coordinate_is_not_a_point() {
        let commands = tokenize_drawing("l 1 2 3");
        assert_eq!(commands[0].points().collect::<Vec<_>>(), vec![(1.0, 2.0)]);
    }

    #[test]
    fn unknown_runs_borrow_from_input() {
        let text = String::from("qr 5 xy");
        let lexemes = lex(&text);
        assert_eq!(lexemes.len(), 3);
        assert!(matches!(lexemes[0], Lexeme::Other("qr")));
        assert!(matches!(lexemes[1], Lexeme::Number("5")));
        assert!(matches!(lexemes[2], Lexeme::Other("xy")));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn commands_serialize_with_code_and_coords() {
        let commands = tokenize_drawing("m 1 2");
        let json = serde_json::to_value(&commands).unwrap();
        assert_eq!(json, serde_json::json!([{ "code": "m", "coords": [1.0, 2.0] }]));
        let back: Vec<RawDrawingCommand> = serde_json::from_value(json).unwrap();
        assert_eq!(back, commands);
    }
}

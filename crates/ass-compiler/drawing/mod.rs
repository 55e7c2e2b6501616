//! Vector drawing compiler
//!
//! Turns tokenized drawing commands (`\p` text and `\clip` drawings) into a
//! flat list of move, line and cubic Bézier instructions. Invalid commands
//! are dropped, uniform splines are converted to Bézier segments, and the
//! result carries its bounding box plus an SVG-like path string.
//!
//! # Example
//!
//! ```rust
//! use ass_compiler::drawing::{compile_drawing, DrawingKind};
//! use ass_compiler::tokenizer::tokenize_drawing;
//!
//! let drawing = compile_drawing(&tokenize_drawing("m 0 0 l 100 0 100 50"));
//! assert_eq!(drawing.instructions[0].kind, DrawingKind::Move);
//! assert_eq!(drawing.d, "M0,0L100,0,100,50");
//! assert_eq!((drawing.width, drawing.height), (100.0, 50.0));
//! ```

mod spline;

use crate::tokenizer::RawDrawingCommand;
use crate::utils::write_number;

#[cfg(feature = "serde")]
use crate::utils::float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A drawing coordinate
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub x: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub y: f64,
}

/// Instruction kinds of a compiled drawing
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawingKind {
    #[cfg_attr(feature = "serde", serde(rename = "M"))]
    Move,
    #[cfg_attr(feature = "serde", serde(rename = "L"))]
    Line,
    #[cfg_attr(feature = "serde", serde(rename = "C"))]
    Cubic,
}

impl DrawingKind {
    /// Path letter used in [`CompiledDrawing::d`]
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Move => 'M',
            Self::Line => 'L',
            Self::Cubic => 'C',
        }
    }
}

/// One compiled instruction with its points
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingInstruction {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: DrawingKind,
    pub points: Vec<Point>,
}

/// Compiled drawing path
///
/// The bounding box covers the control points of every accepted command,
/// spline control points included. An empty drawing has an inverted box
/// (`min_x` is `+inf`, `width` is `-inf`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDrawing {
    pub instructions: Vec<DrawingInstruction>,
    /// Path string, e.g. `M0,0L10,0,10,10`
    pub d: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::infinity_if_null"))]
    pub min_x: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::infinity_if_null"))]
    pub min_y: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::neg_infinity_if_null"))]
    pub width: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::neg_infinity_if_null"))]
    pub height: f64,
}

impl CompiledDrawing {
    /// Whether no command survived validation
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Command kinds before spline expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Move,
    Line,
    Cubic,
    Spline,
}

impl CommandKind {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "m" => Some(Self::Move),
            "n" | "l" => Some(Self::Line),
            "b" => Some(Self::Cubic),
            "s" => Some(Self::Spline),
            _ => None,
        }
    }

    const fn compiled(self) -> DrawingKind {
        match self {
            Self::Move => DrawingKind::Move,
            Self::Line => DrawingKind::Line,
            Self::Cubic | Self::Spline => DrawingKind::Cubic,
        }
    }
}

#[derive(Debug, Clone)]
struct PathCommand {
    kind: CommandKind,
    points: Vec<Point>,
    prev: Option<CommandKind>,
    next: Option<CommandKind>,
}

/// Compile tokenized drawing commands
#[must_use]
pub fn compile_drawing(raw: &[RawDrawingCommand]) -> CompiledDrawing {
    let commands = validate(raw);

    let mut instructions = Vec::with_capacity(commands.len());
    for command in &commands {
        if command.kind == CommandKind::Spline {
            let lead_in_moves = matches!(command.prev, None | Some(CommandKind::Move));
            let close_gap = matches!(command.next, Some(CommandKind::Line | CommandKind::Cubic));
            instructions.extend(spline::spline_to_bezier(
                &command.points,
                lead_in_moves,
                close_gap,
            ));
        } else {
            instructions.push(DrawingInstruction {
                kind: command.kind.compiled(),
                points: command.points.clone(),
            });
        }
    }

    let (min_x, min_y, width, height) = bounding_box(&commands);
    CompiledDrawing {
        d: to_path(&instructions),
        instructions,
        min_x,
        min_y,
        width,
        height,
    }
}

/// Drop invalid commands and link neighbours
///
/// A spline borrows the previous command's final point as its first control
/// point. Coordinates of an invalid command directly after a spline extend
/// it: a `p` group appends its own points, a `c` group repeats the spline's
/// first three points to close it.
fn validate(raw: &[RawDrawingCommand]) -> Vec<PathCommand> {
    let mut commands: Vec<PathCommand> = Vec::with_capacity(raw.len());

    for group in raw {
        let mut points: Vec<Point> = group.points().map(|(x, y)| Point { x, y }).collect();
        let kind = CommandKind::from_code(&group.code);

        let valid = match kind {
            None => false,
            Some(CommandKind::Cubic | CommandKind::Spline) => points.len() >= 3,
            Some(_) => !points.is_empty(),
        };

        let Some(kind) = kind.filter(|_| valid) else {
            if let Some(spline) = commands
                .last_mut()
                .filter(|last| last.kind == CommandKind::Spline)
            {
                match group.code.as_str() {
                    "p" => spline.points.append(&mut points),
                    "c" => {
                        let head: Vec<Point> = spline.points.iter().take(3).copied().collect();
                        spline.points.extend(head);
                    }
                    _ => {}
                }
            }
            tracing::trace!(code = %group.code, points = points.len(), "drawing command dropped");
            continue;
        };

        if kind == CommandKind::Spline {
            let carried = commands
                .last()
                .and_then(|last| last.points.last().copied())
                .unwrap_or_default();
            points.insert(0, carried);
        }

        let prev = commands.last_mut().map(|last| {
            last.next = Some(kind);
            last.kind
        });

        commands.push(PathCommand {
            kind,
            points,
            prev,
            next: None,
        });
    }

    commands
}

fn bounding_box(commands: &[PathCommand]) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for point in commands.iter().flat_map(|c| &c.points) {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    (min_x, min_y, max_x - min_x, max_y - min_y)
}

fn to_path(instructions: &[DrawingInstruction]) -> String {
    let mut path = String::new();
    for instruction in instructions {
        path.push(instruction.kind.code());
        for (index, point) in instruction.points.iter().enumerate() {
            if index > 0 {
                path.push(',');
            }
            write_number(&mut path, point.x);
            path.push(',');
            write_number(&mut path, point.y);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize_drawing;
    use pretty_assertions::assert_eq;

    fn compile(text: &str) -> CompiledDrawing {
        compile_drawing(&tokenize_drawing(text))
    }

    fn kinds(drawing: &CompiledDrawing) -> Vec<DrawingKind> {
        drawing.instructions.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn lines_and_curves() {
        let drawing = compile("m 0 0 n 10 0 b 10 10 0 10 0 0");
        assert_eq!(
            kinds(&drawing),
            vec![DrawingKind::Move, DrawingKind::Line, DrawingKind::Cubic]
        );
        assert_eq!(drawing.d, "M0,0L10,0C10,10,0,10,0,0");
        assert_eq!((drawing.min_x, drawing.min_y), (0.0, 0.0));
        assert_eq!((drawing.width, drawing.height), (10.0, 10.0));
    }

    #[test]
    fn invalid_commands_are_dropped() {
        // too few points for a curve, no points at all, unknown code
        let drawing = compile("m 0 0 b 1 1 2 2 l m 5 5");
        assert_eq!(kinds(&drawing), vec![DrawingKind::Move, DrawingKind::Move]);
        assert_eq!(drawing.d, "M0,0M5,5");
    }

    #[test]
    fn spline_with_two_literal_points_is_invalid() {
        let drawing = compile("m 0 0 s 1 1 2 2");
        assert_eq!(kinds(&drawing), vec![DrawingKind::Move]);
    }

    #[test]
    fn spline_with_four_effective_points() {
        // carried (0,0) plus three literal points
        let drawing = compile("m 0 0 s 6 0 6 6 0 6");
        assert_eq!(
            kinds(&drawing),
            vec![DrawingKind::Move, DrawingKind::Move, DrawingKind::Cubic]
        );
    }

    #[test]
    fn spline_after_line_leads_in_with_line() {
        let drawing = compile("m 0 0 l 1 1 s 2 2 3 3 4 4 l 0 0");
        assert_eq!(
            kinds(&drawing),
            vec![
                DrawingKind::Move,
                DrawingKind::Line,
                DrawingKind::Line,
                DrawingKind::Cubic,
                DrawingKind::Line,
                DrawingKind::Line,
            ]
        );
        assert_eq!(drawing.instructions[4].points, vec![Point { x: 4.0, y: 4.0 }]);
    }

    #[test]
    fn p_extends_and_c_closes_spline() {
        use DrawingKind::{Cubic, Move};

        let extended = compile("m 0 0 s 1 0 1 1 0 1 p 0 2 1 2");
        // 4 + 2 control points: move, lead-in, three cubic windows
        assert_eq!(extended.instructions.len(), 5);
        assert_eq!(kinds(&extended), vec![Move, Move, Cubic, Cubic, Cubic]);

        let closed = compile("m 0 0 s 1 0 1 1 0 1 c");
        // 4 + 3 control points: move, lead-in, four cubic windows
        assert_eq!(closed.instructions.len(), 6);
        assert_eq!(kinds(&closed), vec![Move, Move, Cubic, Cubic, Cubic, Cubic]);
    }

    #[test]
    fn spline_first_in_path_starts_at_origin() {
        let drawing = compile("s 6 0 6 6 0 6");
        assert_eq!(drawing.instructions[0].kind, DrawingKind::Move);
        assert_eq!((drawing.min_x, drawing.min_y), (0.0, 0.0));
    }

    #[test]
    fn empty_drawing() {
        let drawing = compile("");
        assert!(drawing.is_empty());
        assert!(drawing.d.is_empty());
        assert_eq!(drawing.min_x, f64::INFINITY);
        assert_eq!(drawing.width, f64::NEG_INFINITY);
    }

    #[test]
    fn fractional_coordinates_in_path() {
        let drawing = compile("m -0.5 .25 l 1e1 -0");
        assert_eq!(drawing.d, "M-0.5,0.25L10,0");
    }
}

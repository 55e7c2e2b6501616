//! Uniform B-spline to cubic Bézier conversion
//!
//! A `s` command describes a uniform cubic B-spline through its control
//! points. Every window of four consecutive points becomes one Bézier
//! segment, using the standard basis change below.

use super::{DrawingInstruction, DrawingKind, Point};

const B1: [f64; 4] = [0.0, 2.0 / 3.0, 1.0 / 3.0, 0.0];
const B2: [f64; 4] = [0.0, 1.0 / 3.0, 2.0 / 3.0, 0.0];
const B3: [f64; 4] = [0.0, 1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0];

fn blend(weights: [f64; 4], window: [Point; 4]) -> Point {
    let dot = |coord: fn(&Point) -> f64| {
        weights
            .iter()
            .zip(&window)
            .map(|(w, p)| w * coord(p))
            .sum::<f64>()
    };
    Point {
        x: dot(|p| p.x),
        y: dot(|p| p.y),
    }
}

/// Expand spline control points into drawing instructions
///
/// `points` must hold at least three points; the caller guarantees this by
/// dropping shorter splines. `lead_in_moves` selects whether the first
/// emitted point starts a new contour or connects to the current one, and
/// `close_gap` appends a line back to the final control point so a following
/// line or curve starts where the author placed it.
pub(super) fn spline_to_bezier(
    points: &[Point],
    lead_in_moves: bool,
    close_gap: bool,
) -> Vec<DrawingInstruction> {
    let (Some(&last), [p0, p1, p2, ..]) = (points.last(), points) else {
        return Vec::new();
    };

    let mut instructions = Vec::with_capacity(points.len());
    instructions.push(DrawingInstruction {
        kind: if lead_in_moves {
            DrawingKind::Move
        } else {
            DrawingKind::Line
        },
        points: vec![blend(B3, [last, *p0, *p1, *p2])],
    });

    for window in points.windows(4) {
        let window = [window[0], window[1], window[2], window[3]];
        instructions.push(DrawingInstruction {
            kind: DrawingKind::Cubic,
            points: vec![blend(B1, window), blend(B2, window), blend(B3, window)],
        });
    }

    if close_gap {
        instructions.push(DrawingInstruction {
            kind: DrawingKind::Line,
            points: vec![last],
        });
    }

    instructions
}

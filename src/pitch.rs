//! StatsBomb pitch geometry in canvas space.
//!
//! Source data puts the origin top-left with y growing downwards; the
//! terminal canvas grows upwards, so every y goes through [`to_canvas`].

use crate::aggregate::{PassVector, ShotMarker};
use crate::model::Location;

pub const PITCH_LENGTH: f64 = 120.0;
pub const PITCH_WIDTH: f64 = 80.0;

const PENALTY_BOX_DEPTH: f64 = 18.0;
const PENALTY_BOX_TOP: f64 = 18.0;
const PENALTY_BOX_BOTTOM: f64 = 62.0;
const SIX_YARD_DEPTH: f64 = 6.0;
const SIX_YARD_TOP: f64 = 30.0;
const SIX_YARD_BOTTOM: f64 = 50.0;
const GOAL_TOP: f64 = 36.0;
const GOAL_BOTTOM: f64 = 44.0;
const GOAL_DEPTH: f64 = 2.0;
pub const CENTRE_CIRCLE_RADIUS: f64 = 10.0;
const PENALTY_SPOT: f64 = 12.0;

const SHOT_BASE_RADIUS: f64 = 4.0;
const SHOT_XG_SCALE: f64 = 5.0;
const LABEL_OFFSET: f64 = 1.0;
const ARROW_HEAD_LENGTH: f64 = 2.5;
const ARROW_HEAD_SPREAD: f64 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Segment {
    fn source(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1,
            y1: to_canvas(y1),
            x2,
            y2: to_canvas(y2),
        }
    }
}

pub fn to_canvas(y: f64) -> f64 {
    PITCH_WIDTH - y
}

pub fn canvas_point(location: Location) -> (f64, f64) {
    (location.x, to_canvas(location.y))
}

fn rect(x1: f64, y1: f64, x2: f64, y2: f64, out: &mut Vec<Segment>) {
    out.push(Segment::source(x1, y1, x2, y1));
    out.push(Segment::source(x2, y1, x2, y2));
    out.push(Segment::source(x2, y2, x1, y2));
    out.push(Segment::source(x1, y2, x1, y1));
}

/// Straight pitch markings: touchlines, halfway line, boxes and goals.
pub fn pitch_markings() -> Vec<Segment> {
    let mut lines = Vec::with_capacity(32);
    rect(0.0, 0.0, PITCH_LENGTH, PITCH_WIDTH, &mut lines);
    lines.push(Segment::source(
        PITCH_LENGTH / 2.0,
        0.0,
        PITCH_LENGTH / 2.0,
        PITCH_WIDTH,
    ));

    for (goal_line, inward) in [(0.0, 1.0), (PITCH_LENGTH, -1.0)] {
        rect(
            goal_line,
            PENALTY_BOX_TOP,
            goal_line + inward * PENALTY_BOX_DEPTH,
            PENALTY_BOX_BOTTOM,
            &mut lines,
        );
        rect(
            goal_line,
            SIX_YARD_TOP,
            goal_line + inward * SIX_YARD_DEPTH,
            SIX_YARD_BOTTOM,
            &mut lines,
        );
        rect(
            goal_line,
            GOAL_TOP,
            goal_line - inward * GOAL_DEPTH,
            GOAL_BOTTOM,
            &mut lines,
        );
    }
    lines
}

/// Centre spot and both penalty spots, canvas space.
pub fn pitch_spots() -> [(f64, f64); 3] {
    let mid = to_canvas(PITCH_WIDTH / 2.0);
    [
        (PITCH_LENGTH / 2.0, mid),
        (PENALTY_SPOT, mid),
        (PITCH_LENGTH - PENALTY_SPOT, mid),
    ]
}

/// Main shaft plus the two head strokes of a pass arrow, canvas space.
pub fn arrow_segments(pass: &PassVector) -> [Segment; 3] {
    let shaft = Segment::source(pass.start.x, pass.start.y, pass.end.x, pass.end.y);
    let dx = shaft.x2 - shaft.x1;
    let dy = shaft.y2 - shaft.y1;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f64::EPSILON {
        return [shaft; 3];
    }
    let (ux, uy) = (dx / len, dy / len);
    let head = ARROW_HEAD_LENGTH.min(len / 2.0);
    let barb = |sign: f64| {
        let (sin, cos) = (sign * ARROW_HEAD_SPREAD).sin_cos();
        let bx = -(ux * cos - uy * sin);
        let by = -(ux * sin + uy * cos);
        Segment {
            x1: shaft.x2,
            y1: shaft.y2,
            x2: shaft.x2 + bx * head,
            y2: shaft.y2 + by * head,
        }
    };
    [shaft, barb(1.0), barb(-1.0)]
}

/// Marker radius in pitch units: grows linearly with xG.
pub fn shot_radius(xg: f64) -> f64 {
    SHOT_BASE_RADIUS + xg.clamp(0.0, 1.0) * SHOT_XG_SCALE
}

/// Canvas position of the xG label next to a shot marker.
pub fn shot_label_position(shot: &ShotMarker) -> (f64, f64) {
    let (x, y) = canvas_point(shot.location);
    (x + LABEL_OFFSET, y - LABEL_OFFSET)
}

//! SVG path interpreter.
//!
//! Walks tokenized path commands and produces geometric segments in the
//! path's local coordinate space. Maintains the current point, the subpath
//! start, and the reflected control point used by the smooth curve commands
//! (`S`/`T`); converts endpoint-parameterized `A` arcs to center
//! parameterization, preserving them as circular [`ArcSegment`]s when the
//! radii are equal and sampling them as polylines otherwise.

use plotkit_core::{ArcSegment, CurveSegment, Point, Segment};
use tracing::debug;

use crate::tokenizer::{PathToken, tokenize_path};

/// Below this distance a `Z` close command emits no extra line.
const CLOSE_EPSILON: f64 = 1e-9;

/// Radii within this relative difference are treated as circular.
const CIRCULAR_RADII_TOL: f64 = 0.01;

/// Arc-length step for sampling non-circular elliptical arcs, local units.
const ELLIPSE_SAMPLE_STEP: f64 = 0.1;

/// Interpret a path `d` attribute into local-space segments.
pub fn interpret_path_data(path_data: &str) -> Vec<Segment> {
    interpret_tokens(&tokenize_path(path_data))
}

/// Interpret pre-tokenized path commands into local-space segments.
pub fn interpret_tokens(tokens: &[PathToken]) -> Vec<Segment> {
    let mut interp = Interpreter::default();
    for token in tokens {
        interp.step(token);
    }
    interp.segments
}

#[derive(Default)]
struct Interpreter {
    segments: Vec<Segment>,
    current: Point,
    subpath_start: Point,
    /// Second control point of the previous `C`/`S`, for `S` reflection.
    last_cubic_ctrl: Option<Point>,
    /// Control point of the previous `Q`/`T`, for `T` reflection.
    last_quad_ctrl: Option<Point>,
}

impl Interpreter {
    fn step(&mut self, token: &PathToken) {
        let relative = token.cmd.is_ascii_lowercase();
        let args = &token.args;
        match token.cmd.to_ascii_uppercase() {
            'M' => {
                let p = self.resolve(args[0], args[1], relative);
                self.current = p;
                self.subpath_start = p;
                self.reset_reflection();
            }
            'L' => {
                let p = self.resolve(args[0], args[1], relative);
                self.line_to(p);
            }
            'H' => {
                let x = if relative {
                    self.current.x + args[0]
                } else {
                    args[0]
                };
                self.line_to(Point::new(x, self.current.y));
            }
            'V' => {
                let y = if relative {
                    self.current.y + args[0]
                } else {
                    args[0]
                };
                self.line_to(Point::new(self.current.x, y));
            }
            'Z' => {
                if self.current.distance_to(&self.subpath_start) > CLOSE_EPSILON {
                    self.segments
                        .push(Segment::Line(vec![self.current, self.subpath_start]));
                }
                self.current = self.subpath_start;
                self.reset_reflection();
            }
            'C' => {
                let c1 = self.resolve(args[0], args[1], relative);
                let c2 = self.resolve(args[2], args[3], relative);
                let end = self.resolve(args[4], args[5], relative);
                self.segments
                    .push(Segment::Curve(CurveSegment::cubic(self.current, c1, c2, end)));
                self.current = end;
                self.last_cubic_ctrl = Some(c2);
                self.last_quad_ctrl = None;
            }
            'S' => {
                let c1 = self.reflected(self.last_cubic_ctrl);
                let c2 = self.resolve(args[0], args[1], relative);
                let end = self.resolve(args[2], args[3], relative);
                self.segments
                    .push(Segment::Curve(CurveSegment::cubic(self.current, c1, c2, end)));
                self.current = end;
                self.last_cubic_ctrl = Some(c2);
                self.last_quad_ctrl = None;
            }
            'Q' => {
                let ctrl = self.resolve(args[0], args[1], relative);
                let end = self.resolve(args[2], args[3], relative);
                self.segments
                    .push(Segment::Curve(CurveSegment::quadratic(self.current, ctrl, end)));
                self.current = end;
                self.last_quad_ctrl = Some(ctrl);
                self.last_cubic_ctrl = None;
            }
            'T' => {
                let ctrl = self.reflected(self.last_quad_ctrl);
                let end = self.resolve(args[0], args[1], relative);
                self.segments
                    .push(Segment::Curve(CurveSegment::quadratic(self.current, ctrl, end)));
                self.current = end;
                self.last_quad_ctrl = Some(ctrl);
                self.last_cubic_ctrl = None;
            }
            'A' => {
                let end = self.resolve(args[5], args[6], relative);
                self.arc_to(args[0], args[1], args[2], args[3] != 0.0, args[4] != 0.0, end);
                self.current = end;
                self.reset_reflection();
            }
            other => debug!(command = %other, "interpreter ignoring unexpected command"),
        }
    }

    fn resolve(&self, x: f64, y: f64, relative: bool) -> Point {
        if relative {
            Point::new(self.current.x + x, self.current.y + y)
        } else {
            Point::new(x, y)
        }
    }

    fn line_to(&mut self, p: Point) {
        if p.distance_to(&self.current) > 0.0 {
            self.segments.push(Segment::Line(vec![self.current, p]));
        }
        self.current = p;
        self.reset_reflection();
    }

    fn reset_reflection(&mut self) {
        self.last_cubic_ctrl = None;
        self.last_quad_ctrl = None;
    }

    /// `2*current - last_ctrl`, or the current point when no eligible curve
    /// command precedes.
    fn reflected(&self, last_ctrl: Option<Point>) -> Point {
        match last_ctrl {
            Some(c) => Point::new(
                2.0 * self.current.x - c.x,
                2.0 * self.current.y - c.y,
            ),
            None => self.current,
        }
    }

    fn arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        x_rotation_deg: f64,
        large_arc: bool,
        sweep: bool,
        end: Point,
    ) {
        let start = self.current;
        if start.distance_to(&end) < 1e-12 {
            // SVG drops arcs with coincident endpoints.
            return;
        }
        if rx.abs() < 1e-12 || ry.abs() < 1e-12 {
            // Zero radius degenerates to a straight line per the SVG spec.
            self.segments.push(Segment::Line(vec![start, end]));
            return;
        }

        let Some(params) = arc_endpoint_to_center(start, end, rx, ry, x_rotation_deg, large_arc, sweep)
        else {
            self.segments.push(Segment::Line(vec![start, end]));
            return;
        };

        let mean_r = (params.rx + params.ry) / 2.0;
        if (params.rx - params.ry).abs() <= CIRCULAR_RADII_TOL * mean_r {
            // Circular: preserve exactly. Positive sweep runs toward
            // increasing atan2 angle, so sweep=1 maps to clockwise=false in
            // the numeric winding convention.
            let arc = ArcSegment::new(start, end, params.center, !sweep);
            if arc.is_radially_consistent(CIRCULAR_RADII_TOL) {
                self.segments.push(Segment::Arc(arc));
                return;
            }
        }

        self.segments.push(Segment::Line(params.sample()));
    }
}

/// Center parameterization of an SVG elliptical arc.
#[derive(Debug, Clone, Copy)]
pub struct CenterArc {
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    /// Ellipse x-axis rotation, radians.
    pub phi: f64,
    /// Start angle on the unit ellipse, radians.
    pub theta1: f64,
    /// Signed sweep, radians; positive when the sweep flag was set.
    pub delta: f64,
}

impl CenterArc {
    /// Point on the ellipse at parameter angle `theta`.
    pub fn point_at(&self, theta: f64) -> Point {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let ex = self.rx * theta.cos();
        let ey = self.ry * theta.sin();
        Point::new(
            self.center.x + cos_phi * ex - sin_phi * ey,
            self.center.y + sin_phi * ex + cos_phi * ey,
        )
    }

    /// Sample the arc as a polyline at fixed arc-length resolution.
    pub fn sample(&self) -> Vec<Point> {
        let approx_len = self.delta.abs() * self.rx.max(self.ry);
        let steps = ((approx_len / ELLIPSE_SAMPLE_STEP).ceil() as usize).clamp(16, 512);
        (0..=steps)
            .map(|i| self.point_at(self.theta1 + self.delta * (i as f64) / (steps as f64)))
            .collect()
    }
}

/// Convert SVG endpoint arc parameters to center parameterization.
///
/// Implements the W3C F.6.5 equations, including the F.6.6 radius
/// correction that scales both radii up proportionally when the chord does
/// not fit. Returns `None` for numerically unsolvable input.
pub fn arc_endpoint_to_center(
    start: Point,
    end: Point,
    rx: f64,
    ry: f64,
    x_rotation_deg: f64,
    large_arc: bool,
    sweep: bool,
) -> Option<CenterArc> {
    let mut rx = rx.abs();
    let mut ry = ry.abs();
    let phi = x_rotation_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    // F.6.5.1: midpoint form in the rotated frame.
    let dx2 = (start.x - end.x) / 2.0;
    let dy2 = (start.y - end.y) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    // F.6.6: scale radii until the geometry is solvable.
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    // F.6.5.2: center in the rotated frame.
    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let x1p2 = x1p * x1p;
    let y1p2 = y1p * y1p;
    let denom = rx2 * y1p2 + ry2 * x1p2;
    if denom.abs() < 1e-15 {
        return None;
    }
    let numer = (rx2 * ry2 - rx2 * y1p2 - ry2 * x1p2).max(0.0);
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let coef = sign * (numer / denom).sqrt();
    let cxp = coef * (rx * y1p / ry);
    let cyp = coef * (-ry * x1p / rx);

    // F.6.5.3: back to the original frame.
    let center = Point::new(
        cos_phi * cxp - sin_phi * cyp + (start.x + end.x) / 2.0,
        sin_phi * cxp + cos_phi * cyp + (start.y + end.y) / 2.0,
    );

    // F.6.5.5/6: angles.
    let ux = (x1p - cxp) / rx;
    let uy = (y1p - cyp) / ry;
    let vx = (-x1p - cxp) / rx;
    let vy = (-y1p - cyp) / ry;
    let theta1 = vector_angle(1.0, 0.0, ux, uy);
    let mut delta = vector_angle(ux, uy, vx, vy);
    if !sweep && delta > 0.0 {
        delta -= std::f64::consts::TAU;
    } else if sweep && delta < 0.0 {
        delta += std::f64::consts::TAU;
    }

    Some(CenterArc {
        center,
        rx,
        ry,
        phi,
        theta1,
        delta,
    })
}

fn vector_angle(ux: f64, uy: f64, vx: f64, vy: f64) -> f64 {
    let dot = ux * vx + uy * vy;
    let det = ux * vy - uy * vx;
    det.atan2(dot)
}

//! Path segment types.
//!
//! Every drawable element in a document funnels into the [`Segment`] model:
//! polylines, circular arcs, and (as a pre-flattening intermediate) Bezier
//! curves. Arcs are the only curved primitive that survives to G-code
//! emission; curves exist only between the path interpreter and the
//! flattener.

use serde::{Deserialize, Serialize};

use super::{Point, Transform2D};

/// Normalize an angle to the half-open interval `(-pi, pi]`.
pub(crate) fn wrap_angle(mut a: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    while a > PI {
        a -= TAU;
    }
    while a <= -PI {
        a += TAU;
    }
    a
}

/// A circular arc fully specified by endpoints, center and winding.
///
/// `clockwise` is a purely numeric convention: `true` means the traversal
/// from `start` to `end` runs in the direction of *decreasing* `atan2`
/// angle about `center` (mathematically clockwise in a Y-up frame). A
/// reflection such as the layout's Y flip inverts the flag.
///
/// Invariant: `start` and `end` are equidistant from `center` within a
/// small relative tolerance; geometry that cannot satisfy this must be
/// represented as a sampled [`Segment::Line`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSegment {
    pub start: Point,
    pub end: Point,
    pub center: Point,
    pub clockwise: bool,
}

impl ArcSegment {
    pub fn new(start: Point, end: Point, center: Point, clockwise: bool) -> Self {
        Self {
            start,
            end,
            center,
            clockwise,
        }
    }

    /// Build an arc whose winding is inferred from a witness point known to
    /// lie on the arc between the endpoints.
    pub fn through_point(start: Point, mid: Point, end: Point, center: Point) -> Self {
        let a0 = start.angle_about(&center);
        let am = mid.angle_about(&center);
        let clockwise = wrap_angle(am - a0) < 0.0;
        Self::new(start, end, center, clockwise)
    }

    /// Radius measured from the start point.
    pub fn radius(&self) -> f64 {
        self.start.distance_to(&self.center)
    }

    /// Checks the defining invariant: both endpoints equidistant from the
    /// center within `relative_tolerance`.
    pub fn is_radially_consistent(&self, relative_tolerance: f64) -> bool {
        let rs = self.start.distance_to(&self.center);
        let re = self.end.distance_to(&self.center);
        let scale = rs.max(re).max(1e-12);
        (rs - re).abs() / scale <= relative_tolerance
    }

    /// Signed sweep in radians: negative when clockwise. A degenerate arc
    /// with coincident endpoints reads as a full turn.
    pub fn sweep_angle(&self) -> f64 {
        let a0 = self.start.angle_about(&self.center);
        let a1 = self.end.angle_about(&self.center);
        let mut sweep = wrap_angle(a1 - a0);
        if self.clockwise && sweep > -1e-12 {
            sweep -= std::f64::consts::TAU;
        } else if !self.clockwise && sweep < 1e-12 {
            sweep += std::f64::consts::TAU;
        }
        sweep
    }

    /// Point on the circle at the given `atan2` angle.
    pub fn point_at_angle(&self, angle: f64) -> Point {
        let r = self.radius();
        Point::new(
            self.center.x + r * angle.cos(),
            self.center.y + r * angle.sin(),
        )
    }

    /// Point halfway along the traversal.
    pub fn midpoint_on_arc(&self) -> Point {
        let a0 = self.start.angle_about(&self.center);
        self.point_at_angle(a0 + self.sweep_angle() / 2.0)
    }

    /// Approximate the arc as a polyline whose chords deviate from the true
    /// circle by at most `chord_tolerance`.
    pub fn sample(&self, chord_tolerance: f64) -> Vec<Point> {
        let r = self.radius();
        let sweep = self.sweep_angle();
        if r < 1e-9 {
            return vec![self.start, self.end];
        }
        let max_step = 2.0 * (1.0 - (chord_tolerance / r).min(1.0)).acos().max(1e-3);
        let steps = ((sweep.abs() / max_step).ceil() as usize).clamp(2, 1024);
        let a0 = self.start.angle_about(&self.center);
        let mut points = Vec::with_capacity(steps + 1);
        points.push(self.start);
        for i in 1..steps {
            let a = a0 + sweep * (i as f64) / (steps as f64);
            points.push(self.point_at_angle(a));
        }
        points.push(self.end);
        points
    }
}

/// Control points of an un-flattened Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CurveControl {
    Quadratic(Point),
    Cubic(Point, Point),
}

/// An un-flattened Bezier curve; intermediate representation only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveSegment {
    pub start: Point,
    pub end: Point,
    pub control: CurveControl,
}

impl CurveSegment {
    pub fn quadratic(start: Point, ctrl: Point, end: Point) -> Self {
        Self {
            start,
            end,
            control: CurveControl::Quadratic(ctrl),
        }
    }

    pub fn cubic(start: Point, ctrl1: Point, ctrl2: Point, end: Point) -> Self {
        Self {
            start,
            end,
            control: CurveControl::Cubic(ctrl1, ctrl2),
        }
    }

    /// Promote to cubic form. Quadratics raise degree exactly:
    /// `c1 = p0 + 2/3 (q - p0)`, `c2 = p3 + 2/3 (q - p3)`.
    pub fn as_cubic(&self) -> (Point, Point, Point, Point) {
        match self.control {
            CurveControl::Cubic(c1, c2) => (self.start, c1, c2, self.end),
            CurveControl::Quadratic(q) => {
                let c1 = self.start.lerp(&q, 2.0 / 3.0);
                let c2 = self.end.lerp(&q, 2.0 / 3.0);
                (self.start, c1, c2, self.end)
            }
        }
    }

    /// Evaluate the curve at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Point {
        let (p0, c1, c2, p3) = self.as_cubic();
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        Point::new(
            b0 * p0.x + b1 * c1.x + b2 * c2.x + b3 * p3.x,
            b0 * p0.y + b1 * c1.y + b2 * c2.y + b3 * p3.y,
        )
    }
}

/// One geometric segment of a path, in a single coordinate space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    /// A polyline: consecutive points connected by straight moves.
    Line(Vec<Point>),
    /// A circular arc.
    Arc(ArcSegment),
    /// An un-flattened Bezier; never reaches the emitter.
    Curve(CurveSegment),
}

impl Segment {
    pub fn is_curve(&self) -> bool {
        matches!(self, Segment::Curve(_))
    }

    pub fn start(&self) -> Option<Point> {
        match self {
            Segment::Line(points) => points.first().copied(),
            Segment::Arc(arc) => Some(arc.start),
            Segment::Curve(curve) => Some(curve.start),
        }
    }

    pub fn end(&self) -> Option<Point> {
        match self {
            Segment::Line(points) => points.last().copied(),
            Segment::Arc(arc) => Some(arc.end),
            Segment::Curve(curve) => Some(curve.end),
        }
    }

    /// Path length; curves are estimated by coarse sampling.
    pub fn length(&self) -> f64 {
        match self {
            Segment::Line(points) => points
                .windows(2)
                .map(|w| w[0].distance_to(&w[1]))
                .sum(),
            Segment::Arc(arc) => arc.radius() * arc.sweep_angle().abs(),
            Segment::Curve(curve) => {
                let mut len = 0.0;
                let mut prev = curve.start;
                for i in 1..=16 {
                    let p = curve.point_at(i as f64 / 16.0);
                    len += prev.distance_to(&p);
                    prev = p;
                }
                len
            }
        }
    }

    /// Apply an affine transform, preserving the segment kind where the
    /// transform allows it.
    ///
    /// Lines and Beziers map point-by-point (Bezier control polygons are
    /// affine-invariant). Arcs stay arcs only under a similarity transform,
    /// with the winding flipped under reflection; any other transform makes
    /// them elliptical, so they are sampled at `sampling_tolerance` and
    /// mapped as polylines.
    pub fn transformed(&self, t: &Transform2D, sampling_tolerance: f64) -> Segment {
        match self {
            Segment::Line(points) => Segment::Line(points.iter().map(|p| t.apply(p)).collect()),
            Segment::Curve(curve) => {
                let control = match curve.control {
                    CurveControl::Quadratic(q) => CurveControl::Quadratic(t.apply(&q)),
                    CurveControl::Cubic(c1, c2) => CurveControl::Cubic(t.apply(&c1), t.apply(&c2)),
                };
                Segment::Curve(CurveSegment {
                    start: t.apply(&curve.start),
                    end: t.apply(&curve.end),
                    control,
                })
            }
            Segment::Arc(arc) => {
                if t.is_similarity(1e-6) {
                    let clockwise = if t.determinant() < 0.0 {
                        !arc.clockwise
                    } else {
                        arc.clockwise
                    };
                    Segment::Arc(ArcSegment {
                        start: t.apply(&arc.start),
                        end: t.apply(&arc.end),
                        center: t.apply(&arc.center),
                        clockwise,
                    })
                } else {
                    let points = arc
                        .sample(sampling_tolerance)
                        .iter()
                        .map(|p| t.apply(p))
                        .collect();
                    Segment::Line(points)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_invariant_holds_for_true_arcs() {
        let arc = ArcSegment::new(
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 0.0),
            false,
        );
        assert!(arc.is_radially_consistent(1e-9));
        assert!((arc.sweep_angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn arc_invariant_rejects_unequal_radii() {
        let arc = ArcSegment::new(
            Point::new(10.0, 0.0),
            Point::new(0.0, 11.0),
            Point::new(0.0, 0.0),
            false,
        );
        assert!(!arc.is_radially_consistent(0.01));
    }

    #[test]
    fn clockwise_sweep_is_negative() {
        let arc = ArcSegment::new(
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 0.0),
            true,
        );
        let sweep = arc.sweep_angle();
        assert!(sweep < 0.0);
        assert!((sweep + 1.5 * std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn arc_samples_lie_on_circle() {
        let arc = ArcSegment::new(
            Point::new(5.0, 0.0),
            Point::new(-5.0, 0.0),
            Point::new(0.0, 0.0),
            false,
        );
        for p in arc.sample(0.01) {
            assert!((p.distance_to(&arc.center) - 5.0).abs() < 0.02);
        }
    }

    #[test]
    fn reflection_flips_arc_winding() {
        let arc = Segment::Arc(ArcSegment::new(
            Point::new(5.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(0.0, 0.0),
            false,
        ));
        let flip = Transform2D::scaling(1.0, -1.0);
        match arc.transformed(&flip, 0.05) {
            Segment::Arc(a) => assert!(a.clockwise),
            other => panic!("expected arc, got {:?}", other),
        }
    }

    #[test]
    fn non_uniform_scale_degrades_arc_to_polyline() {
        let arc = Segment::Arc(ArcSegment::new(
            Point::new(5.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(0.0, 0.0),
            false,
        ));
        let squash = Transform2D::scaling(2.0, 1.0);
        match arc.transformed(&squash, 0.05) {
            Segment::Line(points) => assert!(points.len() > 2),
            other => panic!("expected polyline, got {:?}", other),
        }
    }

    #[test]
    fn quadratic_promotion_preserves_endpoints_and_midpoint() {
        let q = CurveSegment::quadratic(
            Point::new(0.0, 0.0),
            Point::new(5.0, 10.0),
            Point::new(10.0, 0.0),
        );
        // A quadratic at t=0.5 passes through (p0 + 2q + p3)/4.
        let mid = q.point_at(0.5);
        assert!(mid.distance_to(&Point::new(5.0, 5.0)) < 1e-9);
    }
}

//! Curve flattening and arc fitting.
//!
//! Converts the Bezier segments produced by the path interpreter into
//! emitter-ready geometry, by one of two strategies:
//!
//! 1. **Adaptive flattening** - recursive de Casteljau subdivision bounded
//!    by a flatness tolerance, producing polylines.
//! 2. **Arc fitting** - fit circular arcs to cubics where a circle
//!    approximates the curve within tolerance, bisecting and recursing
//!    otherwise. Produces far smaller G-code for curve-heavy artwork and is
//!    the default.
//!
//! A third, best-effort pass recognizes the "circle as four cubics" pattern
//! that vector tools emit and collapses the quartet into two semicircular
//! arcs. It is gated behind its own tolerance checks and never required for
//! correctness.

use tracing::trace;

use crate::geometry::{ArcSegment, CurveControl, CurveSegment, Point, Segment, distance_to_line};

/// Default flatness tolerance in path units.
pub const DEFAULT_FLATNESS: f64 = 0.05;

/// Default maximum radial error for a fitted arc, in path units.
pub const DEFAULT_ARC_TOLERANCE: f64 = 0.05;

/// Radii beyond this are treated as straight lines; the arc would be
/// numerically indistinguishable from its chord at machine resolution.
const MAX_FIT_RADIUS: f64 = 10_000.0;

/// Relative radius tolerance for the four-cubic circle heuristic.
const CIRCLE_DETECT_RADIUS_TOL: f64 = 0.05;

/// Allowed deviation from 90-degree joint spacing for the circle heuristic.
const CIRCLE_DETECT_ANGLE_TOL: f64 = 25.0 * std::f64::consts::PI / 180.0;

/// How Bezier segments are converted for emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveStrategy {
    /// Subdivide adaptively into polylines.
    Flatten,
    /// Fit circular arcs, falling back to subdivision.
    FitArcs,
}

/// Configuration for curve conversion.
#[derive(Debug, Clone)]
pub struct CurveOptions {
    pub strategy: CurveStrategy,
    /// Flatness tolerance for adaptive subdivision (path units).
    pub flatness: f64,
    /// Maximum radial error for a fitted arc (path units).
    pub arc_tolerance: f64,
    /// Enable the four-cubic circle collapse heuristic.
    pub detect_circles: bool,
    /// Recursion cap for adaptive flattening.
    pub max_flatten_depth: u32,
    /// Recursion cap for arc-fit bisection; past it the chord is emitted.
    pub max_fit_depth: u32,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            strategy: CurveStrategy::FitArcs,
            flatness: DEFAULT_FLATNESS,
            arc_tolerance: DEFAULT_ARC_TOLERANCE,
            detect_circles: true,
            max_flatten_depth: 20,
            max_fit_depth: 6,
        }
    }
}

impl CurveOptions {
    pub fn flatten_only() -> Self {
        Self {
            strategy: CurveStrategy::Flatten,
            detect_circles: false,
            ..Self::default()
        }
    }

    pub fn flatness(mut self, flatness: f64) -> Self {
        self.flatness = flatness;
        self
    }

    pub fn arc_tolerance(mut self, tolerance: f64) -> Self {
        self.arc_tolerance = tolerance;
        self
    }

    pub fn detect_circles(mut self, enabled: bool) -> Self {
        self.detect_circles = enabled;
        self
    }
}

/// Exact de Casteljau split of a cubic at parameter `t`.
pub fn split_cubic(
    p0: Point,
    c1: Point,
    c2: Point,
    p3: Point,
    t: f64,
) -> ((Point, Point, Point, Point), (Point, Point, Point, Point)) {
    let q0 = p0.lerp(&c1, t);
    let q1 = c1.lerp(&c2, t);
    let q2 = c2.lerp(&p3, t);
    let r0 = q0.lerp(&q1, t);
    let r1 = q1.lerp(&q2, t);
    let s = r0.lerp(&r1, t);
    ((p0, q0, r0, s), (s, r1, q2, p3))
}

/// Center and radius of the circle through three non-collinear points.
pub fn circle_from_three_points(a: Point, b: Point, c: Point) -> Option<(Point, f64)> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    let span = a.distance_to(&b) + b.distance_to(&c) + c.distance_to(&a);
    if d.abs() < 1e-9 * span.max(1.0) {
        return None;
    }
    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    let center = Point::new(ux, uy);
    Some((center, center.distance_to(&a)))
}

/// Flatten one Bezier into a polyline within `flatness` of the true curve.
///
/// The returned points include both endpoints.
pub fn flatten_curve(curve: &CurveSegment, flatness: f64, max_depth: u32) -> Vec<Point> {
    let (p0, c1, c2, p3) = curve.as_cubic();
    let mut points = vec![p0];
    flatten_recursive(p0, c1, c2, p3, flatness, max_depth, &mut points);
    points
}

fn flatten_recursive(
    p0: Point,
    c1: Point,
    c2: Point,
    p3: Point,
    flatness: f64,
    depth: u32,
    out: &mut Vec<Point>,
) {
    let flat_enough =
        distance_to_line(&c1, &p0, &p3) <= flatness && distance_to_line(&c2, &p0, &p3) <= flatness;
    if flat_enough || depth == 0 {
        out.push(p3);
        return;
    }
    let (left, right) = split_cubic(p0, c1, c2, p3, 0.5);
    flatten_recursive(left.0, left.1, left.2, left.3, flatness, depth - 1, out);
    flatten_recursive(right.0, right.1, right.2, right.3, flatness, depth - 1, out);
}

/// Fit circular arcs to one Bezier, bisecting where a single circle is not
/// within tolerance, and emitting chord lines past the depth cap.
pub fn fit_curve_to_arcs(curve: &CurveSegment, options: &CurveOptions, out: &mut Vec<Segment>) {
    let (p0, c1, c2, p3) = curve.as_cubic();
    fit_recursive(p0, c1, c2, p3, options, options.max_fit_depth, out);
}

fn fit_recursive(
    p0: Point,
    c1: Point,
    c2: Point,
    p3: Point,
    options: &CurveOptions,
    depth: u32,
    out: &mut Vec<Segment>,
) {
    let chord = p0.distance_to(&p3);
    if chord < 1e-9
        && distance_to_line(&c1, &p0, &p3) < 1e-9
        && distance_to_line(&c2, &p0, &p3) < 1e-9
    {
        // Zero-length residue; nothing to emit.
        return;
    }

    let curve = CurveSegment::cubic(p0, c1, c2, p3);
    let mid = curve.point_at(0.5);

    match circle_from_three_points(p0, mid, p3) {
        Some((center, radius)) if radius <= MAX_FIT_RADIUS => {
            let err25 = (curve.point_at(0.25).distance_to(&center) - radius).abs();
            let err75 = (curve.point_at(0.75).distance_to(&center) - radius).abs();
            if err25.max(err75) <= options.arc_tolerance {
                out.push(Segment::Arc(ArcSegment::through_point(p0, mid, p3, center)));
                return;
            }
        }
        _ => {
            // Collinear samples: the curve may still bulge between them.
            let bulge =
                distance_to_line(&c1, &p0, &p3).max(distance_to_line(&c2, &p0, &p3));
            if bulge <= options.arc_tolerance {
                out.push(Segment::Line(vec![p0, p3]));
                return;
            }
        }
    }

    if depth == 0 {
        trace!("arc fit depth exhausted, emitting chord");
        out.push(Segment::Line(vec![p0, p3]));
        return;
    }

    let (left, right) = split_cubic(p0, c1, c2, p3, 0.5);
    fit_recursive(left.0, left.1, left.2, left.3, options, depth - 1, out);
    fit_recursive(right.0, right.1, right.2, right.3, options, depth - 1, out);
}

/// Convert every [`Segment::Curve`] in `segments` according to `options`.
///
/// Lines and arcs pass through untouched apart from degenerate-geometry
/// removal (zero-length lines, zero-radius arcs). The result contains no
/// `Curve` variants.
pub fn resolve_curves(segments: Vec<Segment>, options: &CurveOptions) -> Vec<Segment> {
    let segments = if options.detect_circles && options.strategy == CurveStrategy::FitArcs {
        collapse_four_curve_circles(segments)
    } else {
        segments
    };

    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            Segment::Line(points) => {
                let len: f64 = points.windows(2).map(|w| w[0].distance_to(&w[1])).sum();
                if points.len() >= 2 && len > 1e-9 {
                    out.push(Segment::Line(points));
                }
            }
            Segment::Arc(arc) => {
                if arc.radius() > 1e-9 {
                    out.push(Segment::Arc(arc));
                }
            }
            Segment::Curve(curve) => match options.strategy {
                CurveStrategy::Flatten => {
                    let points =
                        flatten_curve(&curve, options.flatness, options.max_flatten_depth);
                    if points.len() >= 2 {
                        out.push(Segment::Line(points));
                    }
                }
                CurveStrategy::FitArcs => {
                    fit_curve_to_arcs(&curve, options, &mut out);
                }
            },
        }
    }
    out
}

/// Collapse runs of exactly four chained cubics that close a subpath and
/// whose joints fit a single circle into two semicircular arcs.
///
/// Vector tools approximate circles with four 90-degree cubics; matching
/// that pattern up front keeps whole circles as two G2/G3 moves instead of
/// eight fitted quadrant arcs or hundreds of chords.
fn collapse_four_curve_circles(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    let mut i = 0;
    while i < segments.len() {
        if let Some(arcs) = try_collapse_at(&segments, i) {
            trace!("collapsed four-cubic quartet into two semicircles");
            out.extend(arcs);
            i += 4;
        } else {
            out.push(segments[i].clone());
            i += 1;
        }
    }
    out
}

fn try_collapse_at(segments: &[Segment], i: usize) -> Option<[Segment; 2]> {
    if i + 4 > segments.len() {
        return None;
    }
    let mut quartet: Vec<CurveSegment> = Vec::with_capacity(4);
    for k in 0..4 {
        match &segments[i + k] {
            Segment::Curve(c) if matches!(c.control, CurveControl::Cubic(_, _)) => {
                quartet.push(*c);
            }
            _ => return None,
        }
    }

    // A fifth consecutive cubic means this is not the 4-cubic pattern.
    if let Some(Segment::Curve(c)) = segments.get(i + 4) {
        if matches!(c.control, CurveControl::Cubic(_, _)) && c.start.distance_to(&quartet[3].end) < 1e-9 {
            return None;
        }
    }

    let joints = [
        quartet[0].start,
        quartet[1].start,
        quartet[2].start,
        quartet[3].start,
    ];
    let span = joints[0].distance_to(&joints[2]).max(1e-9);
    let link_eps = 1e-6 * span.max(1.0);

    for k in 0..3 {
        if quartet[k].end.distance_to(&quartet[k + 1].start) > link_eps {
            return None;
        }
    }
    if quartet[3].end.distance_to(&quartet[0].start) > link_eps {
        return None;
    }

    let (center, radius) = circle_from_three_points(joints[0], joints[1], joints[2])?;
    if radius < 1e-9 {
        return None;
    }
    let closing_err = (joints[3].distance_to(&center) - radius).abs();
    if closing_err > CIRCLE_DETECT_RADIUS_TOL * radius {
        return None;
    }

    // The joints must be spaced roughly a quadrant apart, all winding the
    // same way.
    let angles: Vec<f64> = joints.iter().map(|p| p.angle_about(&center)).collect();
    let quarter = std::f64::consts::FRAC_PI_2;
    let mut first_sign = 0.0;
    for k in 0..4 {
        let delta = crate::geometry::wrap_angle(angles[(k + 1) % 4] - angles[k]);
        if (delta.abs() - quarter).abs() > CIRCLE_DETECT_ANGLE_TOL {
            return None;
        }
        if k == 0 {
            first_sign = delta.signum();
        } else if delta.signum() != first_sign {
            return None;
        }
    }

    Some([
        Segment::Arc(ArcSegment::through_point(
            joints[0], joints[1], joints[2], center,
        )),
        Segment::Arc(ArcSegment::through_point(
            joints[2], joints[3], joints[0], center,
        )),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Magic constant for approximating a quarter circle with one cubic.
    const KAPPA: f64 = 0.552_284_749_830_793_4;

    fn quarter_circle_cubic(r: f64) -> CurveSegment {
        // From (r, 0) counterclockwise to (0, r).
        CurveSegment::cubic(
            Point::new(r, 0.0),
            Point::new(r, r * KAPPA),
            Point::new(r * KAPPA, r),
            Point::new(0.0, r),
        )
    }

    fn distance_to_polyline(p: &Point, polyline: &[Point]) -> f64 {
        polyline
            .windows(2)
            .map(|w| {
                let (a, b) = (w[0], w[1]);
                let dx = b.x - a.x;
                let dy = b.y - a.y;
                let len2 = dx * dx + dy * dy;
                if len2 < 1e-18 {
                    return p.distance_to(&a);
                }
                let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
                p.distance_to(&Point::new(a.x + t * dx, a.y + t * dy))
            })
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn flattened_polyline_stays_within_tolerance() {
        let curve = CurveSegment::cubic(
            Point::new(0.0, 0.0),
            Point::new(10.0, 40.0),
            Point::new(50.0, -30.0),
            Point::new(60.0, 10.0),
        );
        let tolerance = 0.05;
        let polyline = flatten_curve(&curve, tolerance, 20);
        assert!(polyline.len() > 2);
        for i in 0..=400 {
            let p = curve.point_at(i as f64 / 400.0);
            assert!(
                distance_to_polyline(&p, &polyline) <= tolerance + 1e-6,
                "curve point strays {} from polyline",
                distance_to_polyline(&p, &polyline)
            );
        }
    }

    #[test]
    fn quarter_circle_fits_as_single_arc() {
        let mut out = Vec::new();
        fit_curve_to_arcs(&quarter_circle_cubic(10.0), &CurveOptions::default(), &mut out);
        assert_eq!(out.len(), 1);
        match &out[0] {
            Segment::Arc(arc) => {
                assert!(arc.center.distance_to(&Point::new(0.0, 0.0)) < 0.05);
                assert!((arc.radius() - 10.0).abs() < 0.05);
                assert!(arc.is_radially_consistent(0.01));
                assert!(!arc.clockwise);
            }
            other => panic!("expected a fitted arc, got {:?}", other),
        }
    }

    #[test]
    fn straight_cubic_fits_as_line() {
        let curve = CurveSegment::cubic(
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(7.0, 0.0),
            Point::new(10.0, 0.0),
        );
        let mut out = Vec::new();
        fit_curve_to_arcs(&curve, &CurveOptions::default(), &mut out);
        assert_eq!(out.len(), 1);
        assert!(matches!(&out[0], Segment::Line(points) if points.len() == 2));
    }

    #[test]
    fn wild_cubic_subdivides_into_valid_arcs() {
        let curve = CurveSegment::cubic(
            Point::new(0.0, 0.0),
            Point::new(0.0, 20.0),
            Point::new(30.0, -20.0),
            Point::new(30.0, 5.0),
        );
        let options = CurveOptions::default();
        let mut out = Vec::new();
        fit_curve_to_arcs(&curve, &options, &mut out);
        assert!(!out.is_empty());
        for segment in &out {
            if let Segment::Arc(arc) = segment {
                assert!(arc.is_radially_consistent(0.01));
            }
        }
        // The chain is continuous from curve start to curve end.
        assert!(out[0].start().unwrap().distance_to(&Point::new(0.0, 0.0)) < 1e-9);
        assert!(
            out.last()
                .unwrap()
                .end()
                .unwrap()
                .distance_to(&Point::new(30.0, 5.0))
                < 1e-9
        );
    }

    fn four_cubic_circle(cx: f64, cy: f64, r: f64) -> Vec<Segment> {
        let k = KAPPA * r;
        let east = Point::new(cx + r, cy);
        let north = Point::new(cx, cy + r);
        let west = Point::new(cx - r, cy);
        let south = Point::new(cx, cy - r);
        vec![
            Segment::Curve(CurveSegment::cubic(
                east,
                Point::new(cx + r, cy + k),
                Point::new(cx + k, cy + r),
                north,
            )),
            Segment::Curve(CurveSegment::cubic(
                north,
                Point::new(cx - k, cy + r),
                Point::new(cx - r, cy + k),
                west,
            )),
            Segment::Curve(CurveSegment::cubic(
                west,
                Point::new(cx - r, cy - k),
                Point::new(cx - k, cy - r),
                south,
            )),
            Segment::Curve(CurveSegment::cubic(
                south,
                Point::new(cx + k, cy - r),
                Point::new(cx + r, cy - k),
                east,
            )),
        ]
    }

    #[test]
    fn four_cubic_circle_collapses_to_two_semicircles() {
        let out = resolve_curves(four_cubic_circle(5.0, 5.0, 5.0), &CurveOptions::default());
        assert_eq!(out.len(), 2);
        for segment in &out {
            match segment {
                Segment::Arc(arc) => {
                    assert!(arc.center.distance_to(&Point::new(5.0, 5.0)) < 0.1);
                    assert!((arc.sweep_angle().abs() - std::f64::consts::PI).abs() < 1e-6);
                }
                other => panic!("expected semicircle arc, got {:?}", other),
            }
        }
        // Continuous traversal: second arc starts where the first ends.
        assert!(
            out[0]
                .end()
                .unwrap()
                .distance_to(&out[1].start().unwrap())
                < 1e-9
        );
        assert!(
            out[1]
                .end()
                .unwrap()
                .distance_to(&out[0].start().unwrap())
                < 1e-9
        );
    }

    #[test]
    fn open_cubic_run_is_not_collapsed() {
        let mut segments = four_cubic_circle(0.0, 0.0, 8.0);
        // Break the closure.
        if let Segment::Curve(c) = &mut segments[3] {
            c.end = Point::new(1.0, 0.5);
        }
        let out = resolve_curves(segments, &CurveOptions::default());
        // No two-arc collapse; every quadrant is fitted independently.
        assert!(out.len() > 2);
    }

    #[test]
    fn flatten_strategy_leaves_no_curves() {
        let out = resolve_curves(
            four_cubic_circle(0.0, 0.0, 3.0),
            &CurveOptions::flatten_only(),
        );
        assert!(out.iter().all(|s| !s.is_curve()));
        assert!(out.iter().all(|s| matches!(s, Segment::Line(_))));
    }
}

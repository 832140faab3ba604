//! Shape normalizer: non-path SVG primitives to segments.
//!
//! Every primitive maps deterministically into the same segment model the
//! path interpreter produces, in local units, before any transform is
//! applied. Straight-edged shapes keep their exact vertices; circles become
//! two semicircular arcs traversed continuously; non-circular ellipses are
//! sampled.

use plotkit_core::{ArcSegment, Point, Segment};

/// Radii within this relative difference make an ellipse a circle.
const CIRCULAR_RADII_TOL: f64 = 0.01;

/// Arc-length step for sampling non-circular ellipses, local units.
const ELLIPSE_SAMPLE_STEP: f64 = 0.1;

/// `rect` to four explicit edge lines; never sampled.
pub fn rect_segments(x: f64, y: f64, width: f64, height: f64) -> Vec<Segment> {
    if width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }
    let corners = [
        Point::new(x, y),
        Point::new(x + width, y),
        Point::new(x + width, y + height),
        Point::new(x, y + height),
    ];
    (0..4)
        .map(|i| Segment::Line(vec![corners[i], corners[(i + 1) % 4]]))
        .collect()
}

/// `circle` to two semicircles sharing a center, traversed continuously
/// from the east diameter endpoint: both halves carry the same winding and
/// the second starts where the first ends.
pub fn circle_segments(cx: f64, cy: f64, r: f64) -> Vec<Segment> {
    if r <= 0.0 {
        return Vec::new();
    }
    let center = Point::new(cx, cy);
    let east = Point::new(cx + r, cy);
    let west = Point::new(cx - r, cy);
    let north = Point::new(cx, cy + r);
    let south = Point::new(cx, cy - r);
    vec![
        Segment::Arc(ArcSegment::through_point(east, north, west, center)),
        Segment::Arc(ArcSegment::through_point(west, south, east, center)),
    ]
}

/// `ellipse`: a circle when the radii agree within tolerance, otherwise one
/// closed polyline sampled at fixed arc-length resolution.
pub fn ellipse_segments(cx: f64, cy: f64, rx: f64, ry: f64) -> Vec<Segment> {
    if rx <= 0.0 || ry <= 0.0 {
        return Vec::new();
    }
    if (rx - ry).abs() <= CIRCULAR_RADII_TOL * rx.max(ry) {
        return circle_segments(cx, cy, (rx + ry) / 2.0);
    }
    // Ramanujan perimeter approximation sizes the sample count.
    let h = ((rx - ry) / (rx + ry)).powi(2);
    let perimeter =
        std::f64::consts::PI * (rx + ry) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()));
    let steps = ((perimeter / ELLIPSE_SAMPLE_STEP).ceil() as usize).clamp(16, 512);
    let points: Vec<Point> = (0..=steps)
        .map(|i| {
            let theta = std::f64::consts::TAU * (i as f64) / (steps as f64);
            Point::new(cx + rx * theta.cos(), cy + ry * theta.sin())
        })
        .collect();
    vec![Segment::Line(points)]
}

/// `line` to a single two-point segment; exact endpoints.
pub fn line_segments(x1: f64, y1: f64, x2: f64, y2: f64) -> Vec<Segment> {
    let a = Point::new(x1, y1);
    let b = Point::new(x2, y2);
    if a.distance_to(&b) < 1e-12 {
        return Vec::new();
    }
    vec![Segment::Line(vec![a, b])]
}

/// `polyline`/`polygon` points attribute to consecutive vertex lines; a
/// polygon wraps the last vertex back to the first.
pub fn poly_segments(points_attr: &str, close: bool) -> Vec<Segment> {
    let vertices = parse_points(points_attr);
    if vertices.len() < 2 {
        return Vec::new();
    }
    let mut segments: Vec<Segment> = vertices
        .windows(2)
        .filter(|w| w[0].distance_to(&w[1]) > 1e-12)
        .map(|w| Segment::Line(vec![w[0], w[1]]))
        .collect();
    if close {
        let first = vertices[0];
        let last = *vertices.last().unwrap();
        if last.distance_to(&first) > 1e-12 {
            segments.push(Segment::Line(vec![last, first]));
        }
    }
    segments
}

/// Parse a `points` attribute into coordinate pairs, dropping a dangling
/// odd coordinate.
fn parse_points(points_attr: &str) -> Vec<Point> {
    points_attr
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<f64>().ok())
        .collect::<Vec<f64>>()
        .chunks(2)
        .filter(|chunk| chunk.len() == 2)
        .map(|chunk| Point::new(chunk[0], chunk[1]))
        .collect()
}

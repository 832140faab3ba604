//! SVG document parsing.
//!
//! Walks a document tree with roxmltree, accumulating transforms
//! ancestor-first, funneling every drawable element through the path
//! interpreter or the shape normalizer, and resolving `<use>`/`<symbol>`
//! indirection with a bounded expansion depth.
//!
//! The parser is stateless: text in, segments out, no process-wide state.

use plotkit_core::{ImportError, Point, Segment, Transform2D};
use tracing::{debug, warn};

use crate::interpreter::interpret_path_data;
use crate::shapes;
use crate::transform::parse_transform_list;

/// `<use>` chains deeper than this stop expanding; guards reference cycles.
const MAX_USE_DEPTH: u32 = 15;

/// Sampling tolerance for arcs degraded by non-similarity transforms.
const TRANSFORM_SAMPLE_TOL: f64 = plotkit_core::DEFAULT_FLATNESS;

/// One parsed SVG document: natural size plus document-space segments.
///
/// Segments may still contain un-flattened `Curve` variants; run
/// [`plotkit_core::resolve_curves`] before emission.
#[derive(Debug, Clone)]
pub struct ParsedSvg {
    /// Natural width in document units (viewBox, else width attribute,
    /// else geometry bounds).
    pub width: f64,
    /// Natural height in document units.
    pub height: f64,
    pub segments: Vec<Segment>,
}

/// Parse SVG text into document-space segments.
///
/// Element-level problems are skipped with a log line; only document-level
/// failures (not SVG, unparseable XML) are errors.
pub fn parse_svg(text: &str) -> Result<ParsedSvg, ImportError> {
    if !text.contains("<svg") {
        return Err(ImportError::NotSvg);
    }
    let doc = roxmltree::Document::parse(text).map_err(|e| ImportError::MalformedXml {
        reason: e.to_string(),
    })?;
    let root = doc.root_element();
    if !root.has_tag_name("svg") {
        return Err(ImportError::NotSvg);
    }

    let view_box = parse_view_box(root.attribute("viewBox"));
    let attr_width = root.attribute("width").and_then(parse_length);
    let attr_height = root.attribute("height").and_then(parse_length);

    // viewBox min-x/min-y shift the whole content frame.
    let root_ctm = match view_box {
        Some((min_x, min_y, _, _)) => Transform2D::translation(-min_x, -min_y),
        None => Transform2D::identity(),
    };

    let mut segments = Vec::new();
    walk_children(&root, &root_ctm, 0, &mut segments);

    let (width, height) = match (view_box, attr_width, attr_height) {
        (Some((_, _, w, h)), _, _) => (w, h),
        (None, Some(w), Some(h)) => (w, h),
        _ => {
            let (max_x, max_y) = segments_extent(&segments);
            (max_x, max_y)
        }
    };

    Ok(ParsedSvg {
        width: width.max(1e-6),
        height: height.max(1e-6),
        segments,
    })
}

fn walk_children(
    node: &roxmltree::Node<'_, '_>,
    ctm: &Transform2D,
    use_depth: u32,
    out: &mut Vec<Segment>,
) {
    for child in node.children().filter(|n| n.is_element()) {
        handle_element(&child, ctm, use_depth, out);
    }
}

fn handle_element(
    node: &roxmltree::Node<'_, '_>,
    parent_ctm: &Transform2D,
    use_depth: u32,
    out: &mut Vec<Segment>,
) {
    let ctm = match node.attribute("transform") {
        Some(value) => parent_ctm.multiply(&parse_transform_list(value)),
        None => *parent_ctm,
    };

    let local = match node.tag_name().name() {
        "g" | "a" | "svg" => {
            walk_children(node, &ctm, use_depth, out);
            return;
        }
        // Definitions render only when instantiated via <use>.
        "defs" | "symbol" | "title" | "desc" | "metadata" | "style" => return,
        "use" => {
            expand_use(node, &ctm, use_depth, out);
            return;
        }
        "path" => interpret_path_data(node.attribute("d").unwrap_or("")),
        "rect" => shapes::rect_segments(
            attr_f64(node, "x"),
            attr_f64(node, "y"),
            attr_f64(node, "width"),
            attr_f64(node, "height"),
        ),
        "circle" => shapes::circle_segments(
            attr_f64(node, "cx"),
            attr_f64(node, "cy"),
            attr_f64(node, "r"),
        ),
        "ellipse" => shapes::ellipse_segments(
            attr_f64(node, "cx"),
            attr_f64(node, "cy"),
            attr_f64(node, "rx"),
            attr_f64(node, "ry"),
        ),
        "line" => shapes::line_segments(
            attr_f64(node, "x1"),
            attr_f64(node, "y1"),
            attr_f64(node, "x2"),
            attr_f64(node, "y2"),
        ),
        "polyline" => shapes::poly_segments(node.attribute("points").unwrap_or(""), false),
        "polygon" => shapes::poly_segments(node.attribute("points").unwrap_or(""), true),
        other => {
            debug!(element = other, "skipping unsupported element");
            return;
        }
    };

    out.extend(
        local
            .into_iter()
            .map(|s| s.transformed(&ctm, TRANSFORM_SAMPLE_TOL)),
    );
}

fn expand_use(
    node: &roxmltree::Node<'_, '_>,
    ctm: &Transform2D,
    use_depth: u32,
    out: &mut Vec<Segment>,
) {
    if use_depth >= MAX_USE_DEPTH {
        warn!("use expansion depth cap reached, stopping");
        return;
    }
    let Some(id) = node
        .attribute("href")
        .or_else(|| node.attribute(("http://www.w3.org/1999/xlink", "href")))
        .and_then(|href| href.strip_prefix('#'))
    else {
        debug!("skipping <use> without a local href");
        return;
    };
    let Some(target) = node
        .document()
        .descendants()
        .find(|n| n.attribute("id") == Some(id))
    else {
        debug!(id, "skipping <use> with unresolved reference");
        return;
    };

    // The use element's x/y fold in as an extra translation.
    let placed = ctm.multiply(&Transform2D::translation(
        attr_f64(node, "x"),
        attr_f64(node, "y"),
    ));

    if target.has_tag_name("symbol") {
        let inner = match target.attribute("transform") {
            Some(value) => placed.multiply(&parse_transform_list(value)),
            None => placed,
        };
        walk_children(&target, &inner, use_depth + 1, out);
    } else {
        handle_element(&target, &placed, use_depth + 1, out);
    }
}

fn attr_f64(node: &roxmltree::Node<'_, '_>, name: &str) -> f64 {
    node.attribute(name)
        .and_then(parse_length)
        .unwrap_or(0.0)
}

/// Parse a length attribute, tolerating a trailing unit suffix.
fn parse_length(value: &str) -> Option<f64> {
    value
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%')
        .trim()
        .parse()
        .ok()
}

fn parse_view_box(value: Option<&str>) -> Option<(f64, f64, f64, f64)> {
    let parts: Vec<f64> = value?
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    if parts.len() == 4 && parts[2] > 0.0 && parts[3] > 0.0 {
        Some((parts[0], parts[1], parts[2], parts[3]))
    } else {
        None
    }
}

/// Maximum x/y extent of the segment set, sampling curved geometry.
fn segments_extent(segments: &[Segment]) -> (f64, f64) {
    let mut max_x = 0.0f64;
    let mut max_y = 0.0f64;
    let mut visit = |p: &Point| {
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    };
    for segment in segments {
        match segment {
            Segment::Line(points) => points.iter().for_each(&mut visit),
            Segment::Arc(arc) => arc.sample(0.05).iter().for_each(&mut visit),
            Segment::Curve(curve) => {
                for i in 0..=16 {
                    visit(&curve.point_at(i as f64 / 16.0));
                }
            }
        }
    }
    (max_x.max(1e-6), max_y.max(1e-6))
}

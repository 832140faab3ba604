//! SVG `transform` attribute parsing and CTM resolution.
//!
//! Transform lists compose left-to-right (`translate(10) scale(2)` scales
//! first in local coordinates, then translates), and an element's
//! cumulative transform is its ancestors' transforms composed
//! ancestor-first down to the element itself.

use plotkit_core::Transform2D;
use tracing::debug;

/// Parse a `transform` attribute value into a single composed matrix.
///
/// Unknown function names and malformed argument lists are skipped so one
/// bad entry does not discard the rest of the list.
pub fn parse_transform_list(value: &str) -> Transform2D {
    let mut result = Transform2D::identity();
    for chunk in value.split(')') {
        let chunk = chunk.trim().trim_start_matches(',').trim();
        if chunk.is_empty() {
            continue;
        }
        let Some((name, arg_text)) = chunk.split_once('(') else {
            debug!(chunk, "skipping malformed transform entry");
            continue;
        };
        let args: Vec<f64> = arg_text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect();
        if let Some(t) = transform_from_parts(name.trim(), &args) {
            result = result.multiply(&t);
        } else {
            debug!(name = name.trim(), "skipping unsupported transform entry");
        }
    }
    result
}

fn transform_from_parts(name: &str, args: &[f64]) -> Option<Transform2D> {
    match (name, args.len()) {
        ("translate", 1) => Some(Transform2D::translation(args[0], 0.0)),
        ("translate", 2) => Some(Transform2D::translation(args[0], args[1])),
        ("scale", 1) => Some(Transform2D::scaling(args[0], args[0])),
        ("scale", 2) => Some(Transform2D::scaling(args[0], args[1])),
        ("rotate", 1) => Some(Transform2D::rotation(args[0])),
        ("rotate", 3) => Some(Transform2D::rotation_about(args[0], args[1], args[2])),
        ("skewX", 1) => Some(Transform2D::skew_x(args[0])),
        ("skewY", 1) => Some(Transform2D::skew_y(args[0])),
        ("matrix", 6) => Some(Transform2D::new(
            args[0], args[1], args[2], args[3], args[4], args[5],
        )),
        _ => None,
    }
}

/// Resolve the cumulative transform of a document node by composing every
/// ancestor's `transform` attribute ancestor-first, ending with the node's
/// own.
///
/// `<use>` indirection is not visible in an ancestor chain; the document
/// walker folds those offsets in during traversal instead.
pub fn resolve_node_ctm(node: &roxmltree::Node<'_, '_>) -> Transform2D {
    let mut chain: Vec<Transform2D> = Vec::new();
    let mut cursor = Some(*node);
    while let Some(n) = cursor {
        if n.is_element() {
            if let Some(value) = n.attribute("transform") {
                chain.push(parse_transform_list(value));
            }
        }
        cursor = n.parent();
    }
    chain
        .iter()
        .rev()
        .fold(Transform2D::identity(), |acc, t| acc.multiply(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotkit_core::Point;

    #[test]
    fn translate_defaults_second_argument_to_zero() {
        let t = parse_transform_list("translate(7)");
        let p = t.apply(&Point::new(0.0, 0.0));
        assert!(p.distance_to(&Point::new(7.0, 0.0)) < 1e-12);
    }

    #[test]
    fn list_composes_left_to_right() {
        let t = parse_transform_list("translate(10,0) scale(2)");
        // Scale applies first in local coordinates.
        let p = t.apply(&Point::new(3.0, 4.0));
        assert!(p.distance_to(&Point::new(16.0, 8.0)) < 1e-12);
    }

    #[test]
    fn matrix_entry_maps_components_directly() {
        let t = parse_transform_list("matrix(1 0 0 1 5 -3)");
        let p = t.apply(&Point::new(1.0, 1.0));
        assert!(p.distance_to(&Point::new(6.0, -2.0)) < 1e-12);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let t = parse_transform_list("garbage(1,2) translate(5,5)");
        let p = t.apply(&Point::new(0.0, 0.0));
        assert!(p.distance_to(&Point::new(5.0, 5.0)) < 1e-12);
    }

    #[test]
    fn node_ctm_composes_ancestry() {
        let svg = r#"<svg><g transform="translate(10,0)"><g transform="scale(2)"><rect transform="rotate(90)" x="0" y="0" width="1" height="1"/></g></g></svg>"#;
        let doc = roxmltree::Document::parse(svg).unwrap();
        let rect = doc
            .descendants()
            .find(|n| n.has_tag_name("rect"))
            .unwrap();
        let ctm = resolve_node_ctm(&rect);

        let manual = Transform2D::translation(10.0, 0.0)
            .multiply(&Transform2D::scaling(2.0, 2.0))
            .multiply(&Transform2D::rotation(90.0));
        for corner in [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ] {
            assert!(ctm.apply(&corner).distance_to(&manual.apply(&corner)) < 1e-9);
        }
    }
}

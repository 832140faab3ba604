//! # File Import Module
//!
//! Converts SVG artwork into placed layout items: parses the document into
//! segments, resolves curves to emitter-ready lines/arcs, and wraps the
//! result in a [`PlacedItem`] at natural size.

use anyhow::{Context, Result};
use plotkit_core::{CurveOptions, ImportError, resolve_curves};
use plotkit_svg::parse_svg;
use tracing::info;

use crate::item::PlacedItem;

/// SVG importer for converting documents into layout items.
#[derive(Debug, Clone, Default)]
pub struct SvgImporter {
    pub curve_options: CurveOptions,
}

impl SvgImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(curve_options: CurveOptions) -> Self {
        Self { curve_options }
    }

    /// Import SVG text as a new item named `name`.
    pub fn import_string(
        &self,
        name: &str,
        svg_content: &str,
    ) -> std::result::Result<PlacedItem, ImportError> {
        let parsed = parse_svg(svg_content)?;
        let segments = resolve_curves(parsed.segments, &self.curve_options);
        if segments.is_empty() {
            return Err(ImportError::NoDrawableContent);
        }
        info!(
            name,
            segments = segments.len(),
            width = parsed.width,
            height = parsed.height,
            "imported SVG"
        );
        Ok(PlacedItem::new(name, segments, parsed.width, parsed.height))
    }

    /// Import an SVG file, naming the item after the file stem.
    pub fn import_file(&self, path: &str) -> Result<PlacedItem> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read SVG file {}", path))?;
        let name = std::path::Path::new(path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("import");
        Ok(self.import_string(name, &content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotkit_core::Segment;

    #[test]
    fn import_produces_arc_preserving_item() {
        let importer = SvgImporter::new();
        let item = importer
            .import_string(
                "disc",
                r#"<svg viewBox="0 0 10 10"><circle cx="5" cy="5" r="5"/></svg>"#,
            )
            .unwrap();
        assert_eq!(item.natural_size(), (10.0, 10.0));
        assert_eq!(item.segments().len(), 2);
        assert!(item.segments().iter().all(|s| matches!(s, Segment::Arc(_))));
    }

    #[test]
    fn import_resolves_curves() {
        let importer = SvgImporter::new();
        let item = importer
            .import_string(
                "wave",
                r#"<svg viewBox="0 0 30 10"><path d="M 0 5 C 5 0 10 10 15 5 S 25 0 30 5"/></svg>"#,
            )
            .unwrap();
        assert!(item.segments().iter().all(|s| !s.is_curve()));
    }

    #[test]
    fn empty_document_is_rejected() {
        let importer = SvgImporter::new();
        let err = importer
            .import_string("empty", r#"<svg viewBox="0 0 10 10"></svg>"#)
            .unwrap_err();
        assert!(matches!(err, ImportError::NoDrawableContent));
    }
}

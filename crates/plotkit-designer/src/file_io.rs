//! Layout persistence.
//!
//! Saves and loads the whole layout (bed, items, placements, machine
//! parameters, segments) as JSON, so a reloaded layout reproduces the same
//! export byte-for-byte apart from the header timestamp.

use anyhow::{Context, Result};
use std::path::Path;

use crate::layout::Layout;

/// Serialize a layout to pretty-printed JSON.
pub fn layout_to_json(layout: &Layout) -> Result<String> {
    serde_json::to_string_pretty(layout).context("failed to serialize layout")
}

/// Deserialize a layout from JSON text.
pub fn layout_from_json(json: &str) -> Result<Layout> {
    serde_json::from_str(json).context("failed to deserialize layout")
}

/// Save a layout to a JSON file.
pub fn save_layout<P: AsRef<Path>>(layout: &Layout, path: P) -> Result<()> {
    let json = layout_to_json(layout)?;
    std::fs::write(path.as_ref(), json)
        .with_context(|| format!("failed to write layout to {}", path.as_ref().display()))
}

/// Load a layout from a JSON file.
pub fn load_layout<P: AsRef<Path>>(path: P) -> Result<Layout> {
    let json = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read layout from {}", path.as_ref().display()))?;
    layout_from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bed::Bed;
    use crate::item::PlacedItem;
    use plotkit_core::{Point, Segment};

    fn sample_layout() -> Layout {
        let segments = vec![Segment::Line(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
        ])];
        let mut item = PlacedItem::new("stroke", segments, 10.0, 10.0);
        item.set_width(40.0);
        let mut layout = Layout::new(Bed::new(250.0, 150.0));
        layout.add_item(item);
        layout
    }

    #[test]
    fn json_round_trip_preserves_layout() {
        let layout = sample_layout();
        let json = layout_to_json(&layout).unwrap();
        let reloaded = layout_from_json(&json).unwrap();
        assert_eq!(reloaded.bed(), layout.bed());
        assert_eq!(reloaded.items().len(), 1);
        assert_eq!(reloaded.items()[0].id, layout.items()[0].id);
        assert_eq!(
            reloaded.items()[0].placement(),
            layout.items()[0].placement()
        );
        assert_eq!(reloaded.items()[0].segments(), layout.items()[0].segments());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        let layout = sample_layout();
        save_layout(&layout, &path).unwrap();
        let reloaded = load_layout(&path).unwrap();
        assert_eq!(reloaded.items().len(), layout.items().len());
    }
}

//! The layout: placed items projected onto the machine bed.

use plotkit_core::{Segment, Transform2D};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::bed::Bed;
use crate::item::{MachineParams, PlacedItem};

/// Sampling tolerance when a non-uniform item scale degrades arcs, mm.
const BED_SAMPLE_TOL: f64 = 0.05;

/// Owns the placed items and computes their bed-space geometry.
///
/// Source graphics use a top-down Y axis; the bed uses bottom-up, so the
/// projection flips Y (`bed_y = pos_y + height - y * scale_y`), which also
/// inverts every arc's winding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layout {
    bed: Bed,
    items: Vec<PlacedItem>,
}

impl Layout {
    pub fn new(bed: Bed) -> Self {
        Self {
            bed,
            items: Vec::new(),
        }
    }

    pub fn bed(&self) -> &Bed {
        &self.bed
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    /// Add an item, clamping its initial position onto the bed.
    pub fn add_item(&mut self, mut item: PlacedItem) -> Uuid {
        let p = *item.placement();
        item.set_position(p.pos_x, p.pos_y, &self.bed);
        let id = item.id;
        debug!(item = %item.name, %id, "placed item on bed");
        self.items.push(item);
        id
    }

    pub fn item(&self, id: Uuid) -> Option<&PlacedItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: Uuid) -> Option<&mut PlacedItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Move an item with bed clamping.
    pub fn move_item(&mut self, id: Uuid, pos_x: f64, pos_y: f64) -> bool {
        let bed = self.bed;
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.set_position(pos_x, pos_y, &bed);
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The bed-space transform for one item.
    ///
    /// `bed_x = pos_x + x * scale_x`, `bed_y = pos_y + height - y * scale_y`
    /// (bed X = 0 is the bed center, so no extra X offset term).
    pub fn bed_transform(item: &PlacedItem) -> Transform2D {
        let p = item.placement();
        Transform2D::new(
            item.scale_x(),
            0.0,
            0.0,
            -item.scale_y(),
            p.pos_x,
            p.pos_y + p.height,
        )
    }

    /// Every item's segments in bed coordinates, in item order, paired with
    /// the item's machine parameters.
    pub fn bed_segments(&self) -> Vec<(Segment, MachineParams)> {
        let mut out = Vec::new();
        for item in &self.items {
            let t = Self::bed_transform(item);
            for segment in item.segments() {
                out.push((segment.transformed(&t, BED_SAMPLE_TOL), item.machine));
            }
        }
        out
    }
}

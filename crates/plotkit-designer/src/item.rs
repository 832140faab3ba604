//! Placed artwork items and their machine parameters.

use plotkit_core::Segment;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bed::Bed;

/// Per-item machine parameters for the plotting/placing head.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineParams {
    /// Z height for travel moves, mm.
    pub tool_up_height: f64,
    /// Z height with the tool engaged, mm.
    pub tool_down_height: f64,
    /// Feed rate while cutting/drawing, mm/min.
    pub work_feed_rate: f64,
    /// Feed rate for rapid travel, mm/min.
    pub travel_feed_rate: f64,
}

impl Default for MachineParams {
    fn default() -> Self {
        Self {
            tool_up_height: 5.0,
            tool_down_height: 0.0,
            work_feed_rate: 1200.0,
            travel_feed_rate: 3000.0,
        }
    }
}

/// Size and position of an item on the bed.
///
/// `pos_x` is the bed X of the item's left edge (bed X = 0 is the bed
/// center); `pos_y` is the bed Y of the item's bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub width: f64,
    pub height: f64,
    pub pos_x: f64,
    pub pos_y: f64,
    pub keep_aspect: bool,
}

/// One imported artwork unit placed on the bed.
///
/// Segments are stored in the item's natural document units; the layout
/// projects them into bed space on export. Mutation goes through the
/// setters so the aspect link and bed clamping always hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedItem {
    pub id: Uuid,
    pub name: String,
    segments: Vec<Segment>,
    natural_width: f64,
    natural_height: f64,
    placement: Placement,
    pub machine: MachineParams,
}

impl PlacedItem {
    /// Create an item at natural size, left edge on the bed center line.
    pub fn new(
        name: impl Into<String>,
        segments: Vec<Segment>,
        natural_width: f64,
        natural_height: f64,
    ) -> Self {
        let natural_width = natural_width.max(1e-6);
        let natural_height = natural_height.max(1e-6);
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            segments,
            natural_width,
            natural_height,
            placement: Placement {
                width: natural_width,
                height: natural_height,
                pos_x: -natural_width / 2.0,
                pos_y: 0.0,
                keep_aspect: true,
            },
            machine: MachineParams::default(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn natural_size(&self) -> (f64, f64) {
        (self.natural_width, self.natural_height)
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.natural_width / self.natural_height
    }

    /// Set the placed width; with `keep_aspect` the height follows the
    /// natural aspect ratio.
    pub fn set_width(&mut self, width: f64) {
        self.placement.width = width.max(1e-6);
        if self.placement.keep_aspect {
            self.placement.height = self.placement.width / self.aspect_ratio();
        }
    }

    /// Set the placed height; with `keep_aspect` the width follows the
    /// natural aspect ratio.
    pub fn set_height(&mut self, height: f64) {
        self.placement.height = height.max(1e-6);
        if self.placement.keep_aspect {
            self.placement.width = self.placement.height * self.aspect_ratio();
        }
    }

    pub fn set_keep_aspect(&mut self, keep: bool) {
        self.placement.keep_aspect = keep;
        if keep {
            self.placement.height = self.placement.width / self.aspect_ratio();
        }
    }

    /// Move the item, clamped so it stays on the bed.
    pub fn set_position(&mut self, pos_x: f64, pos_y: f64, bed: &Bed) {
        let min_x = -bed.half_width();
        let max_x = bed.half_width() - self.placement.width;
        let max_y = bed.height - self.placement.height;
        self.placement.pos_x = pos_x.clamp(min_x, max_x.max(min_x));
        self.placement.pos_y = pos_y.clamp(0.0, max_y.max(0.0));
    }

    pub fn scale_x(&self) -> f64 {
        self.placement.width / self.natural_width
    }

    pub fn scale_y(&self) -> f64 {
        self.placement.height / self.natural_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_20x10() -> PlacedItem {
        PlacedItem::new("art", Vec::new(), 20.0, 10.0)
    }

    #[test]
    fn width_drives_height_under_aspect_lock() {
        let mut item = item_20x10();
        item.set_width(100.0);
        assert!((item.placement().height - 50.0).abs() < 1e-9);
        item.set_height(10.0);
        assert!((item.placement().width - 20.0).abs() < 1e-9);
    }

    #[test]
    fn aspect_unlock_frees_both_axes() {
        let mut item = item_20x10();
        item.set_keep_aspect(false);
        item.set_width(100.0);
        assert!((item.placement().height - 10.0).abs() < 1e-9);
    }

    #[test]
    fn position_clamps_to_bed() {
        let bed = Bed::new(200.0, 100.0);
        let mut item = item_20x10();
        item.set_position(-500.0, -50.0, &bed);
        assert_eq!(item.placement().pos_x, -100.0);
        assert_eq!(item.placement().pos_y, 0.0);
        item.set_position(500.0, 500.0, &bed);
        assert_eq!(item.placement().pos_x, 100.0 - 20.0);
        assert_eq!(item.placement().pos_y, 100.0 - 10.0);
    }
}

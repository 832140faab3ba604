//! # Plotkit Designer
//!
//! Layout and export tools for Plotkit: place imported artwork on a
//! machine bed and turn it into a motion program.
//!
//! ## Core Components
//!
//! - **Bed**: physical workspace bounds (X centered, Y at the bottom edge)
//! - **PlacedItem**: one imported artwork unit with independent size,
//!   position and machine parameters
//! - **Layout**: owns the items and projects their segments into bed
//!   coordinates (including the top-down to bottom-up Y flip)
//! - **SvgImporter**: SVG text/file to a ready-to-place item
//! - **GcodeGenerator**: bed-space segments to a complete G-code program
//! - **Layout persistence**: save/load the workspace as JSON
//!
//! ## Usage
//!
//! ```rust,ignore
//! use plotkit_designer::{Bed, GcodeGenerator, Layout, SvgImporter};
//!
//! let mut layout = Layout::new(Bed::default());
//! let item = SvgImporter::new().import_file("artwork.svg")?;
//! let id = layout.add_item(item);
//! layout.item_mut(id).unwrap().set_width(120.0);
//!
//! let program = GcodeGenerator::default().generate(&layout)?;
//! std::fs::write("artwork.gcode", program.text())?;
//! ```

pub mod bed;
pub mod file_io;
pub mod gcode_gen;
pub mod import;
pub mod item;
pub mod layout;

pub use bed::Bed;
pub use file_io::{layout_from_json, layout_to_json, load_layout, save_layout};
pub use gcode_gen::{
    DISCONTINUITY_THRESHOLD, GcodeGenerator, GcodeProgram, NOISE_THRESHOLD, ProgramStats, ToolMode,
};
pub use import::SvgImporter;
pub use item::{MachineParams, PlacedItem, Placement};
pub use layout::Layout;

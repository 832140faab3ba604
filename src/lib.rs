//! # Plotkit
//!
//! SVG to G-code conversion and streaming for pen plotters and
//! pick-and-place heads.
//!
//! ## Architecture
//!
//! Plotkit is organized as a workspace with focused crates:
//!
//! 1. **plotkit-core** - geometry primitives, curve flattening, arc fitting
//! 2. **plotkit-svg** - SVG parsing: path data, transforms, shapes
//! 3. **plotkit-designer** - bed layout, placed items, G-code generation
//! 4. **plotkit-communication** - device link and ack-gated streaming
//! 5. **plotkit** - this binary, wiring the pipeline together
//!
//! The geometry pipeline is pure text-in/text-out computation; the only
//! stateful piece is the streaming sequencer, which is driven entirely by
//! caller-delivered device events.

pub use plotkit_communication as communication;
pub use plotkit_core as geometry;
pub use plotkit_designer as designer;
pub use plotkit_svg as svg;

pub use plotkit_communication::{DeviceLink, JogSequencer, NoOpDeviceLink, PositionReport};
pub use plotkit_core::{
    ArcSegment, CurveOptions, CurveStrategy, Error, Point, Result, Segment, Transform2D,
};
pub use plotkit_designer::{
    Bed, GcodeGenerator, GcodeProgram, Layout, MachineParams, PlacedItem, SvgImporter, ToolMode,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Structured console output with `RUST_LOG` environment variable support;
/// defaults to `info` level. Logs go to stderr so G-code on stdout stays
/// clean.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

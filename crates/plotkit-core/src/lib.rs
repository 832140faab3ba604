//! # Plotkit Core
//!
//! Core geometry for the Plotkit pipeline: points, explicit 2D affine
//! transforms, the segment model shared by every stage, and the curve
//! flattener / arc fitter. Everything in this crate is pure, synchronous
//! computation over immutable inputs.

pub mod error;
pub mod flatten;
pub mod geometry;

pub use error::{DeviceError, Error, GcodeError, ImportError, Result};
pub use flatten::{
    CurveOptions, CurveStrategy, DEFAULT_ARC_TOLERANCE, DEFAULT_FLATNESS,
    circle_from_three_points, fit_curve_to_arcs, flatten_curve, resolve_curves, split_cubic,
};
pub use geometry::{ArcSegment, CurveControl, CurveSegment, Point, Segment, Transform2D};

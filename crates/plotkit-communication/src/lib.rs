//! # Plotkit Communication
//!
//! The device-facing side of Plotkit: a minimal outbound link abstraction,
//! the ack-gated jog/streaming sequencer, and parsing for inbound status
//! lines. The concrete transport (serial, TCP) is an external collaborator
//! injected through [`DeviceLink`].

pub mod link;
pub mod sequencer;
pub mod status;

pub use link::{DeviceLink, NoOpDeviceLink};
pub use sequencer::{JogSequencer, RunProgress, SequencerState};
pub use status::{AxisPosition, PositionReport, is_ack};

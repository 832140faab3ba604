//! Error handling for Plotkit
//!
//! Provides error types for all layers of the pipeline:
//! - Import errors (SVG document level)
//! - G-code errors (export/generation)
//! - Device errors (streaming/sequencer)
//!
//! Malformed *input data* inside the geometry pipeline never surfaces as an
//! error: bad path commands and degenerate segments are skipped locally so a
//! partially damaged document still imports. These types cover the
//! conditions a caller must be able to observe.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// SVG import error type
///
/// Represents document-level failures. Element-level problems (a malformed
/// path command, a degenerate shape) are handled by skip-and-continue and
/// never raise.
#[derive(Error, Debug, Clone)]
pub enum ImportError {
    /// The input text is not an SVG document
    #[error("Not an SVG document: missing <svg> root element")]
    NotSvg,

    /// The XML could not be parsed at all
    #[error("Malformed XML: {reason}")]
    MalformedXml {
        /// Description of the XML failure.
        reason: String,
    },

    /// The document parsed but contained nothing drawable
    #[error("Document contains no drawable geometry")]
    NoDrawableContent,
}

/// G-code generation error type
#[derive(Error, Debug, Clone)]
pub enum GcodeError {
    /// Export was requested for a layout with no placed items
    #[error("Nothing to export: layout contains no placed items")]
    NothingToExport,

    /// A segment reached the emitter in a form it cannot encode
    #[error("Unsupported segment reached the emitter: {reason}")]
    UnsupportedSegment {
        /// Description of the offending segment.
        reason: String,
    },
}

/// Device/streaming error type
///
/// Represents errors in the ack-gated line streaming protocol.
#[derive(Error, Debug, Clone)]
pub enum DeviceError {
    /// No device link is available
    #[error("Device not connected")]
    NotConnected,

    /// A run was started while another run is in flight
    #[error("A run is already in progress")]
    RunInProgress,

    /// The device never acknowledged the outstanding line
    #[error("No acknowledgment received within {timeout_ms}ms")]
    AckTimeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Sending a line over the link failed
    #[error("Failed to send command: {reason}")]
    SendFailed {
        /// The transport-level failure description.
        reason: String,
    },
}

/// Umbrella error type for the whole pipeline
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// SVG import failed
    #[error(transparent)]
    Import(#[from] ImportError),

    /// G-code generation failed
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Device streaming failed
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Result alias using the umbrella [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

//! Ack-gated line streaming.
//!
//! A two-state machine per run: `Idle` and `AwaitingAck`. Exactly one
//! command may be outstanding at a time; line N+1 is never transmitted
//! before line N is acknowledged. Each run carries a generation counter so
//! a late acknowledgment for a cancelled run can never advance the next
//! one.
//!
//! The optional acknowledgment timeout is a robustness addition over the
//! bare protocol: without it a silent device stalls the run forever.
//! Polling [`JogSequencer::check_timeout`] surfaces the stall as
//! [`DeviceError::AckTimeout`] and returns to `Idle`.

use std::time::{Duration, Instant};

use plotkit_core::DeviceError;
use tracing::{debug, warn};

use crate::link::DeviceLink;
use crate::status::is_ack;

/// Streaming state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    AwaitingAck,
}

/// What one inbound response did to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunProgress {
    /// The next line was transmitted.
    Sent {
        /// Index of the line just sent.
        index: usize,
    },
    /// The last line was acknowledged; the run is complete.
    Completed,
    /// The response was stale or not an acknowledgment; nothing changed.
    Ignored,
}

/// Single-flight G-code line streamer.
pub struct JogSequencer<L: DeviceLink> {
    link: L,
    lines: Vec<String>,
    index: usize,
    state: SequencerState,
    generation: u64,
    sent_at: Option<Instant>,
    ack_timeout: Option<Duration>,
}

impl<L: DeviceLink> JogSequencer<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            lines: Vec::new(),
            index: 0,
            state: SequencerState::Idle,
            generation: 0,
            sent_at: None,
            ack_timeout: None,
        }
    }

    /// Enable the acknowledgment timeout surfaced by
    /// [`check_timeout`](Self::check_timeout).
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = Some(timeout);
        self
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SequencerState::AwaitingAck
    }

    /// Identifier of the current run; bumped on every start and cancel.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Start streaming `lines`: transmits the first line and waits.
    ///
    /// An empty line list completes immediately without touching the
    /// device.
    pub fn start_run(&mut self, lines: Vec<String>) -> Result<RunProgress, DeviceError> {
        if self.is_running() {
            return Err(DeviceError::RunInProgress);
        }
        if !self.link.is_connected() {
            return Err(DeviceError::NotConnected);
        }
        self.generation += 1;
        if lines.is_empty() {
            debug!("run with no lines completes immediately");
            return Ok(RunProgress::Completed);
        }
        self.lines = lines;
        self.index = 0;
        self.transmit_current()?;
        Ok(RunProgress::Sent { index: 0 })
    }

    /// Feed one inbound device line to the state machine.
    ///
    /// Acknowledgments advance the run; any other line (position reports,
    /// chatter) and any ack arriving while idle - including a late ack for
    /// a cancelled generation - is ignored.
    pub fn handle_response(&mut self, response: &str) -> Result<RunProgress, DeviceError> {
        if self.state != SequencerState::AwaitingAck || !is_ack(response) {
            return Ok(RunProgress::Ignored);
        }
        self.index += 1;
        if self.index >= self.lines.len() {
            debug!(generation = self.generation, "run completed");
            self.reset_to_idle();
            return Ok(RunProgress::Completed);
        }
        self.transmit_current()?;
        Ok(RunProgress::Sent { index: self.index })
    }

    /// Abort the run from any state; safe to call repeatedly.
    ///
    /// Bumps the generation so anything still in flight is stale.
    pub fn cancel(&mut self) {
        if self.is_running() {
            debug!(generation = self.generation, "run cancelled");
        }
        self.generation += 1;
        self.reset_to_idle();
    }

    /// Surface a stalled device: when the configured timeout has elapsed
    /// with no acknowledgment, the run is dropped and the stall reported.
    pub fn check_timeout(&mut self) -> Result<(), DeviceError> {
        let (Some(timeout), Some(sent_at)) = (self.ack_timeout, self.sent_at) else {
            return Ok(());
        };
        if self.state == SequencerState::AwaitingAck && sent_at.elapsed() >= timeout {
            warn!(
                generation = self.generation,
                index = self.index,
                "no acknowledgment within timeout"
            );
            self.generation += 1;
            self.reset_to_idle();
            return Err(DeviceError::AckTimeout {
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        Ok(())
    }

    fn transmit_current(&mut self) -> Result<(), DeviceError> {
        let line = self.lines[self.index].clone();
        if let Err(e) = self.link.send_line(&line) {
            warn!(error = %e, "send failed, dropping run");
            self.generation += 1;
            self.reset_to_idle();
            return Err(e);
        }
        self.state = SequencerState::AwaitingAck;
        self.sent_at = Some(Instant::now());
        Ok(())
    }

    fn reset_to_idle(&mut self) {
        self.state = SequencerState::Idle;
        self.lines.clear();
        self.index = 0;
        self.sent_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::NoOpDeviceLink;

    fn three_line_run() -> Vec<String> {
        vec!["G1 X1".to_string(), "G1 X2".to_string(), "G1 X3".to_string()]
    }

    #[test]
    fn lines_are_sent_one_per_ack() {
        let mut seq = JogSequencer::new(NoOpDeviceLink::new());
        seq.start_run(three_line_run()).unwrap();
        assert_eq!(seq.link().sent, vec!["G1 X1"]);

        assert_eq!(
            seq.handle_response("ok").unwrap(),
            RunProgress::Sent { index: 1 }
        );
        assert_eq!(seq.link().sent, vec!["G1 X1", "G1 X2"]);

        assert_eq!(
            seq.handle_response("ok").unwrap(),
            RunProgress::Sent { index: 2 }
        );
        assert_eq!(seq.link().sent, vec!["G1 X1", "G1 X2", "G1 X3"]);

        assert_eq!(seq.handle_response("ok").unwrap(), RunProgress::Completed);
        assert_eq!(seq.state(), SequencerState::Idle);

        // A further ack does nothing.
        assert_eq!(seq.handle_response("ok").unwrap(), RunProgress::Ignored);
        assert_eq!(seq.link().sent.len(), 3);
    }

    #[test]
    fn non_ack_lines_do_not_advance() {
        let mut seq = JogSequencer::new(NoOpDeviceLink::new());
        seq.start_run(three_line_run()).unwrap();
        assert_eq!(
            seq.handle_response("POS:0,0,0|0,0,0").unwrap(),
            RunProgress::Ignored
        );
        assert_eq!(seq.link().sent.len(), 1);
    }

    #[test]
    fn cancel_then_late_ack_is_stale() {
        let mut seq = JogSequencer::new(NoOpDeviceLink::new());
        seq.start_run(three_line_run()).unwrap();
        let gen_before = seq.generation();
        seq.cancel();
        assert_eq!(seq.state(), SequencerState::Idle);
        assert!(seq.generation() > gen_before);

        // The device acks the cancelled run's line; nothing is sent.
        assert_eq!(seq.handle_response("ok").unwrap(), RunProgress::Ignored);
        assert_eq!(seq.link().sent.len(), 1);

        // A fresh run starts cleanly afterwards.
        seq.start_run(vec!["G1 X9".to_string()]).unwrap();
        assert_eq!(seq.link().sent.last().unwrap(), "G1 X9");
    }

    #[test]
    fn second_start_while_running_is_rejected() {
        let mut seq = JogSequencer::new(NoOpDeviceLink::new());
        seq.start_run(three_line_run()).unwrap();
        assert!(matches!(
            seq.start_run(three_line_run()),
            Err(DeviceError::RunInProgress)
        ));
    }

    #[test]
    fn empty_run_completes_without_sending() {
        let mut seq = JogSequencer::new(NoOpDeviceLink::new());
        assert_eq!(seq.start_run(Vec::new()).unwrap(), RunProgress::Completed);
        assert!(seq.link().sent.is_empty());
        assert_eq!(seq.state(), SequencerState::Idle);
    }

    #[test]
    fn disconnected_link_fails_cleanly() {
        let mut link = NoOpDeviceLink::new();
        link.connected = false;
        let mut seq = JogSequencer::new(link);
        assert!(matches!(
            seq.start_run(three_line_run()),
            Err(DeviceError::NotConnected)
        ));
        assert_eq!(seq.state(), SequencerState::Idle);
    }

    #[test]
    fn zero_timeout_trips_immediately() {
        let mut seq =
            JogSequencer::new(NoOpDeviceLink::new()).with_ack_timeout(Duration::from_millis(0));
        seq.start_run(three_line_run()).unwrap();
        assert!(matches!(
            seq.check_timeout(),
            Err(DeviceError::AckTimeout { .. })
        ));
        assert_eq!(seq.state(), SequencerState::Idle);

        // State is not corrupted: a new run works.
        seq.start_run(vec!["G1 X1".to_string()]).unwrap();
        assert!(seq.is_running());
    }

    #[test]
    fn timeout_is_disarmed_while_idle() {
        let mut seq =
            JogSequencer::new(NoOpDeviceLink::new()).with_ack_timeout(Duration::from_millis(0));
        assert!(seq.check_timeout().is_ok());
    }
}

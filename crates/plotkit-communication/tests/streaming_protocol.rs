//! Streaming protocol exercised through the public API.

use plotkit_communication::{
    JogSequencer, NoOpDeviceLink, PositionReport, RunProgress, SequencerState,
};

#[test]
fn interleaved_position_reports_do_not_break_the_run() {
    let mut seq = JogSequencer::new(NoOpDeviceLink::new());
    seq.start_run(vec!["G0 X0 Y0".into(), "G1 X10 Y0 F1200".into()])
        .unwrap();

    // Devices stream position chatter between acks; the run must only
    // advance on the acks.
    let inbound = [
        "POS:0.000,0.000,5.000|0.000,0.000,5.000",
        "ok",
        "POS:4.100,0.000,0.000|4.100,0.000,0.000",
        "POS:9.800,0.000,0.000|9.800,0.000,0.000",
        "ok",
    ];
    let mut completed = false;
    for line in inbound {
        if let Some(report) = PositionReport::parse(line) {
            assert!(report.machine.x >= 0.0);
            continue;
        }
        if seq.handle_response(line).unwrap() == RunProgress::Completed {
            completed = true;
        }
    }
    assert!(completed);
    assert_eq!(seq.state(), SequencerState::Idle);
    assert_eq!(seq.link().sent.len(), 2);
}

#[test]
fn reconnection_after_cancel_starts_a_fresh_generation() {
    let mut seq = JogSequencer::new(NoOpDeviceLink::new());
    seq.start_run(vec!["G1 X1".into(), "G1 X2".into()]).unwrap();
    let first_gen = seq.generation();

    // Device drops; the caller cancels, then reconnects and retries.
    seq.cancel();
    seq.start_run(vec!["G1 X1".into(), "G1 X2".into()]).unwrap();
    assert!(seq.generation() > first_gen);

    // Acks for the new run drive it to completion as usual.
    assert_eq!(
        seq.handle_response("ok").unwrap(),
        RunProgress::Sent { index: 1 }
    );
    assert_eq!(seq.handle_response("ok").unwrap(), RunProgress::Completed);
}

use std::time::{Duration, Instant};

use joyrumble::playback::{CancelToken, FaultPolicy, Outcome, Pacing, PlaybackError, Scheduler};
use joyrumble::rumble::{ControlFrame, IDLE_PAYLOAD, encode_payload};
use joyrumble::sequence::CommandSequence;
use joyrumble::transport::{FailureMode, MemoryTransport, Transport};
use pretty_assertions::assert_eq;

// Generous enough for a loaded CI box; the spin wait itself is sub-millisecond.
const SLACK: Duration = Duration::from_millis(50);

fn ramp(n: usize, fps: f64) -> CommandSequence {
    let frames = (0..n)
        .map(|i| ControlFrame::new(160.0 + 40.0 * i as f64, 0.6, 80.0, 0.25))
        .collect();
    CommandSequence::new(fps, frames).unwrap()
}

#[test]
fn three_frames_at_66_fps_on_one_device() {
    let seq = ramp(3, 66.0);
    let dev = MemoryTransport::new("pad");
    let log = dev.log();

    let started = Instant::now();
    let report = Scheduler::new()
        .play(&seq, &mut [dev], &CancelToken::new())
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(log.len(), 4);
    let sent = log.payloads();
    for (i, frame) in seq.frames().iter().enumerate() {
        assert_eq!(sent[i], encode_payload(frame));
    }
    assert_eq!(sent[3], IDLE_PAYLOAD);

    let nominal = Duration::from_secs_f64(3.0 / 66.0);
    assert!(elapsed >= nominal, "finished early: {elapsed:?}");
    assert!(elapsed <= nominal + SLACK, "took too long: {elapsed:?}");
    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(report.frames_sent, 3);
}

#[test]
fn frames_land_on_their_deadlines() {
    let seq = ramp(5, 100.0);
    let dev = MemoryTransport::new("pad");
    let log = dev.log();
    let started = Instant::now();
    Scheduler::new().play(&seq, &mut [dev], &CancelToken::new()).unwrap();

    // frame i goes out no earlier than i frame periods after start
    let entries = log.entries();
    for (i, e) in entries.iter().take(5).enumerate() {
        let offset = e.at.duration_since(started);
        assert!(offset + Duration::from_millis(1) >= Duration::from_millis(10 * i as u64), "frame {i} at {offset:?}");
    }
}

#[test]
fn cancel_between_frames_stops_both_devices_once() {
    let seq = ramp(10, 66.0);
    let cancel = CancelToken::new();

    let a = MemoryTransport::new("left");
    let trigger = cancel.clone();
    // the second device is the last one to see frame 1
    let b = MemoryTransport::new("right").with_send_hook(move |n| {
        if n == 2 {
            trigger.cancel();
        }
    });
    let (log_a, log_b) = (a.log(), b.log());
    let mut devices: Vec<Box<dyn Transport>> = vec![Box::new(a), Box::new(b)];

    let report = Scheduler::new().play(&seq, &mut devices, &cancel).unwrap();

    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(report.frames_sent, 2);
    let expected = vec![
        encode_payload(&seq.frames()[0]),
        encode_payload(&seq.frames()[1]),
        IDLE_PAYLOAD,
    ];
    assert_eq!(log_a.payloads(), expected);
    assert_eq!(log_b.payloads(), expected);
    for log in [&log_a, &log_b] {
        assert_eq!(log.payloads().iter().filter(|p| p.is_idle()).count(), 1);
    }
}

#[test]
fn failing_device_does_not_starve_the_other() {
    let seq = ramp(10, 200.0);
    let bad = MemoryTransport::new("bad").failing(FailureMode::Always);
    let good = MemoryTransport::new("good");
    let good_log = good.log();
    let mut devices: Vec<Box<dyn Transport>> = vec![Box::new(bad), Box::new(good)];

    let err = Scheduler::new()
        .play(&seq, &mut devices, &CancelToken::new())
        .unwrap_err();

    let mut expected: Vec<_> = seq.frames().iter().map(encode_payload).collect();
    expected.push(IDLE_PAYLOAD);
    assert_eq!(good_log.payloads(), expected);

    let PlaybackError::Faulted(report) = err else {
        panic!("expected a fault report");
    };
    assert_eq!(report.outcome, Outcome::Faulted);
    assert_eq!(report.frames_sent, 10);
    assert_eq!(report.failed_devices(), vec!["bad"]);
    assert!(report.failures.iter().all(|f| f.device == "bad"));
    assert_eq!(report.failures.first().and_then(|f| f.frame), Some(0));
}

#[test]
fn fault_error_names_the_device() {
    let bad = MemoryTransport::new("joycon-r").failing(FailureMode::After(3));
    let good = MemoryTransport::new("joycon-l");
    let mut devices: Vec<Box<dyn Transport>> = vec![Box::new(good), Box::new(bad)];
    let err = Scheduler::new()
        .with_fault_policy(FaultPolicy::ContinueOthers)
        .play(&ramp(6, 200.0), &mut devices, &CancelToken::new())
        .unwrap_err();
    assert_eq!(err.to_string(), "playback faulted on joycon-r");
}

#[test]
fn hybrid_pacing_keeps_the_same_contract() {
    let seq = ramp(6, 66.0);
    let dev = MemoryTransport::new("pad");
    let log = dev.log();
    let started = Instant::now();
    let report = Scheduler::new()
        .with_pacing(Pacing::Hybrid { spin_window: Duration::from_millis(2) })
        .play(&seq, &mut [dev], &CancelToken::new())
        .unwrap();
    let elapsed = started.elapsed();

    let nominal = seq.duration();
    assert!(elapsed >= nominal);
    assert!(elapsed <= nominal + SLACK);
    assert_eq!(log.len(), 7);
    assert_eq!(report.outcome, Outcome::Completed);
}

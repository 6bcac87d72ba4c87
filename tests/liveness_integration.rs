//! Integration tests for the liveness state machine
//!
//! Scenarios and properties over the public engine API

use livecheck::core::LivenessEngine;
use livecheck::types::{FaceSignals, FrameEvent, LivenessState, ReasonCode, Step};
use livecheck::{STATUS_NO_FACE, STATUS_TIMED_OUT};
use pretty_assertions::assert_eq;

const T: u64 = 50_000;

/// Blink, turn, smile in quick succession
#[test]
fn test_full_sequence_scenarios() {
    let mut engine = LivenessEngine::new(T);

    let state = engine.notify_face(Some(0.1), Some(0.2), None, None, T).clone();
    assert_eq!(state.step, Step::TurnLeft);
    assert!(!state.passed);

    let state = engine.notify_face(None, None, None, Some(-20.0), T + 100).clone();
    assert_eq!(state.step, Step::Smile);
    assert!(!state.passed);

    let state = engine.notify_face(None, None, Some(0.85), None, T + 200).clone();
    assert_eq!(state.step, Step::Done);
    assert!(state.passed);
}

/// Open eyes keep the machine on blink with a progress prompt
#[test]
fn test_eyes_not_closed_enough() {
    let mut engine = LivenessEngine::new(T);
    let state = engine.notify_face(Some(0.5), Some(0.5), None, None, T);
    assert_eq!(state.step, Step::Blink);
    assert!(!state.passed);
    assert_eq!(state.status, "Face ok. Blink your eyes…");
}

/// A stalled blink step shows the timeout message, not the prompt
#[test]
fn test_timeout_on_blink_reports_timeout() {
    let mut engine = LivenessEngine::new(T);
    let state = engine.notify_face(Some(0.5), Some(0.5), None, None, T + 16_000);
    assert_eq!(state.step, Step::Blink);
    assert_eq!(state.status, STATUS_TIMED_OUT);
    assert_eq!(engine.last_step_ms(), T + 16_000);
}

/// Timeout boundary measured from the last advance
#[test]
fn test_timeout_boundary_from_turn_left() {
    let turn_left = || {
        let mut engine = LivenessEngine::new(0);
        engine.notify_face(Some(0.0), Some(0.0), None, None, T);
        assert_eq!(engine.step(), Step::TurnLeft);
        engine
    };

    let mut engine = turn_left();
    engine.notify_face(None, None, None, Some(5.0), T + 14_999);
    assert_eq!(engine.step(), Step::TurnLeft);

    // a satisfying signal is ignored once the step has timed out
    let mut engine = turn_left();
    engine.notify_face(None, None, None, Some(-45.0), T + 15_001);
    assert_eq!(engine.state(), &LivenessState::at(Step::Blink, STATUS_TIMED_OUT));
}

/// Missing readings never advance, however many frames arrive
#[test]
fn test_missing_fields_fail_closed() {
    // blink with one or both eyes missing
    let mut engine = LivenessEngine::new(T);
    for i in 0..100 {
        engine.notify_face(None, Some(0.0), Some(1.0), Some(-90.0), T + i);
        engine.notify_face(Some(0.0), None, Some(1.0), Some(-90.0), T + i);
        engine.notify_face(None, None, Some(1.0), Some(-90.0), T + i);
    }
    assert_eq!(engine.step(), Step::Blink);

    // turn left with yaw missing
    engine.notify_face(Some(0.0), Some(0.0), None, None, T + 200);
    for i in 0..100 {
        engine.notify_face(Some(0.0), Some(0.0), Some(1.0), None, T + 200 + i);
    }
    assert_eq!(engine.step(), Step::TurnLeft);

    // smile with smile missing
    engine.notify_face(None, None, None, Some(-30.0), T + 400);
    for i in 0..100 {
        engine.notify_face(Some(0.0), Some(0.0), None, Some(-30.0), T + 400 + i);
    }
    assert_eq!(engine.step(), Step::Smile);
    assert!(!engine.passed());
}

/// Nothing changes after passing
#[test]
fn test_terminal_state_is_frozen() {
    let mut engine = LivenessEngine::new(T);
    engine.notify_face(Some(0.0), Some(0.0), None, None, T);
    engine.notify_face(None, None, None, Some(-20.0), T);
    engine.notify_face(None, None, Some(0.9), None, T);
    let frozen = engine.state().clone();
    assert!(frozen.passed);

    let inputs = [
        (Some(0.0), Some(0.0), Some(0.0), Some(0.0)),
        (None, None, None, None),
        (Some(1.0), Some(1.0), Some(1.0), Some(90.0)),
    ];
    for (i, (l, r, s, y)) in inputs.into_iter().enumerate() {
        // far past any timeout
        engine.notify_face(l, r, s, y, T + 1_000_000 * (i as u64 + 1));
        assert_eq!(engine.state(), &frozen);
        engine.notify_no_face();
        assert_eq!(engine.state(), &frozen);
    }
}

/// Steps only ever move forward by one, or reset to blink on timeout
#[test]
fn test_only_forward_or_reset() {
    let mut engine = LivenessEngine::new(0);
    let frames = [
        FaceSignals::new(Some(0.9), Some(0.9), Some(0.9), Some(-30.0)),
        FaceSignals::new(Some(0.1), Some(0.1), Some(0.9), Some(-30.0)),
        FaceSignals::new(Some(0.1), Some(0.1), Some(0.9), Some(10.0)),
        FaceSignals::new(None, None, None, None),
        FaceSignals::new(Some(0.1), Some(0.1), Some(0.1), Some(-30.0)),
        FaceSignals::new(Some(0.1), Some(0.1), Some(0.9), Some(-30.0)),
    ];
    let mut now = 0;
    let mut previous = engine.step();
    for round in 0..4u64 {
        for signals in frames {
            now += 700 + round * 3_000;
            let output = engine.advance(&FrameEvent::Face(signals), now);
            let step = output.state.step;
            let ok = step == previous
                || step.index() == previous.index() + 1
                || (step == Step::Blink && output.reason == ReasonCode::L002_STEP_TIMEOUT);
            assert!(ok, "{} -> {} ({})", previous, step, output.reason);
            assert!(!output.state.passed || step == Step::Done);
            previous = step;
        }
    }
}

/// No-face leaves step and instruction alone
#[test]
fn test_no_face_only_touches_status() {
    let mut engine = LivenessEngine::new(T);
    engine.notify_face(Some(0.0), Some(0.0), None, None, T);
    let before = engine.state().clone();
    let state = engine.notify_no_face();
    assert_eq!(state.step, before.step);
    assert_eq!(state.instruction, before.instruction);
    assert_eq!(state.status, STATUS_NO_FACE);
}

/// Output serializes to JSON and back
#[test]
fn test_json_output_valid() {
    let mut engine = LivenessEngine::new(T);
    let output = engine.advance(&FrameEvent::NoFace, T);

    let json = serde_json::to_string(&output).unwrap();
    assert!(json.contains("\"step\":\"BLINK\""));
    assert!(json.contains("\"reason\":\"L001_NO_FACE\""));

    let back: livecheck::types::StepOutput = serde_json::from_str(&json).unwrap();
    assert_eq!(back.state, output.state);
}

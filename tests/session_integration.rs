//! Integration tests for the session worker and its channels

use std::sync::Arc;

use tokio::sync::Mutex;

use livecheck::core::spawn_session;
use livecheck::types::{FaceSignals, Step, TimedFrame};
use livecheck::{Error, LivenessConfig};

fn blink(t: u64) -> TimedFrame {
    TimedFrame::face(t, FaceSignals::new(Some(0.1), Some(0.1), None, None))
}

#[tokio::test]
async fn test_worker_publishes_latest_state() {
    let handle = spawn_session(LivenessConfig::default(), 0, 8);
    let mut states = handle.states();
    assert_eq!(states.borrow().step, Step::Blink);

    handle.send(blink(10)).await.unwrap();
    states.changed().await.unwrap();
    assert_eq!(states.borrow_and_update().step, Step::TurnLeft);

    let summary = handle.finish().await.unwrap();
    assert_eq!(summary.frames, 1);
    assert_eq!(summary.state.step, Step::TurnLeft);
    assert!(!summary.state.passed);
}

#[tokio::test]
async fn test_concurrent_producers_are_serialized() {
    let handle = spawn_session(LivenessConfig::default(), 0, 4);
    // Producers share one clock; stamping and sending happen under the lock
    let clock = Arc::new(Mutex::new(0u64));

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let tx = handle.sender();
        let clock = Arc::clone(&clock);
        tasks.push(tokio::spawn(async move {
            for _ in 0..10 {
                let mut now_ms = clock.lock().await;
                *now_ms += 10;
                let frame = TimedFrame::face(*now_ms, FaceSignals::new(Some(0.9), Some(0.9), None, None));
                tx.send(frame).await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let summary = handle.finish().await.unwrap();
    assert_eq!(summary.frames, 40);
    assert_eq!(summary.rejected, 0);
    assert_eq!(summary.state.step, Step::Blink);
    assert_eq!(summary.state.status, Step::Blink.pending_prompt());
}

#[tokio::test]
async fn test_backwards_frame_does_not_reach_engine() {
    let handle = spawn_session(LivenessConfig::default(), 0, 4);
    handle.send(blink(1_000)).await.unwrap();
    // Would time out the turn step if it were ingested after the blink
    handle
        .send(TimedFrame::face(500, FaceSignals::new(None, None, None, Some(-30.0))))
        .await
        .unwrap();

    let summary = handle.finish().await.unwrap();
    assert_eq!(summary.frames, 1);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.state.step, Step::TurnLeft);
    assert_eq!(summary.state.status, "Blink detected ✔");
}

#[tokio::test]
async fn test_send_after_pass_is_closed() {
    let handle = spawn_session(LivenessConfig::default(), 0, 1);
    handle.send(blink(1)).await.unwrap();
    handle
        .send(TimedFrame::face(2, FaceSignals::new(None, None, None, Some(-30.0))))
        .await
        .unwrap();
    handle
        .send(TimedFrame::face(3, FaceSignals::new(None, None, Some(0.8), None)))
        .await
        .unwrap();

    let mut states = handle.states();
    states.wait_for(|state| state.passed).await.unwrap();

    // the worker has stopped; give it a moment to drop its receiver
    let tx = handle.sender();
    tx.closed().await;
    assert!(matches!(handle.send(blink(4)).await, Err(Error::SessionClosed)));
    assert!(matches!(handle.try_send(blink(5)), Err(Error::SessionClosed)));

    let summary = handle.finish().await.unwrap();
    assert!(summary.state.passed);
    assert_eq!(summary.frames, 3);
}

#[tokio::test]
async fn test_try_send_drops_when_full() {
    let handle = spawn_session(LivenessConfig::default(), 0, 1);
    // the worker only runs once this task yields, so the channel fills up
    let mut accepted = 0;
    let mut dropped = 0;
    for t in 0..64 {
        match handle.try_send(TimedFrame::no_face(t)).unwrap() {
            true => accepted += 1,
            false => dropped += 1,
        }
    }
    assert_eq!(accepted + dropped, 64);
    assert!(accepted >= 1);

    let summary = handle.finish().await.unwrap();
    assert_eq!(summary.frames, accepted);
}

//! Liveness session: owns one engine and publishes every new snapshot.
//!
//! `LivenessSession` is the synchronous form. `replay_source` drives one
//! from a `FrameSource`. `spawn_session` wraps it in a tokio task fed by a
//! bounded channel, so concurrent detector callbacks are serialized into a
//! single consumer.

use log::{debug, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::LivenessConfig;
use crate::core::{FrameSource, FrameValidator, LivenessEngine};
use crate::error::{Error, Result};
use crate::types::{LivenessState, StepOutput, TimedFrame};

/// Session state
#[derive(Debug)]
pub struct LivenessSession {
    engine: LivenessEngine,
    state_tx: watch::Sender<LivenessState>,
}

impl LivenessSession {
    /// Create a session started at `now_ms`, plus a reader for its snapshots
    pub fn new(config: LivenessConfig, now_ms: u64) -> (Self, watch::Receiver<LivenessState>) {
        let engine = LivenessEngine::with_config(config, now_ms);
        let (state_tx, state_rx) = watch::channel(engine.state().clone());
        (Self { engine, state_tx }, state_rx)
    }

    /// Feed one frame and publish the resulting snapshot
    pub fn ingest(&mut self, frame: &TimedFrame) -> StepOutput {
        let output = self.engine.advance(&frame.event, frame.now_ms);
        // send_replace publishes even with no receivers left
        self.state_tx.send_replace(output.state.clone());
        output
    }

    /// Another reader of the latest snapshot
    pub fn subscribe(&self) -> watch::Receiver<LivenessState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> &LivenessState {
        self.engine.state()
    }

    pub fn passed(&self) -> bool {
        self.engine.passed()
    }

    pub fn engine(&self) -> &LivenessEngine {
        &self.engine
    }
}

/// What the session worker reports when it stops
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    /// Last published snapshot
    pub state: LivenessState,
    /// Frames ingested
    pub frames: u64,
    /// Frames dropped for breaking the frame contract
    pub rejected: u64,
}

/// Drive a fresh session from `source` until the input ends or liveness
/// passes. The step timer starts at the first frame's time, so recordings
/// on any monotonic clock replay the same way. Source errors stop the replay.
pub fn replay_source<S: FrameSource>(
    source: &mut S,
    config: LivenessConfig,
    mut on_output: impl FnMut(&StepOutput),
) -> Result<SessionSummary> {
    let mut session: Option<LivenessSession> = None;
    let mut frames = 0u64;

    while let Some(frame) = source.next_frame() {
        let frame = frame?;
        frames += 1;
        let session = session.get_or_insert_with(|| LivenessSession::new(config, frame.now_ms).0);
        on_output(&session.ingest(&frame));
        if session.passed() {
            break;
        }
    }

    Ok(SessionSummary {
        state: session
            .map(|session| session.state().clone())
            .unwrap_or_default(),
        frames,
        rejected: 0,
    })
}

/// Handle to a running session worker
#[derive(Debug)]
pub struct SessionHandle {
    frames: mpsc::Sender<TimedFrame>,
    states: watch::Receiver<LivenessState>,
    join: JoinHandle<SessionSummary>,
}

impl SessionHandle {
    /// Queue a frame, waiting for room in the channel
    pub async fn send(&self, frame: TimedFrame) -> Result<()> {
        self.frames.send(frame).await.map_err(|_| Error::SessionClosed)
    }

    /// Queue a frame without waiting; a full channel drops the frame
    /// (returns `Ok(false)`), matching upstream frame throttling.
    pub fn try_send(&self, frame: TimedFrame) -> Result<bool> {
        match self.frames.try_send(frame) {
            Ok(()) => Ok(true),
            Err(mpsc::error::TrySendError::Full(_)) => Ok(false),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(Error::SessionClosed),
        }
    }

    /// Sender half, for detector callbacks running elsewhere
    pub fn sender(&self) -> mpsc::Sender<TimedFrame> {
        self.frames.clone()
    }

    /// Reader of the latest snapshot
    pub fn states(&self) -> watch::Receiver<LivenessState> {
        self.states.clone()
    }

    /// Close the input and wait for the worker to drain it
    pub async fn finish(self) -> Result<SessionSummary> {
        drop(self.frames);
        self.join.await.map_err(|_| Error::SessionClosed)
    }
}

/// Start a session worker consuming up to `capacity` queued frames.
/// Frames that go back in time or carry out-of-range probabilities are
/// dropped before they reach the engine. The worker stops when every
/// sender is dropped or liveness passes.
pub fn spawn_session(config: LivenessConfig, now_ms: u64, capacity: usize) -> SessionHandle {
    let (frames_tx, mut frames_rx) = mpsc::channel::<TimedFrame>(capacity.max(1));
    let (mut session, states) = LivenessSession::new(config, now_ms);

    let join = tokio::spawn(async move {
        let mut validator = FrameValidator::new();
        let mut frames = 0u64;
        let mut rejected = 0u64;
        while let Some(frame) = frames_rx.recv().await {
            if let Err(e) = validator.check(&frame) {
                warn!("session dropped frame: {}", e);
                rejected += 1;
                continue;
            }
            frames += 1;
            let output = session.ingest(&frame);
            debug!("session frame {}: {}", frames, output.to_parseable_string());
            if session.passed() {
                break;
            }
        }
        SessionSummary {
            state: session.state().clone(),
            frames,
            rejected,
        }
    });

    SessionHandle {
        frames: frames_tx,
        states,
        join,
    }
}

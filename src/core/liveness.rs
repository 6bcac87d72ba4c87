//! Liveness Engine: Blink → TurnLeft → Smile → Done with a per-step timeout
//!
//! State transitions:
//! - BLINK → TURN_LEFT: both eye-open probabilities in [0, 0.35]
//! - TURN_LEFT → SMILE: yaw < -15°
//! - SMILE → DONE: smile ≥ 0.70 (sets passed)
//! - any non-DONE step → BLINK: more than 15 s on the step when a face arrives
//!
//! Absent readings never satisfy a step. DONE ignores every event.

use log::{debug, info, warn};

use crate::config::LivenessConfig;
use crate::types::{FaceSignals, FrameEvent, LivenessState, ReasonCode, Step, StepOutput};
use crate::{STATUS_NO_FACE, STATUS_TIMED_OUT};

/// Outcome of the pure transition function
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Next snapshot
    pub state: LivenessState,
    /// Next value of the step timer
    pub last_step_ms: u64,
    /// Why
    pub reason: ReasonCode,
}

/// Compute the next snapshot from the current one. Pure: no clock, no I/O.
pub fn transition(
    config: &LivenessConfig,
    current: &LivenessState,
    last_step_ms: u64,
    event: &FrameEvent,
    now_ms: u64,
) -> Transition {
    let unchanged = |reason| Transition {
        state: current.clone(),
        last_step_ms,
        reason,
    };

    if current.passed {
        return unchanged(ReasonCode::L006_TERMINAL_NOOP);
    }

    let signals = match event {
        FrameEvent::NoFace => {
            return Transition {
                state: current.with_status(STATUS_NO_FACE),
                last_step_ms,
                reason: ReasonCode::L001_NO_FACE,
            };
        }
        FrameEvent::DetectorFailed { .. } => {
            return Transition {
                state: current.with_status(STATUS_NO_FACE),
                last_step_ms,
                reason: ReasonCode::L001_DETECTOR_FAILED,
            };
        }
        FrameEvent::Face(signals) => signals,
    };

    let step = current.step;
    if step.is_terminal() {
        return unchanged(ReasonCode::L006_TERMINAL_NOOP);
    }

    if now_ms.saturating_sub(last_step_ms) > config.step_timeout_ms {
        return Transition {
            state: LivenessState::at(Step::Blink, STATUS_TIMED_OUT),
            last_step_ms: now_ms,
            reason: ReasonCode::L002_STEP_TIMEOUT,
        };
    }

    if step_satisfied(config, step, signals) {
        Transition {
            state: LivenessState::at(step.next(), step.confirmation()),
            last_step_ms: now_ms,
            reason: ReasonCode::satisfied(step),
        }
    } else {
        Transition {
            state: current.with_status(step.pending_prompt()),
            last_step_ms,
            reason: ReasonCode::pending(step),
        }
    }
}

/// Does this face satisfy `step`? Missing readings use sentinels that can
/// never pass, and NaN fails every comparison.
pub fn step_satisfied(config: &LivenessConfig, step: Step, signals: &FaceSignals) -> bool {
    match step {
        Step::Blink => {
            let closed = 0.0..=config.blink_closed_max;
            let left = signals.left_eye_open.unwrap_or(-1.0);
            let right = signals.right_eye_open.unwrap_or(-1.0);
            closed.contains(&left) && closed.contains(&right)
        }
        Step::TurnLeft => signals.head_yaw_deg.unwrap_or(0.0) < config.turn_left_yaw_max,
        Step::Smile => signals.smiling.unwrap_or(-1.0) >= config.smile_min,
        Step::Done => false,
    }
}

/// Liveness state machine. Owns the current snapshot and the step timer;
/// expects one caller at a time.
#[derive(Debug, Clone)]
pub struct LivenessEngine {
    config: LivenessConfig,
    /// Current snapshot
    state: LivenessState,
    /// When the active step began
    last_step_ms: u64,
    /// Latest time seen, used to stamp no-face output
    last_seen_ms: u64,
    /// Number of events ingested
    update_count: u64,
}

impl LivenessEngine {
    /// Create a new engine with default thresholds, started at `now_ms`
    pub fn new(now_ms: u64) -> Self {
        Self::with_config(LivenessConfig::default(), now_ms)
    }

    pub fn with_config(config: LivenessConfig, now_ms: u64) -> Self {
        Self {
            config,
            state: LivenessState::initial(),
            last_step_ms: now_ms,
            last_seen_ms: now_ms,
            update_count: 0,
        }
    }

    /// Ingest one event and return the new snapshot with its reason
    pub fn advance(&mut self, event: &FrameEvent, now_ms: u64) -> StepOutput {
        self.update_count += 1;
        self.last_seen_ms = self.last_seen_ms.max(now_ms);

        let from = self.state.step;
        let next = transition(&self.config, &self.state, self.last_step_ms, event, now_ms);

        match next.reason {
            ReasonCode::L001_DETECTOR_FAILED => {
                if let FrameEvent::DetectorFailed { message } = event {
                    warn!("detector failed at {} ms, treating as no face: {}", now_ms, message);
                }
            }
            ReasonCode::L002_STEP_TIMEOUT => {
                info!(
                    "step {} timed out after {} ms, restarting",
                    from,
                    now_ms.saturating_sub(self.last_step_ms)
                );
            }
            ReasonCode::L005_LIVENESS_PASSED => {
                info!("liveness passed at {} ms after {} events", now_ms, self.update_count);
            }
            reason if reason.is_advance() => {
                debug!("step {} -> {} at {} ms", from, next.state.step, now_ms);
            }
            _ => {}
        }

        self.state = next.state;
        self.last_step_ms = next.last_step_ms;

        StepOutput::new(
            now_ms,
            self.state.clone(),
            next.reason,
            now_ms.saturating_sub(self.last_step_ms),
        )
    }

    /// A frame yielded one face
    pub fn notify_face(
        &mut self,
        left_eye_open: Option<f32>,
        right_eye_open: Option<f32>,
        smiling: Option<f32>,
        head_yaw_deg: Option<f32>,
        now_ms: u64,
    ) -> &LivenessState {
        let signals = FaceSignals::new(left_eye_open, right_eye_open, smiling, head_yaw_deg);
        self.advance(&FrameEvent::Face(signals), now_ms);
        &self.state
    }

    /// A frame was analyzed and no face was found. Leaves the step timer alone.
    pub fn notify_no_face(&mut self) -> &LivenessState {
        let now_ms = self.last_seen_ms;
        self.advance(&FrameEvent::NoFace, now_ms);
        &self.state
    }

    /// Current snapshot
    pub fn state(&self) -> &LivenessState {
        &self.state
    }

    pub fn step(&self) -> Step {
        self.state.step
    }

    pub fn passed(&self) -> bool {
        self.state.passed
    }

    pub fn last_step_ms(&self) -> u64 {
        self.last_step_ms
    }

    pub fn config(&self) -> &LivenessConfig {
        &self.config
    }

    /// Get update count
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Time remaining on the active step before a face frame would reset it
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        if self.state.step.is_terminal() {
            return None;
        }
        let elapsed = now_ms.saturating_sub(self.last_step_ms);
        Some(self.config.step_timeout_ms.saturating_sub(elapsed))
    }

    /// Start over at `now_ms`, keeping the config
    pub fn reset(&mut self, now_ms: u64) {
        *self = Self::with_config(self.config, now_ms);
    }
}

// =============================================================================
// TESTS
// =============================================================================

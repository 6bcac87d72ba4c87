//! Reason codes for liveness transitions

use serde::{Deserialize, Serialize};

use super::Step;

/// Why the last event produced the snapshot it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // L001: No usable signal
    // =========================================================================
    /// Frame analyzed, no face found
    L001_NO_FACE,
    /// Detector failed on the frame
    L001_DETECTOR_FAILED,

    // =========================================================================
    // L002: Timeout
    // =========================================================================
    /// Step stalled past the timeout, sequence restarted
    L002_STEP_TIMEOUT,

    // =========================================================================
    // L003: Waiting on the active step
    // =========================================================================
    L003_BLINK_PENDING,
    L003_TURN_LEFT_PENDING,
    L003_SMILE_PENDING,

    // =========================================================================
    // L004: Step satisfied
    // =========================================================================
    L004_BLINK_DETECTED,
    L004_TURN_LEFT_DETECTED,

    // =========================================================================
    // L005 / L006: Terminal
    // =========================================================================
    /// Smile satisfied, sequence complete
    L005_LIVENESS_PASSED,
    /// Event ignored, sequence already complete
    L006_TERMINAL_NOOP,
}

impl ReasonCode {
    /// Pending code for the given step
    pub fn pending(step: Step) -> Self {
        match step {
            Step::Blink => Self::L003_BLINK_PENDING,
            Step::TurnLeft => Self::L003_TURN_LEFT_PENDING,
            Step::Smile => Self::L003_SMILE_PENDING,
            Step::Done => Self::L006_TERMINAL_NOOP,
        }
    }

    /// Code for satisfying the given step
    pub fn satisfied(step: Step) -> Self {
        match step {
            Step::Blink => Self::L004_BLINK_DETECTED,
            Step::TurnLeft => Self::L004_TURN_LEFT_DETECTED,
            Step::Smile => Self::L005_LIVENESS_PASSED,
            Step::Done => Self::L006_TERMINAL_NOOP,
        }
    }

    /// Did this event move the sequence forward?
    pub fn is_advance(&self) -> bool {
        matches!(
            self,
            Self::L004_BLINK_DETECTED | Self::L004_TURN_LEFT_DETECTED | Self::L005_LIVENESS_PASSED
        )
    }

    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::L001_NO_FACE => "L001_NO_FACE",
            Self::L001_DETECTOR_FAILED => "L001_DETECTOR_FAILED",
            Self::L002_STEP_TIMEOUT => "L002_STEP_TIMEOUT",
            Self::L003_BLINK_PENDING => "L003_BLINK_PENDING",
            Self::L003_TURN_LEFT_PENDING => "L003_TURN_LEFT_PENDING",
            Self::L003_SMILE_PENDING => "L003_SMILE_PENDING",
            Self::L004_BLINK_DETECTED => "L004_BLINK_DETECTED",
            Self::L004_TURN_LEFT_DETECTED => "L004_TURN_LEFT_DETECTED",
            Self::L005_LIVENESS_PASSED => "L005_LIVENESS_PASSED",
            Self::L006_TERMINAL_NOOP => "L006_TERMINAL_NOOP",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::L001_NO_FACE => "No face in frame",
            Self::L001_DETECTOR_FAILED => "Detector failed, treated as no face",
            Self::L002_STEP_TIMEOUT => "Step timed out, restarting at blink",
            Self::L003_BLINK_PENDING => "Waiting for both eyes to close",
            Self::L003_TURN_LEFT_PENDING => "Waiting for a left head turn",
            Self::L003_SMILE_PENDING => "Waiting for a smile",
            Self::L004_BLINK_DETECTED => "Blink detected",
            Self::L004_TURN_LEFT_DETECTED => "Left turn detected",
            Self::L005_LIVENESS_PASSED => "Liveness passed",
            Self::L006_TERMINAL_NOOP => "Already passed, event ignored",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

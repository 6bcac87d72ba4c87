//! Output structures for terminal display

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::types::{LivenessState, ReasonCode};

/// Result of ingesting one frame event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutput {
    /// Wall-clock time of the update
    pub timestamp: DateTime<Utc>,
    /// Caller's monotonic time for the frame (milliseconds)
    pub now_ms: u64,
    /// Snapshot after the event
    pub state: LivenessState,
    /// Why the snapshot looks the way it does
    pub reason: ReasonCode,
    /// Time spent on the active step (milliseconds)
    pub step_elapsed_ms: u64,
}

impl StepOutput {
    /// Create new output
    pub fn new(now_ms: u64, state: LivenessState, reason: ReasonCode, step_elapsed_ms: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            now_ms,
            state,
            reason,
            step_elapsed_ms,
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let step = self.state.step;
        let line = format!(
            "{} [{}] {} | {} | {:.1}s on step",
            step.emoji(),
            step,
            self.state.status,
            self.state.instruction,
            self.step_elapsed_ms as f64 / 1000.0,
        );
        line.color(step.color()).to_string()
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "t={} | step={} | passed={} | elapsed={:.1}s | reason={} | status={}",
            self.now_ms,
            self.state.step,
            self.state.passed,
            self.step_elapsed_ms as f64 / 1000.0,
            self.reason.code(),
            self.state.status,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Step;

    #[test]
    fn test_parseable_fields() {
        let output = StepOutput::new(
            1200,
            LivenessState::at(Step::TurnLeft, Step::Blink.confirmation()),
            ReasonCode::L004_BLINK_DETECTED,
            0,
        );
        let line = output.to_parseable_string();
        assert!(line.contains("t=1200"));
        assert!(line.contains("step=TURN_LEFT"));
        assert!(line.contains("passed=false"));
        assert!(line.contains("reason=L004_BLINK_DETECTED"));
    }

    #[test]
    fn test_terminal_contains_status() {
        colored::control::set_override(false);
        let output = StepOutput::new(
            0,
            LivenessState::initial(),
            ReasonCode::L001_NO_FACE,
            0,
        );
        let line = output.to_terminal_string();
        assert!(line.contains("[BLINK]"));
        assert!(line.contains("Looking for a face..."));
    }
}

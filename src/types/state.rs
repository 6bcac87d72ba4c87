//! Liveness step and state snapshot definitions

use colored::Color;
use serde::{Deserialize, Serialize};

use crate::STATUS_SEARCHING;

/// The four steps of a liveness session, in the only order they can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    /// Close both eyes
    Blink,
    /// Turn the head to the left
    TurnLeft,
    /// Smile broadly
    Smile,
    /// Sequence complete (terminal)
    Done,
}

/// Directional guidance a presentation layer may draw next to the instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionalCue {
    Left,
}

impl Step {
    /// The step that follows this one. `Done` maps to itself.
    pub fn next(&self) -> Step {
        match self {
            Step::Blink => Step::TurnLeft,
            Step::TurnLeft => Step::Smile,
            Step::Smile => Step::Done,
            Step::Done => Step::Done,
        }
    }

    /// Zero-based position in the sequence
    pub fn index(&self) -> usize {
        match self {
            Step::Blink => 0,
            Step::TurnLeft => 1,
            Step::Smile => 2,
            Step::Done => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self == Step::Done
    }

    /// Directive shown while this step is active
    pub fn instruction(&self) -> &'static str {
        match self {
            Step::Blink => "Instruction: Blink your eyes",
            Step::TurnLeft => "Instruction: Turn your head LEFT",
            Step::Smile => "Instruction: Smile",
            Step::Done => "Liveness passed ✅",
        }
    }

    /// Status while a face is visible but the step is not yet satisfied
    pub fn pending_prompt(&self) -> &'static str {
        match self {
            Step::Blink => "Face ok. Blink your eyes…",
            Step::TurnLeft => "Face ok. Turn your head LEFT…",
            Step::Smile => "Face ok. Give a big SMILE…",
            Step::Done => "Liveness passed ✅",
        }
    }

    /// Status on the frame that satisfies this step
    pub fn confirmation(&self) -> &'static str {
        match self {
            Step::Blink => "Blink detected ✔",
            Step::TurnLeft => "Turned left ✔",
            Step::Smile => "Smile detected ✔",
            Step::Done => "Liveness passed ✅",
        }
    }

    /// Fill level of the progress ring while this step is active
    pub fn progress_fraction(&self) -> f32 {
        match self {
            Step::Blink => 0.15,
            Step::TurnLeft => 0.55,
            Step::Smile => 0.90,
            Step::Done => 1.0,
        }
    }

    /// Directional cue for this step, if any
    pub fn cue(&self) -> Option<DirectionalCue> {
        match self {
            Step::TurnLeft => Some(DirectionalCue::Left),
            _ => None,
        }
    }

    /// Terminal color
    pub fn color(&self) -> Color {
        match self {
            Step::Blink => Color::Cyan,
            Step::TurnLeft => Color::Yellow,
            Step::Smile => Color::Magenta,
            Step::Done => Color::Green,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Step::Blink => "👁",
            Step::TurnLeft => "⬅",
            Step::Smile => "😊",
            Step::Done => "✅",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::Blink => "BLINK",
            Step::TurnLeft => "TURN_LEFT",
            Step::Smile => "SMILE",
            Step::Done => "DONE",
        };
        write!(f, "{}", name)
    }
}

/// Immutable snapshot handed to the presentation layer after every event.
///
/// Snapshots are replaced wholesale, never edited in place. `passed`
/// implies `step == Step::Done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivenessState {
    /// Active step
    pub step: Step,
    /// Per-frame progress text
    pub status: String,
    /// Directive for the active step
    pub instruction: String,
    /// Sequence completed
    pub passed: bool,
}

impl LivenessState {
    /// Snapshot at session start
    pub fn initial() -> Self {
        Self {
            step: Step::Blink,
            status: STATUS_SEARCHING.to_string(),
            instruction: Step::Blink.instruction().to_string(),
            passed: false,
        }
    }

    /// Snapshot for an active step with the given status
    pub fn at(step: Step, status: impl Into<String>) -> Self {
        Self {
            step,
            status: status.into(),
            instruction: step.instruction().to_string(),
            passed: step.is_terminal(),
        }
    }

    /// Same step and instruction, new status
    pub fn with_status(&self, status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..self.clone()
        }
    }
}

impl Default for LivenessState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        assert_eq!(Step::Blink.next(), Step::TurnLeft);
        assert_eq!(Step::TurnLeft.next(), Step::Smile);
        assert_eq!(Step::Smile.next(), Step::Done);
        assert_eq!(Step::Done.next(), Step::Done);
    }

    #[test]
    fn test_index_follows_order() {
        let mut step = Step::Blink;
        for expected in 0..3 {
            assert_eq!(step.index(), expected);
            step = step.next();
        }
        assert_eq!(step.index(), 3);
    }

    #[test]
    fn test_initial_state() {
        let state = LivenessState::initial();
        assert_eq!(state.step, Step::Blink);
        assert_eq!(state.status, "Looking for a face...");
        assert_eq!(state.instruction, "Instruction: Blink your eyes");
        assert!(!state.passed);
    }

    #[test]
    fn test_at_done_is_passed() {
        let state = LivenessState::at(Step::Done, Step::Smile.confirmation());
        assert!(state.passed);
        assert_eq!(state.instruction, "Liveness passed ✅");
    }

    #[test]
    fn test_with_status_keeps_step() {
        let state = LivenessState::at(Step::TurnLeft, "x").with_status("y");
        assert_eq!(state.step, Step::TurnLeft);
        assert_eq!(state.instruction, Step::TurnLeft.instruction());
        assert_eq!(state.status, "y");
    }

    #[test]
    fn test_cue_only_on_turn_left() {
        assert_eq!(Step::TurnLeft.cue(), Some(DirectionalCue::Left));
        assert_eq!(Step::Blink.cue(), None);
        assert_eq!(Step::Smile.cue(), None);
        assert_eq!(Step::Done.cue(), None);
    }

    #[test]
    fn test_progress_increases() {
        assert!(Step::Blink.progress_fraction() < Step::TurnLeft.progress_fraction());
        assert!(Step::TurnLeft.progress_fraction() < Step::Smile.progress_fraction());
        assert!(Step::Smile.progress_fraction() < Step::Done.progress_fraction());
    }

    #[test]
    fn test_serde_step_names() {
        let json = serde_json::to_string(&Step::TurnLeft).unwrap();
        assert_eq!(json, "\"TURN_LEFT\"");
    }
}

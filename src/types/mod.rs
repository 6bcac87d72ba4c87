//! Core types for livecheck

mod state;
mod signals;
mod output;
mod reason;

pub use state::{DirectionalCue, LivenessState, Step};
pub use signals::{FaceSignals, FrameEvent, TimedFrame};
pub use output::StepOutput;
pub use reason::ReasonCode;

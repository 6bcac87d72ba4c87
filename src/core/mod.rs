//! Core modules for livecheck

pub mod frame_source;
pub mod liveness;
pub mod session;

pub use frame_source::{parse_command, FrameRecord, FrameSource, FrameValidator, LineFormat, LineSource};
pub use liveness::{step_satisfied, transition, LivenessEngine, Transition};
pub use session::{replay_source, spawn_session, LivenessSession, SessionHandle, SessionSummary};

//! livecheck: active liveness check over face-detection signals
//!
//! Frame source → LivenessEngine (Blink → TurnLeft → Smile → Done) → snapshot

pub mod config;
pub mod core;
pub mod error;
pub mod logger;
pub mod types;

pub use config::LivenessConfig;
pub use error::{Error, Result};

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Both eye-open probabilities must be at or below this to count as a blink
pub const BLINK_CLOSED_MAX: f32 = 0.35;

/// Head yaw (degrees) must drop below this to count as a left turn
pub const TURN_LEFT_YAW_MAX: f32 = -15.0;

/// Smile probability at or above this counts as a smile
pub const SMILE_MIN: f32 = 0.70;

/// A non-terminal step stalled longer than this restarts the sequence
pub const STEP_TIMEOUT_MS: u64 = 15_000;

// =============================================================================
// STATUS TEXT
// =============================================================================

/// Status before the first frame arrives
pub const STATUS_SEARCHING: &str = "Looking for a face...";

/// Status when a frame had no usable face
pub const STATUS_NO_FACE: &str = "No face detected.";

/// Status after a step timed out
pub const STATUS_TIMED_OUT: &str = "Timed out. Restarting.";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";

//! Per-frame signal structures produced by the face detector

use serde::{Deserialize, Serialize};

/// Readings for one detected face. Any field may be absent when the
/// detector did not compute it for this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceSignals {
    /// Left eye open probability (0.0-1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_eye_open: Option<f32>,
    /// Right eye open probability (0.0-1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_eye_open: Option<f32>,
    /// Smiling probability (0.0-1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smiling: Option<f32>,
    /// Head yaw in degrees, negative = turned toward the camera's left
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_yaw_deg: Option<f32>,
}

impl FaceSignals {
    pub fn new(
        left_eye_open: Option<f32>,
        right_eye_open: Option<f32>,
        smiling: Option<f32>,
        head_yaw_deg: Option<f32>,
    ) -> Self {
        Self {
            left_eye_open,
            right_eye_open,
            smiling,
            head_yaw_deg,
        }
    }

    /// Probability fields paired with their names, for validation and display
    pub fn probabilities(&self) -> [(&'static str, Option<f32>); 3] {
        [
            ("left_eye_open", self.left_eye_open),
            ("right_eye_open", self.right_eye_open),
            ("smiling", self.smiling),
        ]
    }
}

/// One analyzed frame, as seen by the state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameEvent {
    /// Frame analyzed, no face found
    NoFace,
    /// Detector failed on this frame; handled exactly like `NoFace`
    DetectorFailed { message: String },
    /// First detected face
    Face(FaceSignals),
}

/// A frame event stamped with the caller's monotonic clock (milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedFrame {
    pub now_ms: u64,
    pub event: FrameEvent,
}

impl TimedFrame {
    pub fn new(now_ms: u64, event: FrameEvent) -> Self {
        Self { now_ms, event }
    }

    pub fn face(now_ms: u64, signals: FaceSignals) -> Self {
        Self::new(now_ms, FrameEvent::Face(signals))
    }

    pub fn no_face(now_ms: u64) -> Self {
        Self::new(now_ms, FrameEvent::NoFace)
    }
}

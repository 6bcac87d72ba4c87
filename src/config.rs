//! Liveness thresholds, with defaults from the crate constants

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{BLINK_CLOSED_MAX, SMILE_MIN, STEP_TIMEOUT_MS, TURN_LEFT_YAW_MAX};

/// Tunable thresholds for a liveness session. Every field is optional in
/// the JSON form; missing fields keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// Upper bound on both eye-open probabilities for a blink
    pub blink_closed_max: f32,
    /// Yaw must be strictly below this (degrees) for a left turn
    pub turn_left_yaw_max: f32,
    /// Lower bound on smile probability
    pub smile_min: f32,
    /// Stall limit per non-terminal step
    pub step_timeout_ms: u64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            blink_closed_max: BLINK_CLOSED_MAX,
            turn_left_yaw_max: TURN_LEFT_YAW_MAX,
            smile_min: SMILE_MIN,
            step_timeout_ms: STEP_TIMEOUT_MS,
        }
    }
}

impl LivenessConfig {
    /// Parse and validate a JSON config
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn with_step_timeout_ms(mut self, step_timeout_ms: u64) -> Self {
        self.step_timeout_ms = step_timeout_ms;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.blink_closed_max) {
            return Err(Error::InvalidConfig(format!(
                "blink_closed_max {} must be in [0, 1]",
                self.blink_closed_max
            )));
        }
        if !(0.0..=1.0).contains(&self.smile_min) {
            return Err(Error::InvalidConfig(format!(
                "smile_min {} must be in [0, 1]",
                self.smile_min
            )));
        }
        // A non-negative bound would let the absent-yaw default of 0 pass
        if self.turn_left_yaw_max.is_nan() || self.turn_left_yaw_max >= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "turn_left_yaw_max {} must be negative",
                self.turn_left_yaw_max
            )));
        }
        if self.step_timeout_ms == 0 {
            return Err(Error::InvalidConfig("step_timeout_ms must be > 0".to_string()));
        }
        Ok(())
    }
}

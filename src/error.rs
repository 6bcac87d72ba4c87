//! Errors for the fallible edges: frame input and configuration.
//! The state machine itself has no error path.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: invalid frame json: {source}")]
    FrameJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: {message}")]
    FrameCommand { line: usize, message: String },

    #[error("{field} = {value} is outside [0, 1]")]
    ProbabilityOutOfRange { field: &'static str, value: f32 },

    #[error("timestamp went backwards: {got} ms after {previous} ms")]
    NonMonotonicTime { previous: u64, got: u64 },

    #[error("invalid config json: {0}")]
    ConfigJson(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("session closed")]
    SessionClosed,
}

//! Frame sources: turn recorded or typed detector output into `TimedFrame`s
//!
//! Two line formats:
//! - JSON lines: `{"t_ms": 120, "faces": [{"left_eye_open": 0.1, ...}], "error": null}`
//! - Text commands: `face l=0.1 r=0.2 smile=0.9 yaw=-20 t=120`, `none [t=<ms>]`,
//!   `error <msg> [t=<ms>]`
//!
//! Only the first face of a frame is used. A frame with `error` set becomes
//! `FrameEvent::DetectorFailed`. Frames without a timestamp are stamped from
//! a monotonic clock started with the source, never earlier than the last
//! accepted frame.

use std::io::BufRead;
use std::time::Instant;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{FaceSignals, FrameEvent, TimedFrame};

/// Anything that yields frames one at a time, in order
pub trait FrameSource {
    /// Next frame, `None` at end of input
    fn next_frame(&mut self) -> Option<Result<TimedFrame>>;
}

/// One recorded detector result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Frame time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_ms: Option<u64>,
    /// Detected faces, best first
    #[serde(default)]
    pub faces: Vec<FaceSignals>,
    /// Detector error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FrameRecord {
    /// Reduce to the single event the state machine sees
    pub fn into_event(self) -> FrameEvent {
        if let Some(message) = self.error {
            return FrameEvent::DetectorFailed { message };
        }
        match self.faces.into_iter().next() {
            Some(face) => FrameEvent::Face(face),
            None => FrameEvent::NoFace,
        }
    }
}

/// Input line format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    JsonLines,
    TextCommands,
}

/// Enforces the frame contract: probabilities in [0, 1] and timestamps
/// that never go backwards.
#[derive(Debug, Default)]
pub struct FrameValidator {
    previous_ms: Option<u64>,
}

impl FrameValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time of the last accepted frame
    pub fn watermark(&self) -> Option<u64> {
        self.previous_ms
    }

    /// Check a frame. Rejected frames do not move the time watermark.
    pub fn check(&mut self, frame: &TimedFrame) -> Result<()> {
        if let Some(previous) = self.previous_ms {
            if frame.now_ms < previous {
                return Err(Error::NonMonotonicTime {
                    previous,
                    got: frame.now_ms,
                });
            }
        }
        if let FrameEvent::Face(signals) = &frame.event {
            for (field, value) in signals.probabilities() {
                if let Some(value) = value {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(Error::ProbabilityOutOfRange { field, value });
                    }
                }
            }
        }
        self.previous_ms = Some(frame.now_ms);
        Ok(())
    }
}

/// Line-oriented frame source over any reader
pub struct LineSource<R> {
    reader: R,
    format: LineFormat,
    line_no: usize,
    started: Instant,
    validator: FrameValidator,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R, format: LineFormat) -> Self {
        Self {
            reader,
            format,
            line_no: 0,
            started: Instant::now(),
            validator: FrameValidator::new(),
        }
    }

    pub fn json_lines(reader: R) -> Self {
        Self::new(reader, LineFormat::JsonLines)
    }

    pub fn text_commands(reader: R) -> Self {
        Self::new(reader, LineFormat::TextCommands)
    }

    fn clock_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Stamp for a frame that carries no time of its own
    fn untimed_ms(&self) -> u64 {
        let clock = self.clock_ms();
        self.validator
            .watermark()
            .map_or(clock, |previous| previous.max(clock))
    }

    fn parse(&self, line: &str) -> Result<Option<(Option<u64>, FrameEvent)>> {
        match self.format {
            LineFormat::JsonLines => {
                let line = line.trim();
                if line.is_empty() {
                    return Ok(None);
                }
                let record: FrameRecord = serde_json::from_str(line).map_err(|source| {
                    Error::FrameJson {
                        line: self.line_no,
                        source,
                    }
                })?;
                Ok(Some((record.t_ms, record.into_event())))
            }
            LineFormat::TextCommands => {
                parse_command(line).map_err(|message| Error::FrameCommand {
                    line: self.line_no,
                    message,
                })
            }
        }
    }
}

impl<R: BufRead> FrameSource for LineSource<R> {
    fn next_frame(&mut self) -> Option<Result<TimedFrame>> {
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(Error::Io(e))),
            }
            self.line_no += 1;

            let (t_ms, event) = match self.parse(&line) {
                Ok(Some(parsed)) => parsed,
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            };
            let frame = TimedFrame::new(t_ms.unwrap_or_else(|| self.untimed_ms()), event);
            if let Err(e) = self.validator.check(&frame) {
                warn!("line {}: rejected frame: {}", self.line_no, e);
                return Some(Err(e));
            }
            return Some(Ok(frame));
        }
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<TimedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame()
    }
}

/// Parse one text command. Blank lines and `#` comments yield `Ok(None)`.
///
/// ```text
/// face l=0.1 r=0.2 smile=0.9 yaw=-20 t=1200
/// none t=1300
/// error model crashed t=1400
/// ```
pub fn parse_command(line: &str) -> std::result::Result<Option<(Option<u64>, FrameEvent)>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    match keyword.to_ascii_lowercase().as_str() {
        "face" => {
            let mut signals = FaceSignals::default();
            let mut t_ms = None;
            for token in rest.split_whitespace() {
                let (key, value) = token
                    .split_once('=')
                    .ok_or_else(|| format!("expected key=value, got '{}'", token))?;
                match key.to_ascii_lowercase().as_str() {
                    "l" | "left" => signals.left_eye_open = Some(parse_f32(key, value)?),
                    "r" | "right" => signals.right_eye_open = Some(parse_f32(key, value)?),
                    "smile" => signals.smiling = Some(parse_f32(key, value)?),
                    "yaw" => signals.head_yaw_deg = Some(parse_f32(key, value)?),
                    "t" => t_ms = Some(parse_ms(value)?),
                    _ => return Err(format!("unknown field '{}'", key)),
                }
            }
            Ok(Some((t_ms, FrameEvent::Face(signals))))
        }
        "none" | "noface" => {
            let t_ms = match rest.strip_prefix("t=") {
                Some(value) => Some(parse_ms(value)?),
                None if rest.is_empty() => None,
                None => return Err(format!("unexpected '{}' after none", rest)),
            };
            Ok(Some((t_ms, FrameEvent::NoFace)))
        }
        "error" => {
            let (message, t_ms) = match rest.rsplit_once(char::is_whitespace) {
                Some((message, last)) if last.starts_with("t=") => {
                    (message.trim(), Some(parse_ms(&last[2..])?))
                }
                _ if rest.starts_with("t=") => ("", Some(parse_ms(&rest[2..])?)),
                _ => (rest, None),
            };
            let message = if message.is_empty() { "detector error" } else { message };
            Ok(Some((
                t_ms,
                FrameEvent::DetectorFailed {
                    message: message.to_string(),
                },
            )))
        }
        other => Err(format!("unknown command '{}' (expected face, none or error)", other)),
    }
}

fn parse_f32(key: &str, value: &str) -> std::result::Result<f32, String> {
    value
        .parse::<f32>()
        .map_err(|_| format!("{} expects a number, got '{}'", key, value))
}

fn parse_ms(value: &str) -> std::result::Result<u64, String> {
    value
        .parse::<u64>()
        .map_err(|_| format!("t expects milliseconds, got '{}'", value))
}

//! Reproducible configuration for a sketch.
//!
//! A [`SketchConfig`] captures everything the scheduler needs to replay an
//! animation: canvas dimensions, loop duration, the frame on which phase 0
//! falls, whether to auto-record one loop, the seed and the sketch's own
//! parameters. Two identical configs fed to the same sketch produce
//! pixel-identical frames.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

const DEFAULT_SIZE: usize = 540;
const DEFAULT_DURATION: u64 = 300;
const DEFAULT_FPS: f64 = 60.0;

/// A seed as written in config files: either a number or a string.
///
/// Strings are hashed down to a number when a generator is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SeedValue {
    Number(u64),
    Text(String),
}

impl From<u64> for SeedValue {
    fn from(n: u64) -> Self {
        SeedValue::Number(n)
    }
}

impl From<&str> for SeedValue {
    fn from(s: &str) -> Self {
        SeedValue::Text(s.to_owned())
    }
}

impl std::fmt::Display for SeedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedValue::Number(n) => write!(f, "{n}"),
            SeedValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Per-sketch configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SketchConfig {
    pub width: usize,
    pub height: usize,
    /// Frames per animation loop.
    pub duration: u64,
    /// Frame on which phase 0 falls.
    pub frame_offset: u64,
    /// Record exactly one loop, starting at the first phase-0 frame.
    pub recording: bool,
    /// Explicit seed; `None` falls back to wall-clock time at setup.
    pub seed: Option<SeedValue>,
    /// Target frames per second for paced playback and video encoding.
    pub fps: f64,
    /// Sketch-specific parameters.
    pub params: serde_json::Value,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            duration: DEFAULT_DURATION,
            frame_offset: 0,
            recording: false,
            seed: None,
            fps: DEFAULT_FPS,
            params: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

impl SketchConfig {
    /// Creates a config with default duration, fps and params.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Returns a copy with the given loop duration.
    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    /// Returns a copy with an explicit seed.
    pub fn with_seed(mut self, seed: impl Into<SeedValue>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Returns a copy with auto-recording switched on or off.
    pub fn with_recording(mut self, recording: bool) -> Self {
        self.recording = recording;
        self
    }

    /// Returns a copy with the given sketch parameters.
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }

    /// Reads a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))?;
        let config: SketchConfig = serde_json::from_str(&text)
            .map_err(|e| EngineError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates dimensions, duration and fps.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .and_then(|px| px.checked_mul(4))
            .ok_or(EngineError::InvalidDimensions)?;
        if self.duration == 0 {
            return Err(EngineError::InvalidConfig(
                "duration must be at least one frame".into(),
            ));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "fps must be positive, got {}",
                self.fps
            )));
        }
        Ok(())
    }

    /// The explicit seed, or a wall-clock seed when none is configured.
    pub fn resolve_seed(&self) -> SeedValue {
        self.seed
            .clone()
            .unwrap_or_else(|| SeedValue::Number(wall_clock_seed()))
    }

    /// Frame position inside the current loop, in `[0, duration)`.
    pub fn loop_frame(&self, frame: u64) -> u64 {
        let duration = i128::from(self.duration.max(1));
        let shifted = i128::from(frame) - i128::from(self.frame_offset);
        shifted.rem_euclid(duration) as u64
    }

    /// Normalized phase `((frame - frame_offset) / duration) mod 1`.
    ///
    /// Computed from the integer loop position, so phase is exactly `0.0`
    /// on every loop boundary regardless of how many loops have elapsed.
    pub fn phase(&self, frame: u64) -> f64 {
        self.loop_frame(frame) as f64 / self.duration.max(1) as f64
    }

    /// Whether `frame` is a phase-0 frame at or after `frame_offset`.
    pub fn is_loop_start(&self, frame: u64) -> bool {
        frame >= self.frame_offset && self.loop_frame(frame) == 0
    }
}

/// Nanoseconds since the Unix epoch, folded to 64 bits.
pub fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

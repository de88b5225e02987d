//! Recording controller: captures rendered frames into an encoded artifact.
//!
//! Frames are keyed to the scheduler's frame counter, never wall-clock time,
//! so captured frame `N` always corresponds to phase `t(first + N)`.
//!
//! ```text
//! Idle ──start──▶ Recording ──stop──▶ Stopping ──(flushed) save──▶ Saved
//!                    │                   │                           │
//!                    └──────abort────────┴────────▶ Idle ◀──reset────┘
//! ```
//!
//! Encoding can be slow, so flushing is cooperative: [`Recorder::poll`]
//! hands at most `flush_budget` buffered frames to the encoder per call and
//! the scheduler calls it once per tick instead of blocking.

use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::EngineError;
use crate::frame::Frame;

/// Frames handed to the encoder per `poll()` by default.
pub const DEFAULT_FLUSH_BUDGET: usize = 8;

/// Recording lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    Idle,
    Recording,
    Stopping,
    Saved,
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordingState::Idle => "idle",
            RecordingState::Recording => "recording",
            RecordingState::Stopping => "stopping",
            RecordingState::Saved => "saved",
        };
        f.write_str(name)
    }
}

/// What kind of artifact an encoder produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Frames kept in memory.
    Memory,
    /// One numbered image per frame in a directory.
    ImageSequence,
    /// A single encoded video file.
    Video,
}

/// The finished output of one recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: Option<PathBuf>,
    pub frames: u64,
}

/// Sink for captured frames.
///
/// `encode` receives frames in capture order with their zero-based index
/// inside the recording; `finish` finalizes the artifact.
pub trait FrameEncoder {
    fn encode(&mut self, index: u64, frame: &Frame) -> Result<(), EngineError>;

    fn finish(&mut self) -> Result<Artifact, EngineError>;
}

/// Encoder that keeps every frame of the latest recording in memory.
///
/// Index 0 starts a new recording and drops the frames of the previous one.
#[derive(Debug, Default)]
pub struct MemoryEncoder {
    frames: Vec<(u64, Frame)>,
}

impl MemoryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoded frames with their recording index.
    pub fn frames(&self) -> &[(u64, Frame)] {
        &self.frames
    }
}

impl FrameEncoder for MemoryEncoder {
    fn encode(&mut self, index: u64, frame: &Frame) -> Result<(), EngineError> {
        if index == 0 {
            self.frames.clear();
        }
        self.frames.push((index, frame.clone()));
        Ok(())
    }

    fn finish(&mut self) -> Result<Artifact, EngineError> {
        Ok(Artifact {
            kind: ArtifactKind::Memory,
            path: None,
            frames: self.frames.len() as u64,
        })
    }
}

/// Explicit four-state recording controller.
pub struct Recorder {
    state: RecordingState,
    encoder: Box<dyn FrameEncoder>,
    first_frame: u64,
    frames_captured: u64,
    frames_encoded: u64,
    buffer: VecDeque<(u64, Frame)>,
    flush_budget: usize,
    artifact: Option<Artifact>,
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("state", &self.state)
            .field("first_frame", &self.first_frame)
            .field("frames_captured", &self.frames_captured)
            .field("frames_encoded", &self.frames_encoded)
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

impl Recorder {
    pub fn new(encoder: Box<dyn FrameEncoder>) -> Self {
        Self {
            state: RecordingState::Idle,
            encoder,
            first_frame: 0,
            frames_captured: 0,
            frames_encoded: 0,
            buffer: VecDeque::new(),
            flush_budget: DEFAULT_FLUSH_BUDGET,
            artifact: None,
        }
    }

    /// Returns a recorder that hands at most `budget` frames (minimum 1) to
    /// the encoder per `poll()`.
    pub fn with_flush_budget(mut self, budget: usize) -> Self {
        self.flush_budget = budget.max(1);
        self
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Scheduler frame on which the current recording started.
    pub fn first_frame(&self) -> u64 {
        self.first_frame
    }

    pub fn frames_captured(&self) -> u64 {
        self.frames_captured
    }

    pub fn frames_encoded(&self) -> u64 {
        self.frames_encoded
    }

    /// The saved artifact, once in [`RecordingState::Saved`].
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    /// Whether every captured frame has reached the encoder.
    pub fn is_flushed(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Starts capturing at `frame`.
    ///
    /// Only valid from `Idle` while the scheduler is running.
    pub fn start(&mut self, frame: u64, scheduler_running: bool) -> Result<(), EngineError> {
        if self.state != RecordingState::Idle {
            return Err(EngineError::invalid_state("start recording", self.state));
        }
        if !scheduler_running {
            return Err(EngineError::invalid_state(
                "start recording",
                "the scheduler is not running",
            ));
        }
        self.state = RecordingState::Recording;
        self.first_frame = frame;
        self.frames_captured = 0;
        self.frames_encoded = 0;
        self.artifact = None;
        tracing::info!(frame, "recording started");
        Ok(())
    }

    /// Buffers the frame rendered at scheduler frame `frame`.
    ///
    /// Only valid while `Recording`.
    pub fn capture(&mut self, frame: u64, image: Frame) -> Result<(), EngineError> {
        if self.state != RecordingState::Recording {
            return Err(EngineError::invalid_state("capture a frame", self.state));
        }
        let index = frame.checked_sub(self.first_frame).ok_or_else(|| {
            EngineError::invalid_state("capture a frame", "before the first recorded frame")
        })?;
        self.buffer.push_back((index, image));
        self.frames_captured += 1;
        Ok(())
    }

    /// Stops capturing; buffered frames keep flushing through `poll()`.
    ///
    /// Only valid from `Recording`.
    pub fn stop(&mut self) -> Result<(), EngineError> {
        if self.state != RecordingState::Recording {
            return Err(EngineError::invalid_state("stop recording", self.state));
        }
        self.state = RecordingState::Stopping;
        tracing::info!(
            frames = self.frames_captured,
            buffered = self.buffer.len(),
            "recording stopping"
        );
        Ok(())
    }

    /// Hands up to `flush_budget` buffered frames to the encoder.
    ///
    /// Returns `true` once the buffer is empty. Does nothing outside
    /// `Recording` and `Stopping`. An encoder error abandons the recording
    /// (back to `Idle`), so an artifact with a missing frame is never saved.
    pub fn poll(&mut self) -> Result<bool, EngineError> {
        if !matches!(
            self.state,
            RecordingState::Recording | RecordingState::Stopping
        ) {
            return Ok(self.is_flushed());
        }
        for _ in 0..self.flush_budget {
            let Some((index, frame)) = self.buffer.front() else {
                break;
            };
            if let Err(e) = self.encoder.encode(*index, frame) {
                return Err(self.fail(e));
            }
            self.buffer.pop_front();
            self.frames_encoded += 1;
        }
        Ok(self.is_flushed())
    }

    /// Polls until every buffered frame has been encoded.
    pub fn flush(&mut self) -> Result<(), EngineError> {
        while !self.poll()? {}
        Ok(())
    }

    /// Finalizes the artifact.
    ///
    /// Only valid from `Stopping` once flushing has completed; calling it
    /// earlier is an error, never a silent no-op.
    pub fn save(&mut self) -> Result<&Artifact, EngineError> {
        match self.state {
            RecordingState::Stopping if self.is_flushed() => {}
            RecordingState::Stopping => {
                return Err(EngineError::invalid_state(
                    "save recording",
                    format!("{} frames are still flushing", self.buffer.len()),
                ))
            }
            other => return Err(EngineError::invalid_state("save recording", other)),
        }
        let artifact = match self.encoder.finish() {
            Ok(artifact) => artifact,
            Err(e) => return Err(self.fail(e)),
        };
        tracing::info!(frames = artifact.frames, path = ?artifact.path, "recording saved");
        self.state = RecordingState::Saved;
        Ok(self.artifact.insert(artifact))
    }

    /// Abandons an in-flight recording and drops buffered frames.
    ///
    /// Valid from `Recording` and `Stopping`.
    pub fn abort(&mut self) -> Result<(), EngineError> {
        if !matches!(
            self.state,
            RecordingState::Recording | RecordingState::Stopping
        ) {
            return Err(EngineError::invalid_state("abort recording", self.state));
        }
        tracing::warn!(dropped = self.buffer.len(), "recording aborted");
        self.buffer.clear();
        self.state = RecordingState::Idle;
        Ok(())
    }

    /// Drops the in-flight recording after an encoder failure.
    fn fail(&mut self, error: EngineError) -> EngineError {
        tracing::warn!(
            error = %error,
            encoded = self.frames_encoded,
            dropped = self.buffer.len(),
            "encoder failed; recording abandoned"
        );
        self.buffer.clear();
        self.state = RecordingState::Idle;
        error
    }

    /// Returns a saved recorder to `Idle`, keeping the encoder.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        if self.state != RecordingState::Saved {
            return Err(EngineError::invalid_state("reset recorder", self.state));
        }
        self.state = RecordingState::Idle;
        Ok(())
    }
}

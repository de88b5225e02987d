#![deny(unsafe_code)]
//! Core of the sketchbook looping-animation framework.
//!
//! Provides the `Xorshift128` PRNG, seeded fractal `SimplexNoise`, the
//! `SketchConfig` loop model, the `Sketch` trait and its `Scheduler`, a CPU
//! `Raster` surface, and the `Recorder` state machine that streams frames
//! to a `FrameEncoder`.

pub mod config;
pub mod error;
pub mod frame;
pub mod noise;
pub mod params;
pub mod prng;
pub mod recording;
pub mod scheduler;
pub mod sketch;
pub mod surface;

pub use config::{SeedValue, SketchConfig};
pub use error::EngineError;
pub use frame::{Frame, Rgba};
pub use noise::SimplexNoise;
pub use prng::Xorshift128;
pub use recording::{Artifact, ArtifactKind, FrameEncoder, MemoryEncoder, Recorder, RecordingState};
pub use scheduler::{FrameTimer, Input, Scheduler, SchedulerState, Tick};
pub use sketch::{Context, Request, Sketch};
pub use surface::{Raster, Surface};

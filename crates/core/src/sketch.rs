//! The `Sketch` trait every animation implements, and the [`Context`]
//! handle it reads frame state from and sends lifecycle requests through.
//!
//! The trait is object-safe so the scheduler can hold any sketch as
//! `Box<dyn Sketch>`.

use std::time::Duration;

use serde_json::Value;

use crate::config::{SeedValue, SketchConfig};
use crate::error::EngineError;
use crate::noise::SimplexNoise;
use crate::prng::Xorshift128;
use crate::surface::Surface;

/// Core trait for animations driven by the [`Scheduler`](crate::scheduler::Scheduler).
///
/// `setup` builds all sketch-owned state (generators, noise fields, shapes)
/// from scratch and may be called again at any time to restart; `draw`
/// renders one frame. Input hooks default to doing nothing.
pub trait Sketch {
    /// Adjusts static configuration before the surface is created.
    fn preload(&mut self, _config: &mut SketchConfig) {}

    /// (Re)initializes sketch state. Must fully replace prior state.
    fn setup(&mut self, ctx: &mut Context) -> Result<(), EngineError>;

    /// Renders the frame `ctx.frame_count()`.
    fn draw(&mut self, ctx: &mut Context, surface: &mut dyn Surface) -> Result<(), EngineError>;

    fn click(&mut self, _ctx: &mut Context, _x: f64, _y: f64) -> Result<(), EngineError> {
        Ok(())
    }

    fn mouse_down(&mut self, _ctx: &mut Context, _x: f64, _y: f64) -> Result<(), EngineError> {
        Ok(())
    }

    fn mouse_up(&mut self, _ctx: &mut Context, _x: f64, _y: f64) -> Result<(), EngineError> {
        Ok(())
    }

    fn mouse_moved(&mut self, _ctx: &mut Context, _x: f64, _y: f64) -> Result<(), EngineError> {
        Ok(())
    }

    fn mouse_dragged(&mut self, _ctx: &mut Context, _x: f64, _y: f64) -> Result<(), EngineError> {
        Ok(())
    }

    fn key_press(&mut self, _ctx: &mut Context, _key: &str, _code: u32) -> Result<(), EngineError> {
        Ok(())
    }

    fn key_down(&mut self, _ctx: &mut Context, _key: &str, _code: u32) -> Result<(), EngineError> {
        Ok(())
    }

    fn key_up(&mut self, _ctx: &mut Context, _key: &str, _code: u32) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Lifecycle request queued by a sketch; applied at the next frame boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    NoLoop,
    Loop,
    Restart,
    StartRecording,
    StopRecording,
    SaveRecording,
    /// Stop, then save as soon as flushing completes.
    FinishRecording,
    /// Drop the recording in flight without saving.
    AbortRecording,
    SaveFrame(Option<String>),
}

/// What a sketch sees of the scheduler.
#[derive(Debug)]
pub struct Context {
    pub(crate) config: SketchConfig,
    pub(crate) seed: SeedValue,
    pub(crate) frame_count: u64,
    pub(crate) mouse: (f64, f64),
    pub(crate) prev_mouse: (f64, f64),
    pub(crate) mouse_pressed: bool,
    pub(crate) frame_rate: f64,
    pub(crate) delta_time: Option<Duration>,
    pub(crate) requests: Vec<Request>,
}

impl Context {
    pub(crate) fn new(config: SketchConfig) -> Self {
        let seed = config.resolve_seed();
        Self {
            config,
            seed,
            frame_count: 0,
            mouse: (0.0, 0.0),
            prev_mouse: (0.0, 0.0),
            mouse_pressed: false,
            frame_rate: 0.0,
            delta_time: None,
            requests: Vec::new(),
        }
    }

    /// Frames drawn so far. Never decreases.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn width(&self) -> usize {
        self.config.width
    }

    pub fn height(&self) -> usize {
        self.config.height
    }

    /// Frames per loop.
    pub fn duration(&self) -> u64 {
        self.config.duration
    }

    /// Loop phase of the current frame, in [0, 1).
    pub fn phase(&self) -> f64 {
        self.config.phase(self.frame_count)
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    /// Sketch-specific parameters from the config.
    pub fn params(&self) -> &Value {
        &self.config.params
    }

    /// Seed resolved for the current setup.
    pub fn seed(&self) -> &SeedValue {
        &self.seed
    }

    /// A fresh generator seeded from [`Context::seed`].
    ///
    /// Each call starts the same sequence; sketches create one in `setup`
    /// and derive everything else from it.
    pub fn rng(&self) -> Xorshift128 {
        Xorshift128::from_seed(&self.seed)
    }

    /// A noise field seeded from the next draw of `rng`.
    pub fn noise(&self, rng: &mut Xorshift128) -> SimplexNoise {
        let hi = u64::from(rng.next_u32());
        let lo = u64::from(rng.next_u32());
        SimplexNoise::new((hi << 32) | lo)
    }

    pub fn mouse_position(&self) -> (f64, f64) {
        self.mouse
    }

    pub fn prev_mouse_position(&self) -> (f64, f64) {
        self.prev_mouse
    }

    pub fn mouse_pressed(&self) -> bool {
        self.mouse_pressed
    }

    /// Rolling average of measured frames per second.
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Wall time between the last two frames.
    pub fn delta_time(&self) -> Option<Duration> {
        self.delta_time
    }

    /// Stops scheduling after the current frame completes.
    pub fn no_loop(&mut self) {
        self.requests.push(Request::NoLoop);
    }

    /// Resumes scheduling.
    pub fn start_loop(&mut self) {
        self.requests.push(Request::Loop);
    }

    /// Runs `setup` again with a freshly resolved seed.
    pub fn restart(&mut self) {
        self.requests.push(Request::Restart);
    }

    pub fn start_recording(&mut self) {
        self.requests.push(Request::StartRecording);
    }

    pub fn stop_recording(&mut self) {
        self.requests.push(Request::StopRecording);
    }

    pub fn save_recording(&mut self) {
        self.requests.push(Request::SaveRecording);
    }

    /// Stops recording and saves once every frame reached the encoder.
    pub fn finish_recording(&mut self) {
        self.requests.push(Request::FinishRecording);
    }

    pub fn abort_recording(&mut self) {
        self.requests.push(Request::AbortRecording);
    }

    /// Snapshots the surface after this frame. Default name is
    /// `frame-NNNNNN.png`.
    pub fn save_frame(&mut self, name: Option<String>) {
        self.requests.push(Request::SaveFrame(name));
    }

    /// Requests queued since the last frame boundary.
    pub fn pending_requests(&self) -> &[Request] {
        &self.requests
    }
}

//! Frame scheduler: owns a sketch, its surface and an optional recorder,
//! and advances them one frame per [`Scheduler::tick`].
//!
//! Lifecycle:
//!
//! ```text
//! Uninitialized --setup--> Ready --tick--> Running <--no_loop/start_loop--> Paused
//! ```
//!
//! Sketch requests (pause, restart, recording, frame saves) queue on the
//! [`Context`] and are applied at frame boundaries, so no request can cut a
//! frame in half.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::SketchConfig;
use crate::error::EngineError;
use crate::frame::Frame;
use crate::recording::{Artifact, FrameEncoder, Recorder, RecordingState};
use crate::sketch::{Context, Request, Sketch};
use crate::surface::{Raster, Surface};

/// Samples kept for the rolling frame-rate average.
pub const FRAME_RATE_SAMPLES: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Uninitialized,
    Ready,
    Running,
    Paused,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedulerState::Uninitialized => "uninitialized",
            SchedulerState::Ready => "ready",
            SchedulerState::Running => "running",
            SchedulerState::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Result of one [`Scheduler::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Frame `frame` was drawn.
    Drawn { frame: u64 },
    /// The scheduler is paused; nothing was drawn.
    Paused,
}

/// User input delivered to the sketch hooks.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Click { x: f64, y: f64 },
    MouseDown { x: f64, y: f64 },
    MouseUp { x: f64, y: f64 },
    /// Dispatched as `mouse_dragged` while a button is held.
    MouseMove { x: f64, y: f64 },
    KeyPress { key: String, code: u32 },
    KeyDown { key: String, code: u32 },
    KeyUp { key: String, code: u32 },
}

/// Rolling frame-rate and delta-time measurement.
///
/// Wall-clock only; never feeds the animation phase.
#[derive(Debug, Clone, Default)]
pub struct FrameTimer {
    last: Option<Instant>,
    samples: VecDeque<f64>,
    delta: Option<Duration>,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a frame completed at `now`.
    pub fn record(&mut self, now: Instant) {
        if let Some(last) = self.last {
            let delta = now.saturating_duration_since(last);
            self.delta = Some(delta);
            let secs = delta.as_secs_f64();
            if secs > 0.0 {
                if self.samples.len() == FRAME_RATE_SAMPLES {
                    self.samples.pop_front();
                }
                self.samples.push_back(1.0 / secs);
            }
        }
        self.last = Some(now);
    }

    /// Average frames per second over the last samples; 0 before two frames.
    pub fn frame_rate(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn delta_time(&self) -> Option<Duration> {
        self.delta
    }
}

/// Automatic whole-loop recording driven by `SketchConfig::recording`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AutoRecord {
    Off,
    /// Waiting for the first loop-start frame.
    Armed,
    /// Capturing until the scheduler reaches `stop_at`.
    Capturing { stop_at: u64 },
    Done,
}

/// Drives one sketch on one surface.
pub struct Scheduler<S: Surface> {
    sketch: Box<dyn Sketch>,
    surface: S,
    ctx: Context,
    state: SchedulerState,
    recorder: Option<Recorder>,
    auto_record: AutoRecord,
    save_when_flushed: bool,
    timer: FrameTimer,
    saved_frames: Vec<(String, Frame)>,
}

impl<S: Surface> fmt::Debug for Scheduler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("state", &self.state)
            .field("frame_count", &self.ctx.frame_count)
            .field("recorder", &self.recorder)
            .field("auto_record", &self.auto_record)
            .finish_non_exhaustive()
    }
}

impl Scheduler<Raster> {
    /// Builds a scheduler on a fresh [`Raster`] sized from the config after
    /// `preload`.
    pub fn headless(
        mut sketch: Box<dyn Sketch>,
        mut config: SketchConfig,
    ) -> Result<Self, EngineError> {
        sketch.preload(&mut config);
        config.validate()?;
        let surface = Raster::new(config.width, config.height)?;
        Ok(Self::assemble(sketch, config, surface))
    }
}

impl<S: Surface> Scheduler<S> {
    /// Builds a scheduler on an existing surface.
    ///
    /// Returns `EngineError::SizeMismatch` if the surface does not match the
    /// config dimensions after `preload`.
    pub fn new(
        mut sketch: Box<dyn Sketch>,
        mut config: SketchConfig,
        surface: S,
    ) -> Result<Self, EngineError> {
        sketch.preload(&mut config);
        config.validate()?;
        if surface.width() != config.width || surface.height() != config.height {
            return Err(EngineError::SizeMismatch {
                lhs_w: config.width,
                lhs_h: config.height,
                rhs_w: surface.width(),
                rhs_h: surface.height(),
            });
        }
        Ok(Self::assemble(sketch, config, surface))
    }

    fn assemble(sketch: Box<dyn Sketch>, config: SketchConfig, surface: S) -> Self {
        let auto_record = if config.recording {
            AutoRecord::Armed
        } else {
            AutoRecord::Off
        };
        Self {
            sketch,
            surface,
            ctx: Context::new(config),
            state: SchedulerState::Uninitialized,
            recorder: None,
            auto_record,
            save_when_flushed: false,
            timer: FrameTimer::new(),
            saved_frames: Vec::new(),
        }
    }

    /// Attaches an encoder for recordings.
    pub fn with_encoder(self, encoder: Box<dyn FrameEncoder>) -> Self {
        self.with_recorder(Recorder::new(encoder))
    }

    pub fn with_recorder(mut self, recorder: Recorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn frame_count(&self) -> u64 {
        self.ctx.frame_count
    }

    pub fn config(&self) -> &SketchConfig {
        &self.ctx.config
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn recorder(&self) -> Option<&Recorder> {
        self.recorder.as_ref()
    }

    pub fn recording_state(&self) -> Option<RecordingState> {
        self.recorder.as_ref().map(Recorder::state)
    }

    /// Artifact of the last saved recording.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.recorder.as_ref().and_then(Recorder::artifact)
    }

    pub fn frame_rate(&self) -> f64 {
        self.timer.frame_rate()
    }

    /// Snapshot of the surface as of the last drawn frame.
    pub fn snapshot(&self) -> Frame {
        self.surface.snapshot()
    }

    /// Drains frames saved through `Context::save_frame`.
    pub fn take_saved_frames(&mut self) -> Vec<(String, Frame)> {
        std::mem::take(&mut self.saved_frames)
    }

    /// Runs the sketch's `setup` with a freshly resolved seed.
    ///
    /// Valid in any state; the frame counter is kept. On error the state is
    /// left unchanged.
    pub fn setup(&mut self) -> Result<(), EngineError> {
        self.ctx.seed = self.ctx.config.resolve_seed();
        self.sketch.setup(&mut self.ctx)?;
        tracing::debug!(seed = %self.ctx.seed, frame = self.ctx.frame_count, "sketch setup");
        self.state = SchedulerState::Ready;
        Ok(())
    }

    /// Pauses after the current frame.
    pub fn no_loop(&mut self) {
        if self.state == SchedulerState::Running {
            self.state = SchedulerState::Paused;
            tracing::debug!(frame = self.ctx.frame_count, "loop paused");
        }
    }

    /// Resumes a paused scheduler.
    pub fn start_loop(&mut self) {
        if self.state == SchedulerState::Paused {
            self.state = SchedulerState::Running;
            tracing::debug!(frame = self.ctx.frame_count, "loop resumed");
        }
    }

    /// Starts a manual recording at the next frame.
    ///
    /// Valid from `Idle`. A `Saved` recorder is reset first and its artifact
    /// dropped, so one recording can follow another. A recording still in
    /// flight is an `InvalidState` error.
    pub fn start_recording(&mut self) -> Result<(), EngineError> {
        let frame = self.ctx.frame_count;
        let running = self.state == SchedulerState::Running;
        let recorder = self.recorder_mut("start recording")?;
        if recorder.state() == RecordingState::Saved {
            recorder.reset()?;
        }
        recorder.start(frame, running)
    }

    pub fn stop_recording(&mut self) -> Result<(), EngineError> {
        self.recorder_mut("stop recording")?.stop()
    }

    /// Saves a stopped and fully flushed recording.
    pub fn save_recording(&mut self) -> Result<&Artifact, EngineError> {
        self.recorder_mut("save recording")?.save()
    }

    /// Drops the recording in flight without saving it.
    ///
    /// An automatic recording that is aborted is not restarted.
    pub fn abort_recording(&mut self) -> Result<(), EngineError> {
        self.recorder_mut("abort recording")?.abort()?;
        self.save_when_flushed = false;
        if let AutoRecord::Capturing { .. } = self.auto_record {
            self.auto_record = AutoRecord::Done;
        }
        Ok(())
    }

    fn recorder_mut(&mut self, operation: &'static str) -> Result<&mut Recorder, EngineError> {
        self.recorder
            .as_mut()
            .ok_or_else(|| EngineError::invalid_state(operation, "no encoder is attached"))
    }

    /// Delivers one input event to the sketch.
    ///
    /// Requests the hook queues are applied immediately. A hook error or a
    /// failed request pauses the scheduler and is returned.
    pub fn dispatch(&mut self, input: Input) -> Result<(), EngineError> {
        let result = match &input {
            Input::Click { x, y } => {
                self.move_mouse(*x, *y);
                self.sketch.click(&mut self.ctx, *x, *y)
            }
            Input::MouseDown { x, y } => {
                self.move_mouse(*x, *y);
                self.ctx.mouse_pressed = true;
                self.sketch.mouse_down(&mut self.ctx, *x, *y)
            }
            Input::MouseUp { x, y } => {
                self.move_mouse(*x, *y);
                self.ctx.mouse_pressed = false;
                self.sketch.mouse_up(&mut self.ctx, *x, *y)
            }
            Input::MouseMove { x, y } => {
                self.move_mouse(*x, *y);
                if self.ctx.mouse_pressed {
                    self.sketch.mouse_dragged(&mut self.ctx, *x, *y)
                } else {
                    self.sketch.mouse_moved(&mut self.ctx, *x, *y)
                }
            }
            Input::KeyPress { key, code } => self.sketch.key_press(&mut self.ctx, key, *code),
            Input::KeyDown { key, code } => self.sketch.key_down(&mut self.ctx, key, *code),
            Input::KeyUp { key, code } => self.sketch.key_up(&mut self.ctx, key, *code),
        };
        match result.and_then(|()| self.apply_requests()) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fault(e, "input")),
        }
    }

    fn move_mouse(&mut self, x: f64, y: f64) {
        self.ctx.prev_mouse = self.ctx.mouse;
        self.ctx.mouse = (x, y);
    }

    /// Advances one frame.
    ///
    /// Order: pending requests, auto-record bookkeeping, `draw` between a
    /// surface save/restore, requests queued by `draw`, capture, counter
    /// increment, recorder flush. Any failure along the way pauses the
    /// scheduler and is returned. A draw error leaves the counter untouched.
    pub fn tick(&mut self) -> Result<Tick, EngineError> {
        if self.state == SchedulerState::Uninitialized {
            self.setup()?;
        }
        if self.state == SchedulerState::Ready {
            self.state = SchedulerState::Running;
        }
        if let Err(e) = self.apply_requests() {
            return Err(self.fault(e, "request"));
        }
        if self.state == SchedulerState::Paused {
            if let Err(e) = self.poll_recorder() {
                return Err(self.fault(e, "recorder"));
            }
            return Ok(Tick::Paused);
        }

        let frame = self.ctx.frame_count;
        self.update_auto_record(frame);

        let baseline = self.surface.depth();
        self.surface.save();
        let drawn = self.sketch.draw(&mut self.ctx, &mut self.surface);
        let restored = self.unwind_surface(baseline);
        if let Err(e) = drawn.and(restored) {
            return Err(self.fault(e, "draw"));
        }

        let applied = self.apply_requests();
        let captured = match self.recorder.as_mut() {
            Some(recorder) if recorder.state() == RecordingState::Recording => {
                recorder.capture(frame, self.surface.snapshot())
            }
            _ => Ok(()),
        };
        self.ctx.frame_count += 1;
        self.timer.record(Instant::now());
        self.ctx.frame_rate = self.timer.frame_rate();
        self.ctx.delta_time = self.timer.delta_time();
        let polled = self.poll_recorder();
        if let Err(e) = applied.and(captured).and(polled) {
            return Err(self.fault(e, "frame"));
        }
        Ok(Tick::Drawn { frame })
    }

    /// Pauses after a failure and clears pending requests.
    ///
    /// A recording that the failure ended is never saved afterwards.
    fn fault(&mut self, error: EngineError, stage: &'static str) -> EngineError {
        self.ctx.requests.clear();
        if matches!(self.state, SchedulerState::Running | SchedulerState::Ready) {
            self.state = SchedulerState::Paused;
        }
        let in_flight = matches!(
            self.recording_state(),
            Some(RecordingState::Recording | RecordingState::Stopping)
        );
        if !in_flight {
            self.save_when_flushed = false;
            if let AutoRecord::Capturing { .. } = self.auto_record {
                self.auto_record = AutoRecord::Done;
            }
        }
        tracing::warn!(
            frame = self.ctx.frame_count,
            stage,
            error = %error,
            "scheduler paused after failure"
        );
        error
    }

    /// Restores the surface to `baseline` depth, popping anything `draw`
    /// left saved.
    fn unwind_surface(&mut self, baseline: usize) -> Result<(), EngineError> {
        while self.surface.depth() > baseline {
            self.surface.restore()?;
        }
        Ok(())
    }

    /// Starts or stops the automatic recording. Never fails: a recording the
    /// sketch already started at the loop start is adopted, and one that
    /// cannot start is skipped with a warning.
    fn update_auto_record(&mut self, frame: u64) {
        if self.auto_record == AutoRecord::Armed && self.recorder.is_none() {
            tracing::warn!("recording requested in config but no encoder is attached");
            self.auto_record = AutoRecord::Off;
        }
        let duration = self.ctx.config.duration;
        match self.auto_record {
            AutoRecord::Armed if self.ctx.config.is_loop_start(frame) => {
                let adopted = self
                    .recorder
                    .as_ref()
                    .filter(|r| r.state() == RecordingState::Recording)
                    .map(Recorder::first_frame);
                let stop_at = match adopted {
                    Some(first) => {
                        tracing::info!(first, "adopting sketch recording");
                        Some(first + duration)
                    }
                    None => match self.start_recording() {
                        Ok(()) => Some(frame + duration),
                        Err(e) => {
                            tracing::warn!(frame, error = %e, "automatic recording skipped");
                            None
                        }
                    },
                };
                match stop_at {
                    Some(stop_at) => {
                        self.auto_record = AutoRecord::Capturing { stop_at };
                        self.save_when_flushed = true;
                    }
                    None => self.auto_record = AutoRecord::Off,
                }
            }
            AutoRecord::Capturing { stop_at } if frame >= stop_at => {
                if self.recording_state() == Some(RecordingState::Recording) {
                    if let Err(e) = self.stop_recording() {
                        tracing::warn!(frame, error = %e, "automatic stop failed");
                    }
                }
                self.auto_record = AutoRecord::Done;
            }
            _ => {}
        }
    }

    fn poll_recorder(&mut self) -> Result<(), EngineError> {
        let Some(recorder) = self.recorder.as_mut() else {
            return Ok(());
        };
        let flushed = recorder.poll()?;
        if flushed && self.save_when_flushed && recorder.state() == RecordingState::Stopping {
            self.save_when_flushed = false;
            recorder.save()?;
        }
        Ok(())
    }

    /// Applies queued requests in order; the first error is returned after
    /// the rest have been applied.
    fn apply_requests(&mut self) -> Result<(), EngineError> {
        let requests = std::mem::take(&mut self.ctx.requests);
        let mut first_err = None;
        for request in requests {
            if let Err(e) = self.apply(request) {
                tracing::warn!(error = %e, "sketch request failed");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn apply(&mut self, request: Request) -> Result<(), EngineError> {
        match request {
            Request::NoLoop => self.no_loop(),
            Request::Loop => self.start_loop(),
            Request::Restart => {
                let resume = self.state == SchedulerState::Running;
                self.setup()?;
                if resume {
                    self.state = SchedulerState::Running;
                }
                // requests from the nested setup run at the next boundary
            }
            Request::StartRecording => self.start_recording()?,
            Request::StopRecording => self.stop_recording()?,
            Request::SaveRecording => {
                self.save_recording()?;
            }
            Request::FinishRecording => {
                self.stop_recording()?;
                self.save_when_flushed = true;
            }
            Request::AbortRecording => self.abort_recording()?,
            Request::SaveFrame(name) => {
                let name =
                    name.unwrap_or_else(|| format!("frame-{:06}.png", self.ctx.frame_count));
                self.saved_frames.push((name, self.surface.snapshot()));
            }
        }
        Ok(())
    }

    /// Flushes any buffered frames and saves a stopped recording.
    pub fn finish(&mut self) -> Result<Option<&Artifact>, EngineError> {
        let Some(recorder) = self.recorder.as_mut() else {
            return Ok(None);
        };
        match recorder.state() {
            RecordingState::Recording => {
                recorder.stop()?;
                recorder.flush()?;
                recorder.save()?;
            }
            RecordingState::Stopping => {
                recorder.flush()?;
                recorder.save()?;
            }
            RecordingState::Idle | RecordingState::Saved => {}
        }
        self.save_when_flushed = false;
        Ok(recorder.artifact())
    }

    /// Runs `ticks` ticks back to back, returning the number of frames drawn.
    ///
    /// Stops at the first error; the scheduler stays consistent and can be
    /// resumed.
    pub fn run_for(&mut self, ticks: u64) -> Result<u64, EngineError> {
        let mut drawn = 0;
        for _ in 0..ticks {
            if let Tick::Drawn { .. } = self.tick()? {
                drawn += 1;
            }
        }
        Ok(drawn)
    }

    /// Ticks until the automatic recording is saved, or `max_ticks` elapse.
    pub fn run_until_saved(&mut self, max_ticks: u64) -> Result<Option<&Artifact>, EngineError> {
        for _ in 0..max_ticks {
            if self.recording_state() == Some(RecordingState::Saved) {
                break;
            }
            self.tick()?;
        }
        Ok(self.artifact())
    }

    /// Ticks at the configured frame rate until `should_stop` returns true.
    ///
    /// Errors are logged and the loop continues; a failed tick leaves the
    /// scheduler paused until a hook resumes it.
    pub fn run_paced(&mut self, mut should_stop: impl FnMut(&Self) -> bool) {
        let period = Duration::from_secs_f64(1.0 / self.ctx.config.fps);
        while !should_stop(self) {
            let started = Instant::now();
            if let Err(e) = self.tick() {
                tracing::error!(error = %e, frame = self.ctx.frame_count, "tick failed");
            }
            if let Some(rest) = period.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Rgba;
    use crate::recording::{ArtifactKind, MemoryEncoder};
    use std::sync::{Arc, Mutex};

    /// Paints a gray level that follows the loop phase.
    struct Phase;

    impl Sketch for Phase {
        fn setup(&mut self, _ctx: &mut Context) -> Result<(), EngineError> {
            Ok(())
        }

        fn draw(&mut self, ctx: &mut Context, s: &mut dyn Surface) -> Result<(), EngineError> {
            let level = (ctx.phase() * 255.0).round() as u8;
            s.background(Rgba::gray(level));
            Ok(())
        }
    }

    /// Shared log of what the sketch observed.
    #[derive(Default)]
    struct Log {
        setups: usize,
        draws: Vec<u64>,
        events: Vec<String>,
    }

    struct Tracker {
        log: Arc<Mutex<Log>>,
        fail_on: Option<u64>,
        pause_on: Option<u64>,
    }

    impl Tracker {
        fn new(log: &Arc<Mutex<Log>>) -> Self {
            Self {
                log: Arc::clone(log),
                fail_on: None,
                pause_on: None,
            }
        }
    }

    impl Sketch for Tracker {
        fn setup(&mut self, _ctx: &mut Context) -> Result<(), EngineError> {
            self.log.lock().unwrap().setups += 1;
            Ok(())
        }

        fn draw(&mut self, ctx: &mut Context, s: &mut dyn Surface) -> Result<(), EngineError> {
            let frame = ctx.frame_count();
            if self.fail_on == Some(frame) {
                return Err(EngineError::InvalidConfig("boom".into()));
            }
            if self.pause_on == Some(frame) {
                ctx.no_loop();
            }
            s.translate(1.0, 1.0);
            s.save();
            self.log.lock().unwrap().draws.push(frame);
            Ok(())
        }

        fn click(&mut self, ctx: &mut Context, x: f64, y: f64) -> Result<(), EngineError> {
            self.log.lock().unwrap().events.push(format!("click {x} {y}"));
            ctx.restart();
            Ok(())
        }

        fn mouse_moved(&mut self, _ctx: &mut Context, x: f64, y: f64) -> Result<(), EngineError> {
            self.log.lock().unwrap().events.push(format!("moved {x} {y}"));
            Ok(())
        }

        fn mouse_dragged(&mut self, _ctx: &mut Context, x: f64, y: f64) -> Result<(), EngineError> {
            self.log.lock().unwrap().events.push(format!("dragged {x} {y}"));
            Ok(())
        }

        fn key_press(
            &mut self,
            ctx: &mut Context,
            key: &str,
            _code: u32,
        ) -> Result<(), EngineError> {
            match key {
                "p" => ctx.no_loop(),
                "x" => return Err(EngineError::InvalidConfig("bad key".into())),
                _ => ctx.start_loop(),
            }
            Ok(())
        }
    }

    fn config(duration: u64) -> SketchConfig {
        SketchConfig::new(4, 4).with_duration(duration).with_seed(7)
    }

    fn tracker(log: &Arc<Mutex<Log>>) -> Box<dyn Sketch> {
        Box::new(Tracker::new(log))
    }

    #[test]
    fn first_tick_runs_setup_then_draws_frame_zero() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut s = Scheduler::headless(tracker(&log), config(10)).unwrap();
        assert_eq!(s.state(), SchedulerState::Uninitialized);
        assert_eq!(s.tick().unwrap(), Tick::Drawn { frame: 0 });
        assert_eq!(s.state(), SchedulerState::Running);
        assert_eq!(s.frame_count(), 1);
        assert_eq!(log.lock().unwrap().setups, 1);
    }

    #[test]
    fn frame_counter_is_monotonic() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut s = Scheduler::headless(tracker(&log), config(3)).unwrap();
        assert_eq!(s.run_for(7).unwrap(), 7);
        assert_eq!(log.lock().unwrap().draws, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn draw_leaves_surface_balanced() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut s = Scheduler::headless(tracker(&log), config(3)).unwrap();
        s.run_for(3).unwrap();
        assert_eq!(s.surface().depth(), 0);
    }

    #[test]
    fn loop_seam_is_pixel_identical() {
        let mut s = Scheduler::headless(Box::new(Phase), config(8)).unwrap();
        s.tick().unwrap();
        let first = s.snapshot();
        s.run_for(7).unwrap();
        let last = s.snapshot();
        s.tick().unwrap();
        let wrapped = s.snapshot();
        assert_eq!(first.max_channel_delta(&wrapped).unwrap(), 0);
        assert_ne!(last.max_channel_delta(&wrapped).unwrap(), 0);
    }

    #[test]
    fn no_loop_from_draw_finishes_current_frame() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut sketch = Tracker::new(&log);
        sketch.pause_on = Some(2);
        let mut s = Scheduler::headless(Box::new(sketch), config(10)).unwrap();
        assert_eq!(s.run_for(5).unwrap(), 3);
        assert_eq!(s.state(), SchedulerState::Paused);
        assert_eq!(s.frame_count(), 3);
        assert_eq!(s.tick().unwrap(), Tick::Paused);
    }

    #[test]
    fn draw_error_pauses_without_advancing() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut sketch = Tracker::new(&log);
        sketch.fail_on = Some(1);
        let mut s = Scheduler::headless(Box::new(sketch), config(10)).unwrap();
        s.tick().unwrap();
        assert!(s.tick().is_err());
        assert_eq!(s.state(), SchedulerState::Paused);
        assert_eq!(s.frame_count(), 1);
        assert_eq!(s.surface().depth(), 0);
        assert_eq!(s.tick().unwrap(), Tick::Paused);
    }

    #[test]
    fn key_hook_pauses_and_resumes() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut s = Scheduler::headless(tracker(&log), config(10)).unwrap();
        s.tick().unwrap();
        s.dispatch(Input::KeyPress { key: "p".into(), code: 80 }).unwrap();
        assert_eq!(s.state(), SchedulerState::Paused);
        s.dispatch(Input::KeyPress { key: "r".into(), code: 82 }).unwrap();
        assert_eq!(s.state(), SchedulerState::Running);
    }

    #[test]
    fn hook_error_pauses_scheduler() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut s = Scheduler::headless(tracker(&log), config(10)).unwrap();
        s.tick().unwrap();
        assert!(s.dispatch(Input::KeyPress { key: "x".into(), code: 88 }).is_err());
        assert_eq!(s.state(), SchedulerState::Paused);
    }

    #[test]
    fn click_restart_reruns_setup_and_keeps_counter() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut s = Scheduler::headless(tracker(&log), config(10)).unwrap();
        s.run_for(4).unwrap();
        s.dispatch(Input::Click { x: 1.0, y: 2.0 }).unwrap();
        assert_eq!(log.lock().unwrap().setups, 2);
        assert_eq!(s.frame_count(), 4);
        assert_eq!(s.state(), SchedulerState::Running);
        assert_eq!(s.tick().unwrap(), Tick::Drawn { frame: 4 });
    }

    #[test]
    fn mouse_move_becomes_drag_while_pressed() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut s = Scheduler::headless(tracker(&log), config(10)).unwrap();
        s.dispatch(Input::MouseMove { x: 1.0, y: 1.0 }).unwrap();
        s.dispatch(Input::MouseDown { x: 1.0, y: 1.0 }).unwrap();
        s.dispatch(Input::MouseMove { x: 2.0, y: 3.0 }).unwrap();
        s.dispatch(Input::MouseUp { x: 2.0, y: 3.0 }).unwrap();
        s.dispatch(Input::MouseMove { x: 0.5, y: 0.5 }).unwrap();
        assert_eq!(
            log.lock().unwrap().events,
            vec!["moved 1 1", "dragged 2 3", "moved 0.5 0.5"]
        );
        assert_eq!(s.context().prev_mouse_position(), (2.0, 3.0));
        assert_eq!(s.context().mouse_position(), (0.5, 0.5));
        assert!(!s.context().mouse_pressed());
    }

    #[test]
    fn auto_record_captures_exactly_one_loop() {
        let mut s = Scheduler::headless(Box::new(Phase), config(6).with_recording(true))
            .unwrap()
            .with_encoder(Box::new(MemoryEncoder::new()));
        let artifact = s.run_until_saved(100).unwrap().cloned().unwrap();
        assert_eq!(artifact.frames, 6);
        assert_eq!(s.recording_state(), Some(RecordingState::Saved));
        assert_eq!(s.recorder().unwrap().first_frame(), 0);
    }

    #[test]
    fn auto_record_waits_for_loop_start_with_offset() {
        let mut cfg = config(5).with_recording(true);
        cfg.frame_offset = 2;
        let mut s = Scheduler::headless(Box::new(Phase), cfg)
            .unwrap()
            .with_encoder(Box::new(MemoryEncoder::new()));
        let artifact = s.run_until_saved(100).unwrap().cloned().unwrap();
        assert_eq!(artifact.frames, 5);
        let first = s.recorder().unwrap().first_frame();
        assert!(s.config().is_loop_start(first));
    }

    #[test]
    fn auto_record_without_encoder_still_draws() {
        let mut s = Scheduler::headless(Box::new(Phase), config(4).with_recording(true)).unwrap();
        assert_eq!(s.run_for(5).unwrap(), 5);
        assert_eq!(s.recording_state(), None);
    }

    #[test]
    fn finish_recording_request_saves_after_flush() {
        struct Finisher;
        impl Sketch for Finisher {
            fn setup(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
                ctx.start_recording();
                Ok(())
            }
            fn draw(&mut self, ctx: &mut Context, s: &mut dyn Surface) -> Result<(), EngineError> {
                s.background(Rgba::BLACK);
                if ctx.frame_count() == 3 {
                    ctx.finish_recording();
                }
                Ok(())
            }
        }
        let mut s = Scheduler::headless(Box::new(Finisher), config(10))
            .unwrap()
            .with_encoder(Box::new(MemoryEncoder::new()));
        s.run_for(5).unwrap();
        assert_eq!(s.recording_state(), Some(RecordingState::Saved));
        assert_eq!(s.artifact().unwrap().frames, 3);
    }

    #[test]
    fn manual_recording_lifecycle() {
        let mut s = Scheduler::headless(Box::new(Phase), config(10))
            .unwrap()
            .with_encoder(Box::new(MemoryEncoder::new()));
        s.tick().unwrap();
        s.start_recording().unwrap();
        s.run_for(4).unwrap();
        s.stop_recording().unwrap();
        let artifact = s.finish().unwrap().cloned().unwrap();
        assert_eq!(artifact.frames, 4);
    }

    #[test]
    fn recording_before_running_is_rejected() {
        let mut s = Scheduler::headless(Box::new(Phase), config(10))
            .unwrap()
            .with_encoder(Box::new(MemoryEncoder::new()));
        assert!(matches!(
            s.start_recording(),
            Err(EngineError::InvalidState { .. })
        ));
    }

    #[test]
    fn recording_without_encoder_is_rejected() {
        let mut s = Scheduler::headless(Box::new(Phase), config(10)).unwrap();
        s.tick().unwrap();
        assert!(matches!(
            s.start_recording(),
            Err(EngineError::InvalidState { .. })
        ));
    }

    #[test]
    fn save_frame_request_snapshots_after_draw() {
        struct Still;
        impl Sketch for Still {
            fn setup(&mut self, _ctx: &mut Context) -> Result<(), EngineError> {
                Ok(())
            }
            fn draw(&mut self, ctx: &mut Context, s: &mut dyn Surface) -> Result<(), EngineError> {
                s.background(Rgba::WHITE);
                if ctx.frame_count() == 1 {
                    ctx.save_frame(None);
                }
                Ok(())
            }
        }
        let mut s = Scheduler::headless(Box::new(Still), config(10)).unwrap();
        s.run_for(3).unwrap();
        let saved = s.take_saved_frames();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "frame-000001.png");
        assert_eq!(saved[0].1.pixel(0, 0), Some(Rgba::WHITE));
        assert!(s.take_saved_frames().is_empty());
    }

    #[test]
    fn mismatched_surface_is_rejected() {
        let surface = Raster::new(3, 3).unwrap();
        assert!(matches!(
            Scheduler::new(Box::new(Phase), config(10), surface),
            Err(EngineError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn preload_can_resize() {
        struct Wide;
        impl Sketch for Wide {
            fn preload(&mut self, config: &mut SketchConfig) {
                config.width = 16;
            }
            fn setup(&mut self, _ctx: &mut Context) -> Result<(), EngineError> {
                Ok(())
            }
            fn draw(&mut self, _c: &mut Context, _s: &mut dyn Surface) -> Result<(), EngineError> {
                Ok(())
            }
        }
        let s = Scheduler::headless(Box::new(Wide), config(10)).unwrap();
        assert_eq!(s.surface().width(), 16);
    }

    #[test]
    fn frame_timer_averages_recent_samples() {
        let mut t = FrameTimer::new();
        let start = Instant::now();
        assert_eq!(t.frame_rate(), 0.0);
        for i in 0..=10u32 {
            t.record(start + Duration::from_millis(u64::from(i) * 20));
        }
        assert!((t.frame_rate() - 50.0).abs() < 1e-6);
        assert_eq!(t.delta_time(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn frame_timer_keeps_bounded_window() {
        let mut t = FrameTimer::new();
        let start = Instant::now();
        for i in 0..200u64 {
            t.record(start + Duration::from_millis(i * 10));
        }
        assert_eq!(t.samples.len(), FRAME_RATE_SAMPLES);
    }

    /// Keeps encoded indices and fails once on `fail_at`.
    struct Flaky {
        fail_at: u64,
        failed: bool,
        frames: Vec<u64>,
    }

    impl FrameEncoder for Flaky {
        fn encode(&mut self, index: u64, _frame: &Frame) -> Result<(), EngineError> {
            if index == self.fail_at && !self.failed {
                self.failed = true;
                return Err(EngineError::Encode("transient".into()));
            }
            self.frames.push(index);
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

    #[test]
    fn sketch_recording_started_in_setup_is_adopted() {
        struct SelfRecording;
        impl Sketch for SelfRecording {
            fn setup(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
                if ctx.config().recording {
                    ctx.start_recording();
                }
                Ok(())
            }
            fn draw(&mut self, ctx: &mut Context, s: &mut dyn Surface) -> Result<(), EngineError> {
                s.background(Rgba::gray(ctx.frame_count() as u8));
                Ok(())
            }
        }
        let mut s = Scheduler::headless(Box::new(SelfRecording), config(4).with_recording(true))
            .unwrap()
            .with_encoder(Box::new(MemoryEncoder::new()));
        let artifact = s.run_until_saved(20).unwrap().cloned().unwrap();
        assert_eq!(artifact.frames, 4);
        assert_eq!(s.recorder().unwrap().first_frame(), 0);
        assert_eq!(s.state(), SchedulerState::Running);
        assert!(s.frame_count() > 4);
    }

    #[test]
    fn encoder_failure_never_yields_saved_artifact() {
        let encoder = Flaky {
            fail_at: 2,
            failed: false,
            frames: Vec::new(),
        };
        let mut s = Scheduler::headless(Box::new(Phase), config(6).with_recording(true))
            .unwrap()
            .with_encoder(Box::new(encoder));
        s.run_for(2).unwrap();
        assert!(matches!(s.tick(), Err(EngineError::Encode(_))));
        assert_eq!(s.state(), SchedulerState::Paused);
        assert_eq!(s.recording_state(), Some(RecordingState::Idle));

        s.start_loop();
        s.run_for(20).unwrap();
        assert_eq!(s.recording_state(), Some(RecordingState::Idle));
        assert!(s.artifact().is_none());
    }

    #[test]
    fn failed_setup_request_pauses_before_drawing() {
        struct StopsEarly;
        impl Sketch for StopsEarly {
            fn setup(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
                ctx.stop_recording();
                Ok(())
            }
            fn draw(&mut self, _c: &mut Context, _s: &mut dyn Surface) -> Result<(), EngineError> {
                Ok(())
            }
        }
        let mut s = Scheduler::headless(Box::new(StopsEarly), config(4)).unwrap();
        assert!(matches!(s.tick(), Err(EngineError::InvalidState { .. })));
        assert_eq!(s.state(), SchedulerState::Paused);
        assert_eq!(s.frame_count(), 0);
        assert_eq!(s.tick().unwrap(), Tick::Paused);
        s.start_loop();
        assert_eq!(s.tick().unwrap(), Tick::Drawn { frame: 0 });
    }

    #[test]
    fn failed_draw_request_pauses_after_the_frame() {
        struct SavesEarly;
        impl Sketch for SavesEarly {
            fn setup(&mut self, _ctx: &mut Context) -> Result<(), EngineError> {
                Ok(())
            }
            fn draw(&mut self, ctx: &mut Context, _s: &mut dyn Surface) -> Result<(), EngineError> {
                if ctx.frame_count() == 1 {
                    ctx.save_recording();
                    ctx.save_frame(None);
                }
                Ok(())
            }
        }
        let mut s = Scheduler::headless(Box::new(SavesEarly), config(4))
            .unwrap()
            .with_encoder(Box::new(MemoryEncoder::new()));
        s.tick().unwrap();
        assert!(s.tick().is_err());
        assert_eq!(s.state(), SchedulerState::Paused);
        assert_eq!(s.frame_count(), 2);
        assert_eq!(s.tick().unwrap(), Tick::Paused);
    }

    #[test]
    fn abort_request_drops_auto_recording() {
        struct Abandons;
        impl Sketch for Abandons {
            fn setup(&mut self, _ctx: &mut Context) -> Result<(), EngineError> {
                Ok(())
            }
            fn draw(&mut self, ctx: &mut Context, s: &mut dyn Surface) -> Result<(), EngineError> {
                s.background(Rgba::BLACK);
                if ctx.frame_count() == 2 {
                    ctx.abort_recording();
                }
                Ok(())
            }
        }
        let mut s = Scheduler::headless(Box::new(Abandons), config(6).with_recording(true))
            .unwrap()
            .with_encoder(Box::new(MemoryEncoder::new()));
        s.run_for(14).unwrap();
        assert_eq!(s.recording_state(), Some(RecordingState::Idle));
        assert!(s.artifact().is_none());
        assert_eq!(s.state(), SchedulerState::Running);
    }

    #[test]
    fn abort_recording_allows_a_fresh_start() {
        let mut s = Scheduler::headless(Box::new(Phase), config(10))
            .unwrap()
            .with_encoder(Box::new(MemoryEncoder::new()));
        assert!(s.abort_recording().is_err());
        s.tick().unwrap();
        s.start_recording().unwrap();
        s.run_for(2).unwrap();
        s.abort_recording().unwrap();
        assert_eq!(s.recording_state(), Some(RecordingState::Idle));

        s.start_recording().unwrap();
        s.run_for(3).unwrap();
        s.stop_recording().unwrap();
        let artifact = s.finish().unwrap().cloned().unwrap();
        assert_eq!(artifact.frames, 3);
        assert_eq!(s.recorder().unwrap().first_frame(), 3);
    }

    #[test]
    fn start_after_save_begins_a_new_recording() {
        let mut s = Scheduler::headless(Box::new(Phase), config(10))
            .unwrap()
            .with_encoder(Box::new(MemoryEncoder::new()));
        s.tick().unwrap();
        s.start_recording().unwrap();
        s.run_for(2).unwrap();
        assert_eq!(s.finish().unwrap().unwrap().frames, 2);

        s.start_recording().unwrap();
        assert!(s.artifact().is_none());
        assert!(s.start_recording().is_err());
        s.run_for(3).unwrap();
        assert_eq!(s.finish().unwrap().unwrap().frames, 3);
    }
}

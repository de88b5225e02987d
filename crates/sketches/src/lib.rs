#![deny(unsafe_code)]
//! Sketch registry: maps sketch names to implementations, plus PNG snapshots
//! and file-producing frame encoders.
//!
//! Both the CLI and any other front end go through [`SketchKind`] so name
//! dispatch lives in one place.

pub mod circle_particles;
pub mod encode;
pub mod warped_noise;

#[cfg(feature = "png")]
pub mod snapshot;

use sketchbook_core::{Context, EngineError, Sketch, SketchConfig, Surface};

pub use circle_particles::CircleParticles;
pub use warped_noise::WarpedNoise;

/// All available sketch names.
const SKETCH_NAMES: &[&str] = &["warped-noise", "circle-particles"];

/// Enumeration of the bundled sketches.
///
/// Delegates every `Sketch` method to the wrapped implementation. Use
/// [`SketchKind::from_name`] for string-based construction.
#[derive(Debug, Clone)]
pub enum SketchKind {
    /// Domain-warped simplex noise.
    WarpedNoise(WarpedNoise),
    /// Rotating rings of particles.
    CircleParticles(CircleParticles),
}

impl SketchKind {
    /// Constructs a sketch by name.
    ///
    /// Returns `EngineError::UnknownSketch` if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "warped-noise" => Ok(SketchKind::WarpedNoise(WarpedNoise::new())),
            "circle-particles" => Ok(SketchKind::CircleParticles(CircleParticles::new())),
            _ => Err(EngineError::UnknownSketch(name.to_string())),
        }
    }

    pub fn list_sketches() -> &'static [&'static str] {
        SKETCH_NAMES
    }

    pub fn name(&self) -> &'static str {
        match self {
            SketchKind::WarpedNoise(_) => "warped-noise",
            SketchKind::CircleParticles(_) => "circle-particles",
        }
    }
}

impl Sketch for SketchKind {
    fn preload(&mut self, config: &mut SketchConfig) {
        match self {
            SketchKind::WarpedNoise(s) => s.preload(config),
            SketchKind::CircleParticles(s) => s.preload(config),
        }
    }

    fn setup(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        match self {
            SketchKind::WarpedNoise(s) => s.setup(ctx),
            SketchKind::CircleParticles(s) => s.setup(ctx),
        }
    }

    fn draw(&mut self, ctx: &mut Context, surface: &mut dyn Surface) -> Result<(), EngineError> {
        match self {
            SketchKind::WarpedNoise(s) => s.draw(ctx, surface),
            SketchKind::CircleParticles(s) => s.draw(ctx, surface),
        }
    }

    fn click(&mut self, ctx: &mut Context, x: f64, y: f64) -> Result<(), EngineError> {
        match self {
            SketchKind::WarpedNoise(s) => s.click(ctx, x, y),
            SketchKind::CircleParticles(s) => s.click(ctx, x, y),
        }
    }
}

//! Concentric rings of particles, alternating rotation direction.
//!
//! Particle positions are drawn from a generator reset to the same state
//! every frame, and each ring turns by a whole revolution per loop.

use std::f64::consts::{PI, TAU};

use sketchbook_core::params::{param_color, param_f64, param_usize};
use sketchbook_core::{Context, EngineError, Rgba, Sketch, Surface, Xorshift128};

const RINGS: usize = 6;
const PARTICLES: usize = 4_000;
const PARTICLE_RADIUS: f64 = 1.0;
const SCALE: f64 = 0.9;
const EASE_POWER: i32 = 10;

#[derive(Debug, Clone)]
pub struct CircleParticles {
    rings: usize,
    particles: usize,
    particle_radius: f64,
    scale: f64,
    light: Rgba,
    dark: Rgba,
    rotation: f64,
    base: Xorshift128,
}

impl Default for CircleParticles {
    fn default() -> Self {
        Self::new()
    }
}

impl CircleParticles {
    pub fn new() -> Self {
        Self {
            rings: RINGS,
            particles: PARTICLES,
            particle_radius: PARTICLE_RADIUS,
            scale: SCALE,
            light: Rgba::gray(240),
            dark: Rgba::gray(15),
            rotation: 0.0,
            base: Xorshift128::new(0),
        }
    }
}

fn ease_out(x: f64) -> f64 {
    1.0 - (1.0 - x).powi(EASE_POWER)
}

impl Sketch for CircleParticles {
    fn setup(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        let params = ctx.params();
        self.rings = param_usize(params, "rings", RINGS).max(1);
        self.particles = param_usize(params, "particles", PARTICLES);
        self.particle_radius = param_f64(params, "particle_radius", PARTICLE_RADIUS);
        self.scale = param_f64(params, "scale", SCALE);
        self.light = param_color(params, "light", self.light);
        self.dark = param_color(params, "dark", self.dark);

        let mut rng = ctx.rng();
        self.rotation = rng.uniform(0.0, TAU)?;
        self.base = rng.fork();
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context, surface: &mut dyn Surface) -> Result<(), EngineError> {
        let t = ctx.phase();
        let width = ctx.width() as f64;
        let rings = self.rings as f64;
        let ring_width = width / 2.0 / rings;
        let mut rng = self.base.clone();

        surface.background(self.light);
        surface.translate(width / 2.0, ctx.height() as f64 / 2.0);
        surface.scale(self.scale, self.scale);
        surface.rotate(PI / rings + self.rotation);

        for j in (1..=self.rings).rev() {
            let jf = j as f64;
            let outer = jf / (rings + 1.0) * width / 2.0 + ring_width;
            let inner = outer - ring_width;
            let direction = if j % 2 == 0 { -1.0 } else { 1.0 };
            let phi = jf / rings * TAU;
            let gamma = t * direction * TAU;

            surface.fill_circle(0.0, 0.0, outer, self.dark);
            for _ in 0..self.particles {
                let rho = rng.uniform(inner, outer)?;
                let theta = ease_out(rng.next_f64()) * TAU + phi + gamma;
                surface.fill_circle(
                    rho * theta.cos(),
                    rho * theta.sin(),
                    self.particle_radius,
                    self.light,
                );
            }
        }
        surface.fill_circle(0.0, 0.0, ring_width, self.light);
        Ok(())
    }
}

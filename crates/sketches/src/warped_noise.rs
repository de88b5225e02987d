//! Domain-warped noise: each cell samples a base 4D noise field at a point
//! displaced by a chain of 3D noise fields. Time moves around a circle in
//! noise space, so the animation loops without a seam.

use std::f64::consts::TAU;

use sketchbook_core::params::{
    param_color, param_f64, param_f64_clamped, param_octaves, param_usize,
};
use sketchbook_core::{Context, EngineError, Rgba, SimplexNoise, Sketch, Surface};

// -- Defaults --

const NOISE_SCALE: f64 = 0.0025;
const TIME_SCALE: f64 = 0.5;
const WARP_LAYERS: usize = 3;
const CELL: usize = 5;
const OCTAVES: u32 = 2;
const FALLOFF: f64 = 0.75;

/// Offsets separating the x and y displacement samples of a warp layer.
const WARP_X_OFFSET: f64 = 10_000.0;
const WARP_Y_OFFSET: f64 = 20_000.0;

#[derive(Debug, Clone)]
pub struct WarpedNoise {
    noise_scale: f64,
    time_scale: f64,
    cell: usize,
    from: Rgba,
    to: Rgba,
    /// Gradient offset drawn at setup.
    hue_offset: f64,
    /// `fields[0]` is the base field, the rest warp.
    fields: Vec<SimplexNoise>,
}

impl Default for WarpedNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl WarpedNoise {
    pub fn new() -> Self {
        Self {
            noise_scale: NOISE_SCALE,
            time_scale: TIME_SCALE,
            cell: CELL,
            from: Rgba::rgb(20, 24, 82),
            to: Rgba::rgb(250, 196, 92),
            hue_offset: 0.0,
            fields: Vec::new(),
        }
    }

    /// Value in [0, 1] for the cell at `(x, y)` and time point `(tx, ty)`.
    fn sample(&self, x: f64, y: f64, tx: f64, ty: f64) -> f64 {
        let (mut wx, mut wy) = (x, y);
        for field in self.fields.iter().skip(1) {
            let nx = wx * self.noise_scale;
            let ny = wy * self.noise_scale;
            wx += field.noise3(nx, ny, WARP_X_OFFSET + tx);
            wy += field.noise3(nx, ny, WARP_Y_OFFSET + ty);
        }
        let Some(base) = self.fields.first() else {
            return 0.5;
        };
        let n = base.noise4(
            wx * self.noise_scale,
            wy * self.noise_scale,
            tx * self.time_scale,
            ty * self.time_scale,
        );
        (n + 1.0) / 2.0
    }

    /// Maps `v` onto a gradient that runs `from -> to -> from`, shifted by
    /// the setup offset.
    fn color(&self, v: f64) -> Rgba {
        let shifted = (v + self.hue_offset).rem_euclid(1.0);
        let k = 1.0 - (2.0 * shifted - 1.0).abs();
        self.from.lerp(self.to, k)
    }
}

impl Sketch for WarpedNoise {
    fn setup(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        let params = ctx.params();
        self.noise_scale = param_f64(params, "noise_scale", NOISE_SCALE);
        self.time_scale = param_f64(params, "time_scale", TIME_SCALE);
        self.cell = param_usize(params, "cell", CELL).max(1);
        self.from = param_color(params, "from", self.from);
        self.to = param_color(params, "to", self.to);
        let layers = param_usize(params, "layers", WARP_LAYERS);
        let octaves = param_octaves(params, "octaves", OCTAVES);
        let falloff = param_f64_clamped(params, "falloff", FALLOFF, f64::MIN_POSITIVE, 1.0);

        let mut rng = ctx.rng();
        self.hue_offset = rng.next_f64();
        self.fields = (0..=layers)
            .map(|_| ctx.noise(&mut rng).with_detail(octaves, falloff))
            .collect::<Result<_, _>>()?;
        tracing::debug!(layers, octaves, falloff, "warped-noise ready");
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context, surface: &mut dyn Surface) -> Result<(), EngineError> {
        let angle = ctx.phase() * TAU;
        let tx = (1.0 + angle.cos()) * self.time_scale;
        let ty = (1.0 + angle.sin()) * self.time_scale;
        let cell = self.cell as f64;

        surface.background(Rgba::WHITE);
        for y in (0..ctx.height()).step_by(self.cell) {
            for x in (0..ctx.width()).step_by(self.cell) {
                let (fx, fy) = (x as f64, y as f64);
                let color = self.color(self.sample(fx, fy, tx, ty));
                surface.fill_rect(fx, fy, cell, cell, color);
            }
        }
        Ok(())
    }

    fn click(&mut self, ctx: &mut Context, _x: f64, _y: f64) -> Result<(), EngineError> {
        ctx.restart();
        Ok(())
    }
}

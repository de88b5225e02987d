//! The drawing surface sketches paint on.
//!
//! The core only relies on the [`Surface`] contract: operations apply in
//! call order and `save()`/`restore()` nest. [`Raster`] is a small CPU
//! implementation with an affine transform stack, enough for headless
//! rendering, snapshots and recording.

use glam::{DAffine2, DVec2};

use crate::error::EngineError;
use crate::frame::{Frame, Rgba};

/// An immediate-mode 2D painter.
///
/// Transforms compose like an HTML canvas context: each call post-multiplies
/// the current transform, and `save()`/`restore()` push and pop it.
pub trait Surface {
    /// Drawing area width in pixels.
    fn width(&self) -> usize;

    /// Drawing area height in pixels.
    fn height(&self) -> usize;

    /// Pushes the current transform.
    fn save(&mut self);

    /// Pops the transform pushed by the matching `save()`.
    ///
    /// Returns `EngineError::UnbalancedRestore` if nothing was saved.
    fn restore(&mut self) -> Result<(), EngineError>;

    /// Number of `save()` calls not yet restored.
    fn depth(&self) -> usize;

    fn translate(&mut self, dx: f64, dy: f64);

    fn scale(&mut self, sx: f64, sy: f64);

    fn rotate(&mut self, radians: f64);

    /// Scales uniformly around the center of the drawing area.
    fn scale_from_center(&mut self, s: f64) {
        let cx = self.width() as f64 / 2.0;
        let cy = self.height() as f64 / 2.0;
        self.translate(cx, cy);
        self.scale(s, s);
        self.translate(-cx, -cy);
    }

    /// Fills the whole drawing area, ignoring the current transform.
    fn background(&mut self, color: Rgba);

    /// Fills an axis-aligned rectangle in local coordinates.
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba);

    /// Fills a circle in local coordinates.
    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgba);

    /// Copies the current pixels out.
    fn snapshot(&self) -> Frame;
}

/// CPU raster surface backed by a [`Frame`].
#[derive(Debug, Clone)]
pub struct Raster {
    frame: Frame,
    transform: DAffine2,
    stack: Vec<DAffine2>,
}

impl Raster {
    /// Creates a transparent raster.
    ///
    /// Returns `EngineError::InvalidDimensions` for zero or overflowing sizes.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        Ok(Self {
            frame: Frame::new(width, height, Rgba::TRANSPARENT)?,
            transform: DAffine2::IDENTITY,
            stack: Vec::new(),
        })
    }

    /// Current pixels without copying.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Paints every pixel whose center, mapped back to local space, passes
    /// `inside`. `local_min`/`local_max` bound the shape in local space.
    fn fill_shape(
        &mut self,
        local_min: DVec2,
        local_max: DVec2,
        color: Rgba,
        inside: impl Fn(DVec2) -> bool,
    ) {
        if self.transform.matrix2.determinant() == 0.0 {
            return;
        }
        let inverse = self.transform.inverse();

        let corners = [
            local_min,
            DVec2::new(local_max.x, local_min.y),
            local_max,
            DVec2::new(local_min.x, local_max.y),
        ]
        .map(|c| self.transform.transform_point2(c));
        let lo = corners.iter().fold(DVec2::splat(f64::INFINITY), |a, c| a.min(*c));
        let hi = corners
            .iter()
            .fold(DVec2::splat(f64::NEG_INFINITY), |a, c| a.max(*c));

        let x0 = lo.x.floor().max(0.0) as usize;
        let y0 = lo.y.floor().max(0.0) as usize;
        let x1 = (hi.x.ceil().max(0.0) as usize).min(self.frame.width());
        let y1 = (hi.y.ceil().max(0.0) as usize).min(self.frame.height());

        for py in y0..y1 {
            for px in x0..x1 {
                let center = DVec2::new(px as f64 + 0.5, py as f64 + 0.5);
                if inside(inverse.transform_point2(center)) {
                    self.frame.blend_pixel(px, py, color);
                }
            }
        }
    }
}

impl Surface for Raster {
    fn width(&self) -> usize {
        self.frame.width()
    }

    fn height(&self) -> usize {
        self.frame.height()
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) -> Result<(), EngineError> {
        self.transform = self.stack.pop().ok_or(EngineError::UnbalancedRestore)?;
        Ok(())
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.transform = self.transform * DAffine2::from_translation(DVec2::new(dx, dy));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.transform = self.transform * DAffine2::from_scale(DVec2::new(sx, sy));
    }

    fn rotate(&mut self, radians: f64) {
        self.transform = self.transform * DAffine2::from_angle(radians);
    }

    fn background(&mut self, color: Rgba) {
        self.frame.fill(color);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        let min = DVec2::new(x.min(x + w), y.min(y + h));
        let max = DVec2::new(x.max(x + w), y.max(y + h));
        self.fill_shape(min, max, color, |p| {
            p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y
        });
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgba) {
        if r <= 0.0 {
            return;
        }
        let center = DVec2::new(cx, cy);
        let r2 = r * r;
        self.fill_shape(
            center - DVec2::splat(r),
            center + DVec2::splat(r),
            color,
            |p| p.distance_squared(center) <= r2,
        );
    }

    fn snapshot(&self) -> Frame {
        self.frame.clone()
    }
}

//! RGBA frame buffer and the 8-bit color type sketches paint with.
//!
//! A [`Frame`] is what a surface snapshot produces and what the recorder
//! hands to encoders: `width * height` pixels, row-major, 4 bytes each.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Straight (non-premultiplied) 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Opaque gray with all channels set to `v`.
    pub const fn gray(v: u8) -> Self {
        Self::rgb(v, v, v)
    }

    /// Parses `"#rrggbb"` or `"rrggbb"`.
    ///
    /// Returns `EngineError::InvalidConfig` for anything else.
    pub fn from_hex(hex: &str) -> Result<Self, EngineError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(EngineError::InvalidConfig(format!(
                "expected 6 hex digits, got {hex:?}"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|e| EngineError::InvalidConfig(format!("invalid color {hex:?}: {e}")))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Same color with alpha replaced.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Channel-wise linear interpolation, `t` clamped to [0, 1].
    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Row-major RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Creates a frame filled with `fill`.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or the byte length overflows `usize`.
    pub fn new(width: usize, height: usize, fill: Rgba) -> Result<Self, EngineError> {
        let len = byte_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..width * height {
            data.extend_from_slice(&fill.to_array());
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wraps an existing RGBA buffer.
    ///
    /// Returns `EngineError::InvalidDimensions` if the buffer length does not
    /// match `width * height * 4`.
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> Result<Self, EngineError> {
        if byte_len(width, height)? != data.len() {
            return Err(EngineError::InvalidDimensions);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some(Rgba::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ))
    }

    /// Overwrites the pixel at `(x, y)`; out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * 4;
        self.data[i..i + 4].copy_from_slice(&color.to_array());
    }

    /// Source-over blend of `color` onto the pixel at `(x, y)`.
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        match color.a {
            0 => {}
            255 => self.set_pixel(x, y, color),
            alpha => {
                if let Some(dst) = self.pixel(x, y) {
                    let a = f64::from(alpha) / 255.0;
                    let out_a = a + f64::from(dst.a) / 255.0 * (1.0 - a);
                    let blended = dst.lerp(color, a).with_alpha((out_a * 255.0).round() as u8);
                    self.set_pixel(x, y, blended);
                }
            }
        }
    }

    /// Fills every pixel with `color`.
    pub fn fill(&mut self, color: Rgba) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&color.to_array());
        }
    }

    /// Largest absolute per-channel difference against `other`.
    ///
    /// Returns `EngineError::SizeMismatch` if the frames differ in size.
    pub fn max_channel_delta(&self, other: &Frame) -> Result<u8, EngineError> {
        if self.width != other.width || self.height != other.height {
            return Err(EngineError::SizeMismatch {
                lhs_w: self.width,
                lhs_h: self.height,
                rhs_w: other.width,
                rhs_h: other.height,
            });
        }
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a.abs_diff(*b))
            .max()
            .unwrap_or(0))
    }
}

fn byte_len(width: usize, height: usize) -> Result<usize, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .and_then(|px| px.checked_mul(4))
        .ok_or(EngineError::InvalidDimensions)
}

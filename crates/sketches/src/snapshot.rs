//! PNG output for rendered frames.
//!
//! Feature-gated behind `png` (default on) so builds that only stream raw
//! frames to ffmpeg can skip the `image` crate.

use std::path::Path;

use sketchbook_core::{EngineError, Frame};

/// Writes a frame as an RGBA PNG.
///
/// Returns `EngineError::InvalidDimensions` if the frame dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(frame: &Frame, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(frame.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(frame.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, frame.data().to_vec())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path)
        .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))
}

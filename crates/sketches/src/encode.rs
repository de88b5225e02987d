//! [`FrameEncoder`] implementations that produce files.
//!
//! - [`PngSequenceEncoder`] writes one zero-padded PNG per frame (`png`
//!   feature).
//! - [`FfmpegEncoder`] pipes raw RGBA frames into a system `ffmpeg` process
//!   and produces an H.264 MP4.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use sketchbook_core::{Artifact, ArtifactKind, EngineError, Frame, FrameEncoder};

/// Digits in sequence file names, e.g. `0000042.png`.
pub const SEQUENCE_DIGITS: usize = 7;

/// File name for frame `index` of a sequence.
pub fn sequence_file_name(index: u64) -> String {
    format!("{index:0width$}.png", width = SEQUENCE_DIGITS)
}

fn ensure_dir(dir: &Path) -> Result<(), EngineError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| EngineError::Io(format!("failed to create '{}': {e}", dir.display())))
}

#[cfg(feature = "png")]
pub use png_sequence::PngSequenceEncoder;

#[cfg(feature = "png")]
mod png_sequence {
    use super::*;
    use crate::snapshot::write_png;

    /// Writes each frame as `<dir>/<index>.png`.
    #[derive(Debug)]
    pub struct PngSequenceEncoder {
        dir: PathBuf,
        written: u64,
    }

    impl PngSequenceEncoder {
        /// Creates `dir` if needed.
        pub fn new(dir: impl Into<PathBuf>) -> Result<Self, EngineError> {
            let dir = dir.into();
            ensure_dir(&dir)?;
            Ok(Self { dir, written: 0 })
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }
    }

    impl FrameEncoder for PngSequenceEncoder {
        fn encode(&mut self, index: u64, frame: &Frame) -> Result<(), EngineError> {
            write_png(frame, &self.dir.join(sequence_file_name(index)))?;
            self.written += 1;
            Ok(())
        }

        fn finish(&mut self) -> Result<Artifact, EngineError> {
            let frames = std::mem::take(&mut self.written);
            Ok(Artifact {
                kind: ArtifactKind::ImageSequence,
                path: Some(self.dir.clone()),
                frames,
            })
        }
    }
}

/// Whether an `ffmpeg` binary can be run.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Output settings for [`FfmpegEncoder`].
#[derive(Debug, Clone)]
pub struct VideoConfig {
    pub width: usize,
    pub height: usize,
    pub fps: f64,
    pub out_path: PathBuf,
    /// Color non-opaque pixels are composited onto.
    pub background: [u8; 3],
}

impl VideoConfig {
    pub fn new(out_path: impl Into<PathBuf>, width: usize, height: usize, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            out_path: out_path.into(),
            background: [0, 0, 0],
        }
    }

    /// yuv420p output needs even dimensions.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(EngineError::InvalidConfig(format!(
                "video dimensions must be even, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "video fps must be positive, got {}",
                self.fps
            )));
        }
        Ok(())
    }
}

/// Streams frames to `ffmpeg` over stdin.
pub struct FfmpegEncoder {
    cfg: VideoConfig,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
    written: u64,
}

impl std::fmt::Debug for FfmpegEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegEncoder")
            .field("cfg", &self.cfg)
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}

impl FfmpegEncoder {
    /// Spawns `ffmpeg`, overwriting `cfg.out_path`.
    pub fn new(cfg: VideoConfig) -> Result<Self, EngineError> {
        cfg.validate()?;
        if let Some(parent) = cfg.out_path.parent() {
            ensure_dir(parent)?;
        }
        if !is_ffmpeg_on_path() {
            return Err(EngineError::Encode(
                "ffmpeg is required for video output but was not found on PATH".into(),
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args([
                "-y",
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
                &format!("{}x{}", cfg.width, cfg.height),
                "-r",
                &cfg.fps.to_string(),
                "-i",
                "pipe:0",
                "-an",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ])
            .arg(&cfg.out_path);

        let mut child = cmd
            .spawn()
            .map_err(|e| EngineError::Encode(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Encode("failed to open ffmpeg stdin".into()))?;
        tracing::info!(path = %cfg.out_path.display(), "ffmpeg started");

        Ok(Self {
            scratch: vec![0; cfg.width * cfg.height * 4],
            cfg,
            child: Some(child),
            stdin: Some(stdin),
            written: 0,
        })
    }
}

impl FrameEncoder for FfmpegEncoder {
    fn encode(&mut self, _index: u64, frame: &Frame) -> Result<(), EngineError> {
        if frame.width() != self.cfg.width || frame.height() != self.cfg.height {
            return Err(EngineError::SizeMismatch {
                lhs_w: self.cfg.width,
                lhs_h: self.cfg.height,
                rhs_w: frame.width(),
                rhs_h: frame.height(),
            });
        }
        flatten_onto(&mut self.scratch, frame.data(), self.cfg.background);
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| EngineError::Encode("ffmpeg encoder already finished".into()))?;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| EngineError::Encode(format!("failed to write frame to ffmpeg: {e}")))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<Artifact, EngineError> {
        drop(self.stdin.take());
        let child = self
            .child
            .take()
            .ok_or_else(|| EngineError::Encode("ffmpeg encoder already finished".into()))?;
        let output = child
            .wait_with_output()
            .map_err(|e| EngineError::Encode(format!("failed to wait for ffmpeg: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Encode(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(Artifact {
            kind: ArtifactKind::Video,
            path: Some(self.cfg.out_path.clone()),
            frames: self.written,
        })
    }
}

impl Drop for FfmpegEncoder {
    /// Reaps an ffmpeg child that never reached `finish`.
    fn drop(&mut self) {
        drop(self.stdin.take());
        let Some(child) = self.child.take() else {
            return;
        };
        match child.wait_with_output() {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                tracing::warn!(
                    status = %output.status,
                    stderr = stderr.trim(),
                    "unfinished ffmpeg encode exited with an error"
                );
            }
            Err(e) => tracing::warn!(error = %e, "failed to reap ffmpeg"),
        }
    }
}

/// Composites straight-alpha RGBA `src` onto an opaque `background`.
fn flatten_onto(dst: &mut [u8], src: &[u8], background: [u8; 3]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        for c in 0..3 {
            let fg = u16::from(s[c]) * a;
            let bg = u16::from(background[c]) * (255 - a);
            d[c] = ((fg + bg + 127) / 255) as u8;
        }
        d[3] = 255;
    }
}

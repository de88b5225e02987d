//! Error types for the sketchbook core.

use thiserror::Error;

/// Errors produced by the PRNG, noise fields, scheduler and recorder.
///
/// All of these are local conditions the caller can recover from. The
/// scheduler pauses on a sketch error rather than propagating a panic.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `pick`/`shuffle`-style operation on an empty collection, or a
    /// degenerate range such as `min > max`.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A PRNG state resolved to the forbidden all-zero fixed point.
    ///
    /// Seeding remaps this state instead of returning the error; the variant
    /// exists so callers inspecting raw state words can report it.
    #[error("invalid seed state: all-zero xorshift state")]
    InvalidSeedState,

    /// A recorder or scheduler operation was called from a state that does
    /// not permit it.
    #[error("invalid state: cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// Noise sampled with an unsupported number of coordinates.
    #[error("dimension mismatch: expected {expected} coordinates, got {got}")]
    DimensionMismatch { expected: &'static str, got: usize },

    /// Fractal detail settings outside the accepted domain.
    #[error("invalid detail: octaves must be >= 1 and falloff in (0, 1], got octaves={octaves}, falloff={falloff}")]
    InvalidDetail { octaves: u32, falloff: f64 },

    /// Width or height was zero, or their product overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// Two frames had incompatible sizes for a pixel-wise operation.
    #[error("size mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    SizeMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A configuration field was out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// `restore()` was called on a surface with no saved state.
    #[error("unbalanced restore: no saved surface state")]
    UnbalancedRestore,

    /// A sketch name was not found in the registry.
    #[error("unknown sketch: {0}")]
    UnknownSketch(String),

    /// Filesystem failure while writing an artifact.
    #[error("I/O error: {0}")]
    Io(String),

    /// The frame encoder failed.
    #[error("encode error: {0}")]
    Encode(String),
}

impl EngineError {
    pub(crate) fn invalid_state(operation: &'static str, state: impl ToString) -> Self {
        EngineError::InvalidState {
            operation,
            state: state.to_string(),
        }
    }
}

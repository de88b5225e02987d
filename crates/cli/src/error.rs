//! CLI errors and their exit codes.
//!
//! - 0:  success
//! - 2:  clap arg parse error (before our code runs)
//! - 10: sketch error (unknown sketch, draw failure, recorder misuse)
//! - 11: I/O error (PNG write, output directory, config file)
//! - 12: input error (bad seed, bad JSON params, bad config)
//! - 13: serialization error
//! - 14: encoder error (ffmpeg missing or failed)

use sketchbook_core::EngineError;
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    Engine(EngineError),
    Io(String),
    Input(String),
    Serialization(String),
    Encode(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
            CliError::Encode(_) => 14,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Engine(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                write!(f, "{msg}")
            }
            CliError::Encode(msg) => write!(f, "encoder failed: {msg}"),
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            EngineError::Encode(msg) => CliError::Encode(msg),
            EngineError::InvalidConfig(msg) => CliError::Input(msg),
            other => CliError::Engine(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

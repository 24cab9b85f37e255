//! Media inspection with ffprobe.
//!
//! Provides the per-input facts a comparison needs: container duration,
//! video frame rate and size, and whether any audio stream exists.

mod ffprobe;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use ffprobe::{parse_probe_json, probe_resolution, probe_video};

/// Errors from probing a media file.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    #[error("Failed to parse probe output for {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{path} has no {what}")]
    Missing { path: PathBuf, what: &'static str },
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

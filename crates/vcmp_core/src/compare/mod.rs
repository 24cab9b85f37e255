//! Side-by-side comparison videos.
//!
//! A comparison is built from two to five source videos:
//!
//! 1. every input is probed for duration, frame rate, size and audio
//! 2. a [`ComparisonPlan`] derives per-input speed factors (each duration
//!    over the shortest), the common frame rate (the fastest input's), and
//!    the ffmpeg filter graph that pads, labels and stacks the inputs
//! 3. ffmpeg renders `comparison.mp4` into a fresh folder under `output/`
//! 4. the sources are moved into that folder next to the result
//!
//! After watching, a [`Review`] records the best video and free-text notes
//! in a sidecar file, or the whole folder is discarded with
//! [`delete_comparison`].

mod comparer;
mod filter;
mod plan;
mod review;
mod tools;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::probe::ProbeError;
use crate::workspace::WorkspaceError;

pub use comparer::{Comparer, Comparison, COMPARISON_FILE};
pub use filter::escape_drawtext;
pub use plan::{validate_selection_count, ComparisonPlan, EncodeOptions, PlanInput, LABEL_BAND};
pub use review::{candidate_label, delete_comparison, Review, ReviewOutcome, BEST_PREFIX, NOTES_FILE};
pub use tools::{FfmpegTools, MediaTools};

/// Errors from building or reviewing a comparison.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Select 2 to 5 videos for a comparison (got {count})")]
    InvalidSelection { count: usize },

    #[error("Got {labels} overlay labels for {inputs} videos")]
    LabelCountMismatch { inputs: usize, labels: usize },

    #[error("Source video not found: {0}")]
    SourceMissing(PathBuf),

    #[error("{0} is selected more than once")]
    DuplicateSource(PathBuf),

    #[error("More than one selected video is named {0}")]
    NameClash(String),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("ffmpeg failed with exit code {}{}", format_exit(.exit_code), format_tail(.tail))]
    TranscodeFailed {
        exit_code: Option<i32>,
        tail: Vec<String>,
    },

    #[error("I/O error while {operation} '{path}': {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No best video selected")]
    NoBestVideo,

    #[error("Not a comparison folder: {0}")]
    NotAComparison(PathBuf),

    #[error("Malformed notes file {path}: {message}")]
    MalformedNotes { path: PathBuf, message: String },
}

fn format_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

fn format_tail(tail: &[String]) -> String {
    match tail.last() {
        Some(last) => format!(": {}", last),
        None => String::new(),
    }
}

/// Result type for comparison operations.
pub type CompareResult<T> = Result<T, CompareError>;

//! Grading sessions: sort videos into label folders one at a time.
//!
//! A session owns a fresh `output/Graded - <date - time>/` folder. Each
//! graded video moves into `<graded>/<label>/`. Cancelling sweeps every file
//! under the graded folder back into `input/` and removes the folder.

mod session;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::workspace::WorkspaceError;

pub use session::{CancelSummary, GradedMove, GradingSession, GradingSummary};

/// Errors from a grading session.
#[derive(Error, Debug)]
pub enum GradingError {
    #[error("No videos selected for grading")]
    EmptySelection,

    #[error("All videos have been graded")]
    Finished,

    #[error("Video to grade is missing: {0}")]
    VideoMissing(PathBuf),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error("Cancel incomplete: {} file(s) restored, {} still in the graded folder", .restored, .failed.len())]
    CancelIncomplete { restored: usize, failed: Vec<PathBuf> },

    #[error("I/O error while {operation} '{path}': {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for grading operations.
pub type GradingResult<T> = Result<T, GradingError>;

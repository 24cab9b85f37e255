//! Working directory layout, the input video library, and file moves.
//!
//! Everything the tool touches lives under two folders: `input/` holding
//! source videos and `output/` holding comparison folders and graded
//! sessions. Files only ever move between these locations.

mod fsops;
mod library;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::Settings;

pub(crate) use fsops::rename_file;
pub use fsops::{move_file, remove_tree, unique_dir};
pub use library::{
    is_supported_video, LibraryEntry, VideoLibrary, MAX_COMPARE, MIN_COMPARE, SUPPORTED_EXTENSIONS,
};

/// Errors from workspace and file operations.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("Not a file: {0}")]
    NotAFile(PathBuf),

    #[error("I/O error while {operation} '{path}': {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WorkspaceError {
    pub(crate) fn io(operation: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for workspace operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// Input and output folder locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl Workspace {
    /// Workspace with the default `input/` and `output/` folders under `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            input_dir: root.join("input"),
            output_dir: root.join("output"),
        }
    }

    /// Workspace using the folders named in settings, relative to `root`
    /// unless they are absolute.
    pub fn from_settings(root: impl AsRef<Path>, settings: &Settings) -> Self {
        let root = root.as_ref();
        Self {
            input_dir: root.join(&settings.paths.input_folder),
            output_dir: root.join(&settings.paths.output_folder),
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the input and output folders if missing.
    pub fn ensure_dirs(&self) -> WorkspaceResult<()> {
        for dir in [&self.input_dir, &self.output_dir] {
            fs::create_dir_all(dir).map_err(|e| WorkspaceError::io("creating", dir, e))?;
        }
        Ok(())
    }

    /// Scan the input folder into a fresh library with nothing selected.
    pub fn scan_library(&self) -> WorkspaceResult<VideoLibrary> {
        VideoLibrary::scan(&self.input_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ensure_dirs_creates_layout() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        workspace.ensure_dirs().unwrap();

        assert!(dir.path().join("input").is_dir());
        assert!(dir.path().join("output").is_dir());
    }

    #[test]
    fn from_settings_uses_configured_names() {
        let dir = tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.input_folder = "clips".to_string();

        let workspace = Workspace::from_settings(dir.path(), &settings);
        assert_eq!(workspace.input_dir(), dir.path().join("clips"));
        assert_eq!(workspace.output_dir(), dir.path().join("output"));
    }
}

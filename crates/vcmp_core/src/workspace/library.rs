//! The list of source videos in the input folder and their selection state.

use std::fs;
use std::path::{Path, PathBuf};

use super::{WorkspaceError, WorkspaceResult};

/// File extensions recognized as source videos (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mkv", "mov"];

/// Smallest selection a comparison can be built from.
pub const MIN_COMPARE: usize = 2;
/// Largest selection a comparison can be built from.
pub const MAX_COMPARE: usize = 5;

/// Check whether a path has a supported video extension.
pub fn is_supported_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// A listed video and whether it is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub path: PathBuf,
    pub checked: bool,
}

impl LibraryEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Videos found in the input folder, with per-video checked state.
#[derive(Debug, Clone, Default)]
pub struct VideoLibrary {
    entries: Vec<LibraryEntry>,
}

impl VideoLibrary {
    /// List supported videos in `input_dir`, sorted by file name, all unchecked.
    pub fn scan(input_dir: &Path) -> WorkspaceResult<Self> {
        let read = fs::read_dir(input_dir).map_err(|e| WorkspaceError::io("reading", input_dir, e))?;

        let mut paths = Vec::new();
        for entry in read {
            let entry = entry.map_err(|e| WorkspaceError::io("reading", input_dir, e))?;
            let path = entry.path();
            if path.is_file() && is_supported_video(&path) {
                paths.push(path);
            }
        }
        paths.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));

        tracing::debug!("Found {} videos in {}", paths.len(), input_dir.display());
        Ok(Self::from_paths(paths))
    }

    /// Build a library from known paths, all unchecked.
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            entries: paths
                .into_iter()
                .map(|path| LibraryEntry { path, checked: false })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    /// Set the checked state of the entry at `index`. Returns false when out of range.
    pub fn set_checked(&mut self, index: usize, checked: bool) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.checked = checked;
                true
            }
            None => false,
        }
    }

    /// Check the entry whose path matches. Returns false when not listed.
    pub fn check_path(&mut self, path: &Path) -> bool {
        match self.entries.iter_mut().find(|e| e.path == path) {
            Some(entry) => {
                entry.checked = true;
                true
            }
            None => false,
        }
    }

    /// Flip the checked state at `index`.
    pub fn toggle(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.checked = !entry.checked;
                true
            }
            None => false,
        }
    }

    pub fn check_all(&mut self) {
        for entry in &mut self.entries {
            entry.checked = true;
        }
    }

    pub fn clear_selection(&mut self) {
        for entry in &mut self.entries {
            entry.checked = false;
        }
    }

    /// Checked videos, in list order.
    pub fn selected(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|e| e.checked)
            .map(|e| e.path.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.entries.iter().filter(|e| e.checked).count()
    }

    /// A comparison needs between two and five checked videos.
    pub fn can_compare(&self) -> bool {
        (MIN_COMPARE..=MAX_COMPARE).contains(&self.selected_count())
    }

    /// Grading needs at least one checked video.
    pub fn can_grade(&self) -> bool {
        self.selected_count() > 0
    }
}

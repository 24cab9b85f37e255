//! Recording the outcome of watching a comparison.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{CompareError, CompareResult};
use crate::workspace::{remove_tree, rename_file};

/// Sidecar file written into a comparison folder.
pub const NOTES_FILE: &str = "comparison_notes.txt";

/// Prefix given to the chosen video's file name.
pub const BEST_PREFIX: &str = "best-";

const BEST_HEADER: &str = "Best Video: ";
const NOTES_HEADER: &str = "Notes:";

/// The reviewer's verdict on a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// File name of the best video inside the comparison folder.
    pub best_video: String,
    pub notes: String,
}

/// What [`Review::save`] did on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub notes_file: PathBuf,
    /// New path of the best video, or `None` when only notes were saved.
    pub renamed_to: Option<PathBuf>,
}

impl Review {
    /// `best_video` may be a bare file name or a path; only its file name is kept.
    pub fn new(best_video: impl AsRef<str>, notes: impl Into<String>) -> Self {
        let raw = best_video.as_ref().trim();
        let best_video = Path::new(raw)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| raw.to_string());
        Self {
            best_video,
            notes: notes.into(),
        }
    }

    /// Write the notes file and rename the best video to `best-<name>`.
    ///
    /// A missing best video is not an error: the notes are still written and
    /// `renamed_to` is `None`.
    pub fn save(&self, comparison_dir: &Path) -> CompareResult<ReviewOutcome> {
        if self.best_video.is_empty() {
            return Err(CompareError::NoBestVideo);
        }
        if !comparison_dir.is_dir() {
            return Err(CompareError::NotAComparison(comparison_dir.to_path_buf()));
        }

        let notes_file = comparison_dir.join(NOTES_FILE);
        let content = format!(
            "{}{}\n{}\n{}",
            BEST_HEADER,
            self.best_video,
            NOTES_HEADER,
            self.notes.trim()
        );
        fs::write(&notes_file, content).map_err(|e| CompareError::Io {
            operation: "writing",
            path: notes_file.clone(),
            source: e,
        })?;
        tracing::info!("Notes saved to {}", notes_file.display());

        let current = comparison_dir.join(&self.best_video);
        let renamed = comparison_dir.join(format!("{}{}", BEST_PREFIX, self.best_video));

        let renamed_to = if !current.is_file() {
            tracing::warn!(
                "{} not found in {}, only notes were saved",
                self.best_video,
                comparison_dir.display()
            );
            None
        } else if renamed.exists() {
            tracing::warn!("{} already exists, leaving {} as is", renamed.display(), self.best_video);
            None
        } else {
            rename_file(&current, &renamed)?;
            tracing::info!("Best video renamed to {}", renamed.display());
            Some(renamed)
        };

        Ok(ReviewOutcome {
            notes_file,
            renamed_to,
        })
    }

    /// Read the notes file of a reviewed comparison.
    pub fn load(comparison_dir: &Path) -> CompareResult<Self> {
        let path = comparison_dir.join(NOTES_FILE);
        let content = fs::read_to_string(&path).map_err(|e| CompareError::Io {
            operation: "reading",
            path: path.clone(),
            source: e,
        })?;
        parse_notes(&content).map_err(|message| CompareError::MalformedNotes { path, message })
    }

    /// Whether a notes file exists in `comparison_dir`.
    pub fn exists(comparison_dir: &Path) -> bool {
        comparison_dir.join(NOTES_FILE).is_file()
    }
}

fn parse_notes(content: &str) -> Result<Review, String> {
    let mut lines = content.splitn(3, '\n');

    let best = lines
        .next()
        .and_then(|l| l.trim_end_matches('\r').strip_prefix(BEST_HEADER))
        .ok_or_else(|| format!("first line must start with '{}'", BEST_HEADER))?;

    match lines.next().map(|l| l.trim_end_matches('\r')) {
        Some(NOTES_HEADER) => {}
        _ => return Err(format!("second line must be '{}'", NOTES_HEADER)),
    }

    Ok(Review {
        best_video: best.trim().to_string(),
        notes: lines.next().unwrap_or("").trim().to_string(),
    })
}

/// Delete a comparison folder with its render, sources and notes.
pub fn delete_comparison(comparison_dir: &Path) -> CompareResult<()> {
    match fs::metadata(comparison_dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(CompareError::NotAComparison(comparison_dir.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CompareError::NotAComparison(comparison_dir.to_path_buf()))
        }
        Err(e) => {
            return Err(CompareError::Io {
                operation: "inspecting",
                path: comparison_dir.to_path_buf(),
                source: e,
            })
        }
    }

    remove_tree(comparison_dir)?;
    tracing::info!("Deleted comparison {}", comparison_dir.display());
    Ok(())
}

/// Text for one entry of the best-video chooser.
pub fn candidate_label(index: usize, label: Option<&str>, file_name: &str) -> String {
    match label.map(str::trim).filter(|l| !l.is_empty()) {
        Some(label) => format!("# {} | {} | {}", index, label, file_name),
        None => format!("# {} | {}", index, file_name),
    }
}

//! The grading session state machine.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use super::{GradingError, GradingResult};
use crate::models::GradeLabel;
use crate::workspace::{move_file, remove_tree, rename_file, unique_dir, Workspace};

/// A file moved by [`GradingSession::grade`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedMove {
    pub from: PathBuf,
    pub to: PathBuf,
    pub label: GradeLabel,
}

/// Result of a completed session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradingSummary {
    pub graded_dir: PathBuf,
    /// Videos per label folder.
    pub counts: BTreeMap<GradeLabel, usize>,
    pub skipped: usize,
}

impl GradingSummary {
    pub fn graded(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Result of a cancelled session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelSummary {
    /// Paths in the input folder the files were restored to.
    pub restored: Vec<PathBuf>,
}

/// Walks a list of videos, moving each one into a label folder.
#[derive(Debug)]
pub struct GradingSession {
    input_dir: PathBuf,
    graded_dir: PathBuf,
    videos: Vec<PathBuf>,
    index: usize,
    moves: Vec<GradedMove>,
    skipped: usize,
}

impl GradingSession {
    /// Create the graded folder and start at the first video.
    pub fn start(workspace: &Workspace, videos: Vec<PathBuf>) -> GradingResult<Self> {
        if videos.is_empty() {
            return Err(GradingError::EmptySelection);
        }

        let name = format!("Graded - {}", Local::now().format("%Y-%m-%d - %I-%M %p"));
        let graded_dir = unique_dir(&workspace.output_dir().join(name));
        fs::create_dir_all(&graded_dir).map_err(|e| GradingError::Io {
            operation: "creating",
            path: graded_dir.clone(),
            source: e,
        })?;

        tracing::info!(
            "Grading {} video(s) into {}",
            videos.len(),
            graded_dir.display()
        );

        Ok(Self {
            input_dir: workspace.input_dir().to_path_buf(),
            graded_dir,
            videos,
            index: 0,
            moves: Vec::new(),
            skipped: 0,
        })
    }

    pub fn graded_dir(&self) -> &Path {
        &self.graded_dir
    }

    /// The video awaiting a grade, or `None` once every video was handled.
    pub fn current(&self) -> Option<&Path> {
        self.videos.get(self.index).map(PathBuf::as_path)
    }

    /// Zero-based index of the current video and the total count.
    pub fn position(&self) -> (usize, usize) {
        (self.index, self.videos.len())
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.videos.len()
    }

    /// Move the current video into `<graded>/<label>/` and advance.
    ///
    /// If the move fails the session stays on the same video.
    pub fn grade(&mut self, label: GradeLabel) -> GradingResult<&GradedMove> {
        let video = self.current().ok_or(GradingError::Finished)?.to_path_buf();
        if !video.is_file() {
            return Err(GradingError::VideoMissing(video));
        }

        let label_dir = self.graded_dir.join(label.folder_name());
        let to = move_file(&video, &label_dir)?;
        tracing::info!("Graded {} as {}", video.display(), label);

        self.index += 1;
        self.moves.push(GradedMove {
            from: video,
            to,
            label,
        });
        Ok(&self.moves[self.moves.len() - 1])
    }

    /// Advance without moving the current video.
    pub fn skip(&mut self) -> GradingResult<()> {
        let video = self.current().ok_or(GradingError::Finished)?;
        tracing::debug!("Skipped {}", video.display());
        self.index += 1;
        self.skipped += 1;
        Ok(())
    }

    /// End the session, keeping every graded file where it is.
    pub fn finish(self) -> GradingSummary {
        let mut counts = BTreeMap::new();
        for m in &self.moves {
            *counts.entry(m.label.clone()).or_insert(0) += 1;
        }
        tracing::info!(
            "Grading finished: {} graded, {} skipped",
            self.moves.len(),
            self.skipped
        );
        GradingSummary {
            graded_dir: self.graded_dir,
            counts,
            skipped: self.skipped,
        }
    }

    /// Move every file under the graded folder back to the input folder and
    /// delete the graded folder.
    ///
    /// A name already taken in the input folder gets a ` (n)` suffix. Files
    /// that cannot be restored stay in the graded folder, which is then kept,
    /// and the cancel can be retried.
    pub fn cancel(&mut self) -> GradingResult<CancelSummary> {
        let mut files = Vec::new();
        collect_files(&self.graded_dir, &mut files)?;

        let mut restored = Vec::with_capacity(files.len());
        let mut failed = Vec::new();
        for file in files {
            let dest = free_name(&self.input_dir, &file);
            match rename_file(&file, &dest) {
                Ok(()) => restored.push(dest),
                Err(e) => {
                    tracing::warn!("Could not restore {}: {}", file.display(), e);
                    failed.push(file);
                }
            }
        }

        if !failed.is_empty() {
            return Err(GradingError::CancelIncomplete {
                restored: restored.len(),
                failed,
            });
        }

        remove_tree(&self.graded_dir)?;
        self.moves.clear();
        self.index = self.videos.len();
        tracing::info!(
            "Grading cancelled, restored {} file(s) to {}",
            restored.len(),
            self.input_dir.display()
        );
        Ok(CancelSummary { restored })
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> GradingResult<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(GradingError::Io {
                operation: "reading",
                path: dir.to_path_buf(),
                source: e,
            })
        }
    };

    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();
    for path in paths {
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// `dir/<name>`, or `dir/<stem> (n).<ext>` when that is taken.
fn free_name(dir: &Path, file: &Path) -> PathBuf {
    let name = file.file_name().map(|n| n.to_owned()).unwrap_or_default();
    let first = dir.join(&name);
    if !first.exists() {
        return first;
    }

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = file
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (2..)
        .map(|n| dir.join(format!("{} ({}){}", stem, n, ext)))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn setup(names: &[&str]) -> (TempDir, Workspace, Vec<PathBuf>) {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        workspace.ensure_dirs().unwrap();
        let paths = names
            .iter()
            .map(|n| {
                let p = workspace.input_dir().join(n);
                fs::write(&p, n.as_bytes()).unwrap();
                p
            })
            .collect();
        (dir, workspace, paths)
    }

    #[test]
    fn empty_selection_is_rejected() {
        let (_dir, workspace, _) = setup(&[]);
        let err = GradingSession::start(&workspace, Vec::new()).unwrap_err();
        assert!(matches!(err, GradingError::EmptySelection));
        assert_eq!(fs::read_dir(workspace.output_dir()).unwrap().count(), 0);
    }

    #[test]
    fn graded_file_leaves_input_set() {
        let (_dir, workspace, paths) = setup(&["a.mp4", "b.mp4"]);
        let mut session = GradingSession::start(&workspace, paths.clone()).unwrap();
        assert!(session
            .graded_dir()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("Graded - "));

        let moved = session.grade(GradeLabel::Good).unwrap().to.clone();
        assert_eq!(moved, session.graded_dir().join("Good").join("a.mp4"));
        assert!(moved.exists());
        assert_eq!(session.position(), (1, 2));

        let library = workspace.scan_library().unwrap();
        assert!(!library.contains(&paths[0]));
        assert!(library.contains(&paths[1]));
    }

    #[test]
    fn failed_move_keeps_position() {
        let (_dir, workspace, paths) = setup(&["a.mp4", "b.mp4"]);
        let mut session = GradingSession::start(&workspace, paths.clone()).unwrap();
        fs::remove_file(&paths[0]).unwrap();

        let err = session.grade(GradeLabel::Bad).unwrap_err();
        assert!(matches!(err, GradingError::VideoMissing(_)));
        assert_eq!(session.current(), Some(paths[0].as_path()));
    }

    #[test]
    fn skip_and_finish_summarise() {
        let (_dir, workspace, paths) = setup(&["a.mp4", "b.mp4", "c.mp4"]);
        let mut session = GradingSession::start(&workspace, paths).unwrap();

        session.grade(GradeLabel::Bad).unwrap();
        session.skip().unwrap();
        session
            .grade(GradeLabel::Custom("Needs work".to_string()))
            .unwrap();
        assert!(session.is_complete());
        assert!(matches!(session.skip(), Err(GradingError::Finished)));

        let summary = session.finish();
        assert_eq!(summary.graded(), 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.counts.get(&GradeLabel::Bad), Some(&1));
        assert!(summary.graded_dir.join("Needs work").join("c.mp4").exists());
    }

    #[test]
    fn cancel_restores_everything() {
        let (_dir, workspace, paths) = setup(&["a.mp4", "b.mp4", "c.mp4"]);
        let mut session = GradingSession::start(&workspace, paths.clone()).unwrap();
        session.grade(GradeLabel::Good).unwrap();
        session.grade(GradeLabel::Average).unwrap();
        let graded_dir = session.graded_dir().to_path_buf();

        let summary = session.cancel().unwrap();
        assert!(session.is_complete());
        assert_eq!(summary.restored.len(), 2);
        assert!(paths.iter().all(|p| p.exists()));
        assert!(!graded_dir.exists());
        assert_eq!(fs::read_dir(workspace.output_dir()).unwrap().count(), 0);
    }

    #[test]
    fn cancel_avoids_name_clash() {
        let (_dir, workspace, paths) = setup(&["a.mp4"]);
        let mut session = GradingSession::start(&workspace, paths.clone()).unwrap();
        session.grade(GradeLabel::Good).unwrap();
        fs::write(&paths[0], b"new file with same name").unwrap();

        let summary = session.cancel().unwrap();
        assert_eq!(summary.restored, vec![workspace.input_dir().join("a (2).mp4")]);
    }

    #[test]
    fn failed_cancel_keeps_files_and_can_be_retried() {
        let (_dir, workspace, paths) = setup(&["a.mp4", "b.mp4"]);
        let mut session = GradingSession::start(&workspace, paths.clone()).unwrap();
        session.grade(GradeLabel::Good).unwrap();
        session.grade(GradeLabel::Bad).unwrap();

        // A plain file where the input folder should be blocks every restore
        fs::remove_dir(workspace.input_dir()).unwrap();
        fs::write(workspace.input_dir(), b"").unwrap();

        match session.cancel().unwrap_err() {
            GradingError::CancelIncomplete { restored, failed } => {
                assert_eq!(restored, 0);
                assert_eq!(failed.len(), 2);
                assert!(failed.iter().all(|f| f.starts_with(session.graded_dir())));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(session.graded_dir().join("Good").join("a.mp4").exists());

        fs::remove_file(workspace.input_dir()).unwrap();
        fs::create_dir(workspace.input_dir()).unwrap();
        let summary = session.cancel().unwrap();
        assert_eq!(summary.restored.len(), 2);
        assert!(paths.iter().all(|p| p.exists()));
        assert!(!session.graded_dir().exists());
    }

    #[test]
    fn sessions_started_together_get_distinct_folders() {
        let (_dir, workspace, paths) = setup(&["a.mp4", "b.mp4"]);
        let first = GradingSession::start(&workspace, vec![paths[0].clone()]).unwrap();
        let second = GradingSession::start(&workspace, vec![paths[1].clone()]).unwrap();
        assert_ne!(first.graded_dir(), second.graded_dir());
    }
}

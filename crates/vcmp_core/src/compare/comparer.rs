//! Building a comparison end to end.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;

use super::plan::{validate_selection_count, ComparisonPlan, EncodeOptions};
use super::review::candidate_label;
use super::tools::MediaTools;
use super::{CompareError, CompareResult};
use crate::logging::{LineCallback, RunLogConfig, RunLogger};
use crate::models::FrameRate;
use crate::workspace::{move_file, remove_tree, rename_file, unique_dir, Workspace};

/// File name of the rendered comparison inside its folder.
pub const COMPARISON_FILE: &str = "comparison.mp4";

/// A finished comparison folder.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// `output/<timestamp>_<first stem>/`
    pub dir: PathBuf,
    /// The rendered side-by-side video.
    pub output_file: PathBuf,
    /// Source videos, now inside `dir`, in selection order.
    pub sources: Vec<PathBuf>,
    /// Overlay label per source.
    pub labels: Vec<Option<String>>,
    pub speed_factors: Vec<f64>,
    pub target_fps: FrameRate,
    /// Log of the ffmpeg run, if kept.
    pub log_file: Option<PathBuf>,
}

impl Comparison {
    /// Display lines for picking the best video, numbered from 1.
    pub fn candidates(&self) -> Vec<String> {
        self.sources
            .iter()
            .zip(&self.labels)
            .enumerate()
            .map(|(i, (path, label))| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                candidate_label(i + 1, label.as_deref(), &name)
            })
            .collect()
    }
}

/// Builds comparisons from selected source videos.
pub struct Comparer<T: MediaTools> {
    tools: T,
    workspace: Workspace,
    options: EncodeOptions,
    logs_dir: PathBuf,
    log_config: RunLogConfig,
    keep_run_logs: bool,
    line_callback: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl<T: MediaTools> Comparer<T> {
    pub fn new(tools: T, workspace: Workspace, options: EncodeOptions, logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            tools,
            workspace,
            options,
            logs_dir: logs_dir.into(),
            log_config: RunLogConfig::default(),
            keep_run_logs: true,
            line_callback: None,
        }
    }

    pub fn with_log_config(mut self, config: RunLogConfig) -> Self {
        self.log_config = config;
        self
    }

    /// Delete the run log after a successful render.
    pub fn keep_run_logs(mut self, keep: bool) -> Self {
        self.keep_run_logs = keep;
        self
    }

    /// Receive every run log line as it is written.
    pub fn with_line_callback(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.line_callback = Some(Arc::new(callback));
        self
    }

    pub fn tools(&self) -> &T {
        &self.tools
    }

    /// Probe the selection and derive its plan without rendering anything.
    pub fn plan(&self, selection: &[PathBuf], labels: &[String]) -> CompareResult<ComparisonPlan> {
        validate_selection_count(selection.len())?;

        if !labels.is_empty() && labels.len() != selection.len() {
            return Err(CompareError::LabelCountMismatch {
                inputs: selection.len(),
                labels: labels.len(),
            });
        }

        if let Some(missing) = selection.iter().find(|p| !p.exists()) {
            return Err(CompareError::SourceMissing(missing.clone()));
        }
        check_distinct(selection)?;

        let infos = selection
            .iter()
            .map(|path| self.tools.probe(path))
            .collect::<Result<Vec<_>, _>>()?;

        ComparisonPlan::derive(infos, labels, self.options.clone())
    }

    /// Render a comparison of `selection` and move the sources next to it.
    ///
    /// The selection size is checked before any tool runs. On a failed
    /// render the new folder is removed and the sources stay where they were.
    pub fn build(&self, selection: &[PathBuf], labels: &[String]) -> CompareResult<Comparison> {
        let plan = self.plan(selection, labels)?;

        let dir = unique_dir(&self.workspace.output_dir().join(folder_name(&selection[0])));
        fs::create_dir_all(&dir).map_err(|e| CompareError::Io {
            operation: "creating",
            path: dir.clone(),
            source: e,
        })?;

        let run_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "comparison".to_string());
        let logger = RunLogger::new(&run_name, &self.logs_dir, self.log_config.clone(), self.run_callback())
            .map_err(|e| CompareError::Io {
                operation: "creating log in",
                path: self.logs_dir.clone(),
                source: e,
            })?;

        logger.phase("Plan");
        for (input, speed) in plan.inputs().iter().zip(plan.speed_factors()) {
            logger.info(&format!(
                "{}: {:.3}s @ {} fps, speed x{:.4}",
                input.info.file_name(),
                input.info.duration_secs,
                input.info.frame_rate,
                speed
            ));
        }
        logger.info(&format!("Target frame rate: {}", plan.target_fps()));

        logger.phase("Render");
        let output_file = dir.join(COMPARISON_FILE);
        let args = plan.ffmpeg_args(&output_file);

        if let Err(e) = self.tools.transcode(&args, &logger) {
            logger.error(&format!("Render failed: {}", e));
            if let Err(cleanup) = remove_tree(&dir) {
                tracing::warn!("Could not remove {}: {}", dir.display(), cleanup);
            }
            return Err(e);
        }

        logger.phase("Collect sources");
        let mut sources = Vec::with_capacity(selection.len());
        for path in selection {
            match move_file(path, &dir) {
                Ok(moved) => {
                    logger.info(&format!("Moved {}", moved.display()));
                    sources.push(moved);
                }
                Err(e) => {
                    logger.error(&format!("Could not move {}: {}", path.display(), e));
                    restore_sources(&sources, selection, &dir, &logger);
                    return Err(e.into());
                }
            }
        }

        logger.success(&format!("Comparison written to {}", output_file.display()));
        tracing::info!("Comparison ready: {}", output_file.display());

        let log_file = if self.keep_run_logs {
            logger.flush();
            Some(logger.log_path().to_path_buf())
        } else {
            logger.close();
            if let Err(e) = fs::remove_file(logger.log_path()) {
                tracing::warn!("Could not remove {}: {}", logger.log_path().display(), e);
            }
            None
        };

        Ok(Comparison {
            dir,
            output_file,
            sources,
            labels: plan.labels(),
            speed_factors: plan.speed_factors(),
            target_fps: plan.target_fps(),
            log_file,
        })
    }

    fn run_callback(&self) -> Option<LineCallback> {
        self.line_callback.clone().map(|cb| {
            let boxed: LineCallback = Box::new(move |line: &str| cb(line));
            boxed
        })
    }
}

/// Every source must be a different file with a different name, since they
/// all end up in one folder.
fn check_distinct(selection: &[PathBuf]) -> CompareResult<()> {
    let mut files = HashSet::new();
    let mut names = HashSet::new();
    for path in selection {
        let canonical = fs::canonicalize(path).map_err(|e| CompareError::Io {
            operation: "resolving",
            path: path.clone(),
            source: e,
        })?;
        if !files.insert(canonical) {
            return Err(CompareError::DuplicateSource(path.clone()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !names.insert(name.clone()) {
            return Err(CompareError::NameClash(name));
        }
    }
    Ok(())
}

/// Put already moved sources back and drop the half-built folder.
fn restore_sources(moved: &[PathBuf], selection: &[PathBuf], dir: &Path, logger: &RunLogger) {
    for (current, original) in moved.iter().zip(selection) {
        if let Err(e) = rename_file(current, original) {
            logger.error(&format!("Could not restore {}: {}", original.display(), e));
            tracing::error!("Could not restore {}: {}", original.display(), e);
            return;
        }
    }
    if let Err(e) = remove_tree(dir) {
        tracing::warn!("Could not remove {}: {}", dir.display(), e);
    }
}

/// `<YYYYmmddHHMMSS>_<stem of first source>`
fn folder_name(first: &Path) -> String {
    let stem = first
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "comparison".to_string());
    format!("{}_{}", Local::now().format("%Y%m%d%H%M%S"), stem)
}

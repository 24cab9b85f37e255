//! Subcommand implementations.

pub mod compare;
pub mod config;
pub mod grade;
pub mod list;
pub mod play;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context as _, Result};

use vcmp_core::compare::{Comparer, EncodeOptions, FfmpegTools};
use vcmp_core::config::{ConfigManager, Settings};
use vcmp_core::logging::{LogLevel, RunLogConfig};
use vcmp_core::playback::{ExternalPlayer, PlaybackPosition, SharedPlayer};
use vcmp_core::workspace::{VideoLibrary, Workspace};

/// Everything a subcommand needs from startup.
pub struct Context {
    config: ConfigManager,
    workspace: Workspace,
    verbose: bool,
}

impl Context {
    pub fn new(config: ConfigManager, verbose: bool) -> Self {
        let workspace = Workspace::from_settings(".", config.settings());
        Self {
            config,
            workspace,
            verbose,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.config.settings()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Scan `input/`, creating the folders on first use.
    pub fn library(&self) -> Result<VideoLibrary> {
        self.workspace
            .ensure_dirs()
            .context("Failed to create workspace folders")?;
        self.workspace
            .scan_library()
            .context("Failed to scan input folder")
    }

    pub fn comparer(&self) -> Comparer<FfmpegTools> {
        let settings = self.settings();
        let log_config = if self.verbose {
            RunLogConfig::verbose()
        } else {
            RunLogConfig {
                level: settings.logging.level.min(LogLevel::Info),
                error_tail: settings.logging.error_tail,
                ..RunLogConfig::default()
            }
        };

        let comparer = Comparer::new(
            FfmpegTools::from_settings(&settings.tools),
            self.workspace.clone(),
            EncodeOptions::from_settings(settings),
            self.config.logs_folder(),
        )
        .with_log_config(log_config)
        .keep_run_logs(settings.logging.keep_run_logs);

        if self.verbose {
            comparer.with_line_callback(|line| eprintln!("{}", line))
        } else {
            comparer
        }
    }

    pub fn player(&self) -> SharedPlayer {
        SharedPlayer::new(ExternalPlayer::from_settings(self.settings()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.settings().player.poll_interval_ms.max(10))
    }
}

/// Turn command-line video arguments into paths.
///
/// Each argument is a 1-based number from `list`, a path, or a file name
/// inside the input folder.
pub fn resolve_videos(library: &VideoLibrary, input_dir: &Path, args: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(args.len());
    let mut seen = Vec::with_capacity(args.len());
    for arg in args {
        let path = if let Ok(n) = arg.parse::<usize>() {
            match n.checked_sub(1).and_then(|i| library.entries().get(i)) {
                Some(entry) => entry.path.clone(),
                None => bail!("No video number {} (input folder has {})", n, library.len()),
            }
        } else {
            let direct = PathBuf::from(arg);
            let in_input = input_dir.join(arg);
            if direct.is_file() {
                direct
            } else if in_input.is_file() {
                in_input
            } else {
                bail!("Video not found: {}", arg);
            }
        };

        let canonical = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if seen.contains(&canonical) {
            bail!("{} is listed twice", path.display());
        }
        seen.push(canonical);
        paths.push(path);
    }
    Ok(paths)
}

/// Print `message` and read one trimmed line from stdin. `None` on end of input.
pub fn prompt(message: &str) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// `mm:ss` or `h:mm:ss`.
pub fn format_time(time: Duration) -> String {
    let secs = time.as_secs();
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

/// One status line for a position sample.
pub fn format_position(sample: &PlaybackPosition) -> String {
    let length = sample
        .length
        .map(format_time)
        .unwrap_or_else(|| "--:--".to_string());
    format!("[{}] {} / {}", sample.state, format_time(sample.position), length)
}

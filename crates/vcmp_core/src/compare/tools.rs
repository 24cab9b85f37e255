//! External media tools behind a trait so comparisons can run without ffmpeg.

use std::ffi::OsString;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};

use super::{CompareError, CompareResult};
use crate::config::ToolSettings;
use crate::logging::RunLogger;
use crate::models::VideoInfo;
use crate::probe::{self, ProbeResult};

/// The two external operations a comparison needs.
pub trait MediaTools {
    /// Inspect one source video.
    fn probe(&self, path: &Path) -> ProbeResult<VideoInfo>;

    /// Run the transcoder with a prepared argument vector.
    ///
    /// Tool output lines are fed to `logger.output_line`.
    fn transcode(&self, args: &[OsString], logger: &RunLogger) -> CompareResult<()>;
}

/// Process-backed tools: `ffprobe` for inspection, `ffmpeg` for rendering.
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffmpeg: String,
    ffprobe: String,
}

impl FfmpegTools {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn from_settings(tools: &ToolSettings) -> Self {
        Self::new(&tools.ffmpeg, &tools.ffprobe)
    }

    pub fn ffprobe(&self) -> &str {
        &self.ffprobe
    }
}

impl Default for FfmpegTools {
    fn default() -> Self {
        Self::from_settings(&ToolSettings::default())
    }
}

impl MediaTools for FfmpegTools {
    fn probe(&self, path: &Path) -> ProbeResult<VideoInfo> {
        probe::probe_video(&self.ffprobe, path)
    }

    fn transcode(&self, args: &[OsString], logger: &RunLogger) -> CompareResult<()> {
        logger.command(&self.ffmpeg, args);

        let mut child = Command::new(&self.ffmpeg)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CompareError::Spawn {
                tool: self.ffmpeg.clone(),
                source: e,
            })?;

        if let Some(stderr) = child.stderr.take() {
            // ffmpeg rewrites its progress line with '\r'
            for chunk in BufReader::new(stderr).split(b'\n') {
                let Ok(chunk) = chunk else { break };
                for part in chunk.split(|b| *b == b'\r') {
                    let line = String::from_utf8_lossy(part);
                    let line = line.trim();
                    if !line.is_empty() {
                        logger.output_line(line);
                    }
                }
            }
        }

        let status = child.wait().map_err(|e| CompareError::Spawn {
            tool: self.ffmpeg.clone(),
            source: e,
        })?;

        if !status.success() {
            logger.error(&format!("{} exited with {}", self.ffmpeg, status));
            logger.show_tail("ffmpeg");
            return Err(CompareError::TranscodeFailed {
                exit_code: status.code(),
                tail: logger.get_tail(),
            });
        }

        Ok(())
    }
}

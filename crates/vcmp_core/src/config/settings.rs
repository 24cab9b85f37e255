//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Input/output/log directories.
    #[serde(default)]
    pub paths: PathSettings,

    /// External player configuration.
    #[serde(default)]
    pub player: PlayerSettings,

    /// External media tool locations.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Comparison encoder settings.
    #[serde(default)]
    pub encoding: EncodingSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Directory layout, relative to the working directory unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder scanned for source videos.
    #[serde(default = "default_input_folder")]
    pub input_folder: String,

    /// Folder receiving comparisons and graded sessions.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_input_folder() -> String {
    "input".to_string()
}

fn default_output_folder() -> String {
    "output".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            input_folder: default_input_folder(),
            output_folder: default_output_folder(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// External playback engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Player executable, or the directory that contains it.
    #[serde(default = "default_player_binary")]
    pub binary: String,

    /// Allow hardware decoding in the player and in ffmpeg.
    #[serde(default)]
    pub hardware_acceleration: bool,

    /// Suppress player output and lower the default log level.
    #[serde(default = "default_true")]
    pub quiet: bool,

    /// Interval between playback position samples.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_player_binary() -> String {
    "vlc".to_string()
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    100
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            binary: default_player_binary(),
            hardware_acceleration: false,
            quiet: true,
            poll_interval_ms: default_poll_interval(),
        }
    }
}

/// Locations of the ffmpeg tool suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
        }
    }
}

/// Encoder settings for the generated comparison video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingSettings {
    /// ffmpeg video encoder name.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Constant rate factor.
    #[serde(default = "default_crf")]
    pub crf: u32,

    /// Encoder speed preset.
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Font file for burned-in labels. Empty uses ffmpeg's default font.
    #[serde(default)]
    pub label_font: String,

    /// Font size for burned-in labels.
    #[serde(default = "default_label_font_size")]
    pub label_font_size: u32,
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_crf() -> u32 {
    18
}

fn default_preset() -> String {
    "fast".to_string()
}

fn default_label_font_size() -> u32 {
    24
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            video_codec: default_video_codec(),
            crf: default_crf(),
            preset: default_preset(),
            label_font: String::new(),
            label_font_size: default_label_font_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when RUST_LOG is not set.
    #[serde(default)]
    pub level: LogLevel,

    /// Number of ffmpeg stderr lines kept for error reports.
    #[serde(default = "default_error_tail")]
    pub error_tail: usize,

    /// Keep per-comparison log files after a successful run.
    #[serde(default = "default_true")]
    pub keep_run_logs: bool,
}

fn default_error_tail() -> usize {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            error_tail: default_error_tail(),
            keep_run_logs: true,
        }
    }
}

impl LoggingSettings {
    /// Level to use when nothing overrides it; quiet mode caps it at warnings.
    pub fn effective_level(&self, quiet: bool) -> LogLevel {
        if quiet {
            self.level.max(LogLevel::Warn)
        } else {
            self.level
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Player,
    Tools,
    Encoding,
    Logging,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Player,
        ConfigSection::Tools,
        ConfigSection::Encoding,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Player => "player",
            ConfigSection::Tools => "tools",
            ConfigSection::Encoding => "encoding",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the section in a generated file.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "# Input, output and log directories",
            ConfigSection::Player => "# External player",
            ConfigSection::Tools => "# ffmpeg / ffprobe locations",
            ConfigSection::Encoding => "# Comparison video encoding",
            ConfigSection::Logging => "# Logging configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[player]"));
        assert!(toml.contains("input_folder"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[player]\nbinary = \"/opt/vlc/vlc\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.player.binary, "/opt/vlc/vlc");
        assert!(parsed.player.quiet);
        assert!(!parsed.player.hardware_acceleration);
        assert_eq!(parsed.encoding.crf, 18);
        assert_eq!(parsed.paths.output_folder, "output");
    }

    #[test]
    fn log_level_reads_lowercase() {
        let parsed: Settings = toml::from_str("[logging]\nlevel = \"debug\"").unwrap();
        assert_eq!(parsed.logging.level, LogLevel::Debug);
    }

    #[test]
    fn quiet_caps_level_at_warn() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.effective_level(true), LogLevel::Warn);
        assert_eq!(logging.effective_level(false), LogLevel::Info);
    }
}

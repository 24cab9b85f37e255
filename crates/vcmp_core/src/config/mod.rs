//! Configuration management for Video Comparer.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use vcmp_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/settings.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Input folder: {}", config.settings().paths.input_folder);
//!
//! config.settings_mut().player.quiet = false;
//! config.update_section(ConfigSection::Player).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{validate_player_binary, ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, EncodingSettings, LoggingSettings, PathSettings, PlayerSettings, Settings,
    ToolSettings,
};

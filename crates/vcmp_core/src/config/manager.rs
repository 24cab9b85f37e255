//! Config manager for loading, saving, and atomic updates.
//!
//! Key features:
//! - Atomic writes (write to temp file, then rename)
//! - Section-level updates (only modified section is changed)
//! - Validation on load (removes unknown keys, fills missing ones)
//! - Preserves comments and formatting with toml_edit

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item, Table};

use super::settings::{ConfigSection, Settings};

/// Player executable names looked up inside a configured directory.
const PLAYER_EXECUTABLES: [&str; 2] = ["vlc", "vlc.exe"];

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid player path '{path}': {reason}")]
    InvalidPlayerPath { path: PathBuf, reason: String },

    #[error("Unknown setting '{0}'")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Check that a configured player location is usable.
///
/// Bare command names (no path separator) are left to PATH lookup.
/// A directory must contain the player executable. Returns the path
/// that should actually be executed.
pub fn validate_player_binary(path: &Path) -> ConfigResult<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidPlayerPath {
            path: path.to_path_buf(),
            reason: "path is empty".to_string(),
        });
    }

    if path.components().count() == 1 && !path.exists() {
        return Ok(path.to_path_buf());
    }

    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    if path.is_dir() {
        return PLAYER_EXECUTABLES
            .iter()
            .map(|name| path.join(name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| ConfigError::InvalidPlayerPath {
                path: path.to_path_buf(),
                reason: format!("directory does not contain {}", PLAYER_EXECUTABLES.join(" or ")),
            });
    }

    Err(ConfigError::InvalidPlayerPath {
        path: path.to_path_buf(),
        reason: "path does not exist".to_string(),
    })
}

/// Manages application configuration.
///
/// Handles loading, saving, and atomic section-level updates.
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Current settings loaded in memory.
    settings: Settings,
}

impl ConfigManager {
    /// Create a new config manager with the given config file path.
    ///
    /// Does not load the config - call `load()` or `load_or_create()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get a reference to the current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a mutable reference to the current settings.
    ///
    /// Note: Changes made here are only in memory until `save()` or
    /// `update_section()` is called.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load config from file.
    ///
    /// Returns error if file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Load config from file, creating with defaults if it doesn't exist.
    ///
    /// Also validates and cleans up the config, saving if changes were made.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            self.settings = toml::from_str(&content)?;

            if let Some(cleaned) = self.clean_document(&content)? {
                tracing::debug!("Rewriting cleaned config at {}", self.config_path.display());
                self.atomic_write(&cleaned)?;
            }
        } else {
            self.settings = Settings::default();
            self.save()?;
        }
        Ok(())
    }

    /// Get the logs folder path.
    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.logs_folder)
    }

    /// Validate and store a new player location, then persist the player section.
    pub fn set_player_binary(&mut self, path: &Path) -> ConfigResult<()> {
        let binary = validate_player_binary(path)?;
        self.settings.player.binary = binary.to_string_lossy().into_owned();
        self.update_section(ConfigSection::Player)
    }

    /// Set one of the player toggles by key and persist the player section.
    ///
    /// Recognized keys: `hardware_acceleration`, `quiet`.
    pub fn set_toggle(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let parsed = match value.to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => true,
            "false" | "off" | "no" | "0" => false,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
        };

        match key {
            "hardware_acceleration" => self.settings.player.hardware_acceleration = parsed,
            "quiet" => self.settings.player.quiet = parsed,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }

        self.update_section(ConfigSection::Player)
    }

    /// Drop unknown keys from `content` and fill in missing ones.
    ///
    /// Returns the rewritten file, or `None` if it already matches the
    /// loaded settings. Comments outside replaced sections are kept.
    fn clean_document(&self, content: &str) -> ConfigResult<Option<String>> {
        let mut doc: DocumentMut = content.parse()?;
        let complete = match toml::Value::try_from(&self.settings)? {
            toml::Value::Table(table) => table,
            _ => return Ok(None),
        };
        let mut modified = false;

        let unknown: Vec<String> = doc
            .iter()
            .map(|(key, _)| key.to_string())
            .filter(|key| !complete.contains_key(key))
            .collect();
        for key in unknown {
            tracing::warn!("Removing unknown config section [{}]", key);
            doc.remove(&key);
            modified = true;
        }

        for section in ConfigSection::ALL {
            let name = section.table_name();
            let Some(toml::Value::Table(expected)) = complete.get(name) else {
                continue;
            };

            let generated = self.section_table(section)?;
            match doc.get_mut(name).and_then(Item::as_table_like_mut) {
                Some(table) => {
                    let unknown: Vec<String> = table
                        .iter()
                        .map(|(key, _)| key.to_string())
                        .filter(|key| !expected.contains_key(key))
                        .collect();
                    for key in &unknown {
                        tracing::warn!("Removing unknown config key '{}.{}'", name, key);
                        table.remove(key);
                        modified = true;
                    }
                    for (key, item) in generated.iter() {
                        if !table.contains_key(key) {
                            table.insert(key, item.clone());
                            modified = true;
                        }
                    }
                }
                None => {
                    doc[name] = Item::Table(generated);
                    modified = true;
                }
            }
        }

        Ok(modified.then(|| doc.to_string()))
    }

    /// One section as an editable table.
    fn section_table(&self, section: ConfigSection) -> ConfigResult<Table> {
        let section_doc: DocumentMut = self.section_toml(section)?.parse()?;
        Ok(section_doc.as_table().clone())
    }

    /// Serialize one section's table body.
    fn section_toml(&self, section: ConfigSection) -> ConfigResult<String> {
        let body = match section {
            ConfigSection::Paths => toml::to_string_pretty(&self.settings.paths)?,
            ConfigSection::Player => toml::to_string_pretty(&self.settings.player)?,
            ConfigSection::Tools => toml::to_string_pretty(&self.settings.tools)?,
            ConfigSection::Encoding => toml::to_string_pretty(&self.settings.encoding)?,
            ConfigSection::Logging => toml::to_string_pretty(&self.settings.logging)?,
        };
        Ok(body)
    }

    /// The full config file as [`ConfigManager::save`] would write it.
    pub fn render(&self) -> ConfigResult<String> {
        self.generate_config_with_comments()
    }

    /// Save the entire config atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.generate_config_with_comments()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Update a specific section atomically.
    ///
    /// This re-reads the file from disk, updates only the specified section,
    /// and writes back atomically. Other sections keep their on-disk content.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let current_content = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = if current_content.is_empty() {
            DocumentMut::new()
        } else {
            current_content.parse()?
        };

        doc[section.table_name()] = Item::Table(self.section_table(section)?);

        self.atomic_write(&doc.to_string())?;
        tracing::debug!("Updated [{}] in {}", section.table_name(), self.config_path.display());

        Ok(())
    }

    /// Generate config content with helpful comments.
    fn generate_config_with_comments(&self) -> ConfigResult<String> {
        let mut output = String::new();

        output.push_str("# Video Comparer Configuration\n");
        output.push_str(
            "# This file is auto-generated. Comments may be preserved on section updates.\n\n",
        );

        for (i, section) in ConfigSection::ALL.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            output.push_str(section.comment());
            output.push('\n');
            output.push_str(&format!("[{}]\n", section.table_name()));
            for line in self.section_toml(*section)?.lines() {
                output.push_str(line);
                output.push('\n');
            }
        }

        Ok(output)
    }

    /// Write content to config file atomically.
    ///
    /// Writes to a temp file first, then renames.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_or_create_creates_default() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(".config").join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert!(config_path.exists());
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[paths]"));
        assert!(content.contains("[player]"));
        assert!(content.contains("[encoding]"));
    }

    #[test]
    fn load_or_create_preserves_existing() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        fs::write(&config_path, "[paths]\ninput_folder = \"clips\"\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert_eq!(manager.settings().paths.input_folder, "clips");
        assert_eq!(manager.settings().paths.output_folder, "output");
    }

    #[test]
    fn load_or_create_drops_unknown_keys_and_keeps_comments() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();
        let content = fs::read_to_string(&config_path).unwrap();
        let edited = content
            .replace("[player]\n", "[player]\nvolume = 80\n# my own player notes\n")
            + "\n[window]\nwidth = 800\n";
        fs::write(&config_path, edited).unwrap();

        let mut reloaded = ConfigManager::new(&config_path);
        reloaded.load_or_create().unwrap();

        let cleaned = fs::read_to_string(&config_path).unwrap();
        assert!(cleaned.contains("# my own player notes"));
        assert!(!cleaned.contains("volume"));
        assert!(!cleaned.contains("[window]"));
        assert!(cleaned.contains("[encoding]"));
    }

    #[test]
    fn load_or_create_fills_missing_sections() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");
        fs::write(&config_path, "# hand written\n[paths]\ninput_folder = \"clips\"\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.starts_with("# hand written"));
        assert!(content.contains("input_folder = \"clips\""));
        assert!(content.contains("output_folder"));
        assert!(content.contains("[player]"));
    }

    #[test]
    fn untouched_config_is_not_rewritten() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");
        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        let mut reloaded = ConfigManager::new(&config_path);
        reloaded.load_or_create().unwrap();
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(reloaded.clean_document(&content).unwrap().is_none());
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("absent.toml"));
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn update_section_only_changes_target() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        manager.settings_mut().player.quiet = false;
        manager.update_section(ConfigSection::Player).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("quiet = false"));
        assert!(content.contains("[paths]"));
    }

    #[test]
    fn set_toggle_persists_value() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();
        manager.set_toggle("hardware_acceleration", "on").unwrap();

        let mut reloaded = ConfigManager::new(&config_path);
        reloaded.load().unwrap();
        assert!(reloaded.settings().player.hardware_acceleration);
    }

    #[test]
    fn set_toggle_rejects_unknown_key_and_bad_value() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("settings.toml"));
        manager.load_or_create().unwrap();

        assert!(matches!(
            manager.set_toggle("volume", "true"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            manager.set_toggle("quiet", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn player_directory_must_contain_executable() {
        let dir = tempdir().unwrap();
        let err = validate_player_binary(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPlayerPath { .. }));

        fs::write(dir.path().join("vlc"), b"").unwrap();
        let resolved = validate_player_binary(dir.path()).unwrap();
        assert_eq!(resolved, dir.path().join("vlc"));
    }

    #[test]
    fn missing_player_path_is_rejected() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope").join("vlc");
        assert!(validate_player_binary(&missing).is_err());
        assert!(validate_player_binary(Path::new("vlc")).is_ok());
    }

    #[test]
    fn set_player_binary_stores_resolved_executable() {
        let dir = tempdir().unwrap();
        let player_dir = dir.path().join("VideoLAN");
        fs::create_dir(&player_dir).unwrap();
        fs::write(player_dir.join("vlc.exe"), b"").unwrap();

        let config_path = dir.path().join("settings.toml");
        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();
        manager.set_player_binary(&player_dir).unwrap();

        let expected = player_dir.join("vlc.exe").to_string_lossy().into_owned();
        assert_eq!(manager.settings().player.binary, expected);

        let mut reloaded = ConfigManager::new(&config_path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings().player.binary, expected);
        assert!(reloaded.render().unwrap().contains("[player]"));
    }

    #[test]
    fn atomic_write_creates_no_temp_on_success() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        let temp_path = config_path.with_extension("toml.tmp");
        assert!(!temp_path.exists());
    }
}

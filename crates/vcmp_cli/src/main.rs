//! Video Comparer - command-line entry point
//!
//! Handles:
//! - Argument parsing
//! - Configuration loading
//! - Application-level logging initialization
//! - Dispatch to the subcommands in `commands`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use vcmp_core::config::ConfigManager;
use vcmp_core::logging::{init_tracing_with_file, LogLevel};

mod commands;

/// Default config path: .config/settings.toml (relative to current working directory)
fn default_config_path() -> PathBuf {
    PathBuf::from(".config").join("settings.toml")
}

/// Build side-by-side comparisons of encodes, review them, and grade videos.
#[derive(Parser, Debug)]
#[command(name = "video-comparer")]
#[command(version)]
#[command(about = "Compare, review and grade video files side by side")]
#[command(long_about = "Video Comparer works on two folders in the current directory:\n\
    input/ holds the videos to look at, output/ receives comparisons and graded sessions.\n\n\
    EXAMPLES:\n    \
    video-comparer list\n    \
    video-comparer compare 1 2 --label \"CRF 18\" --label \"CRF 23\" --play\n    \
    video-comparer review output/20240101120000_clip --best clip.mp4 --notes \"less banding\"\n    \
    video-comparer grade --all")]
struct Cli {
    /// Config file to use instead of .config/settings.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging and full ffmpeg output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the videos in the input folder
    List,

    /// Render a side-by-side comparison of 2 to 5 videos
    Compare {
        /// Videos by path or by number from `list`
        #[arg(required = true, num_args = 1..)]
        videos: Vec<String>,

        /// Overlay label, once per video in the same order
        #[arg(short, long = "label", value_name = "TEXT")]
        labels: Vec<String>,

        /// Play the result and pick the best video afterwards
        #[arg(long)]
        play: bool,
    },

    /// Record the best video and notes for a comparison folder
    Review {
        /// Comparison folder under output/
        dir: PathBuf,

        /// File name of the best video in that folder
        #[arg(long)]
        best: String,

        /// Free-text notes
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Delete a comparison folder with its sources
    Discard {
        dir: PathBuf,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Play a video with a live position line
    Play { file: PathBuf },

    /// Sort videos into Bad / Average / Good or custom label folders
    Grade {
        /// Videos by path or by number from `list`
        #[arg(required_unless_present = "all")]
        videos: Vec<String>,

        /// Grade every video in the input folder
        #[arg(long, conflicts_with = "videos")]
        all: bool,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration
    Show,

    /// Set the player executable (or a folder containing it)
    SetPlayer { path: PathBuf },

    /// Set a player toggle: hardware_acceleration or quiet
    Set { key: String, value: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration first (needed for logs directory path)
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config_manager = ConfigManager::new(&config_path);

    if let Err(e) = config_manager.load_or_create() {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
    }

    let settings = config_manager.settings();
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        settings.logging.effective_level(settings.player.quiet)
    };
    let logs_dir = config_manager.logs_folder();
    let _log_guard = init_tracing_with_file(level, &logs_dir);

    tracing::info!("Video Comparer starting");
    tracing::debug!("Config: {}", config_path.display());
    tracing::debug!("Core version: {}", vcmp_core::version());

    let ctx = commands::Context::new(config_manager, cli.verbose);
    let result = match cli.command {
        Command::List => commands::list::run(&ctx),
        Command::Compare {
            videos,
            labels,
            play,
        } => commands::compare::run(&ctx, &videos, &labels, play),
        Command::Review { dir, best, notes } => commands::compare::review(&dir, &best, &notes),
        Command::Discard { dir, yes } => commands::compare::discard(&dir, yes),
        Command::Play { file } => commands::play::run(&ctx, &file),
        Command::Grade { videos, all } => commands::grade::run(&ctx, &videos, all),
        Command::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&ctx),
            ConfigAction::SetPlayer { path } => commands::config::set_player(ctx, &path),
            ConfigAction::Set { key, value } => commands::config::set(ctx, &key, &value),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_compare_with_labels() {
        let cli = Cli::try_parse_from([
            "video-comparer",
            "compare",
            "1",
            "clip.mp4",
            "--label",
            "A",
            "-l",
            "B",
            "--play",
        ])
        .unwrap();
        match cli.command {
            Command::Compare {
                videos,
                labels,
                play,
            } => {
                assert_eq!(videos, vec!["1", "clip.mp4"]);
                assert_eq!(labels, vec!["A", "B"]);
                assert!(play);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn grade_needs_videos_or_all() {
        assert!(Cli::try_parse_from(["video-comparer", "grade"]).is_err());
        assert!(Cli::try_parse_from(["video-comparer", "grade", "--all"]).is_ok());
        assert!(Cli::try_parse_from(["video-comparer", "grade", "--all", "a.mp4"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["video-comparer", "list", "--verbose", "--config", "x.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}

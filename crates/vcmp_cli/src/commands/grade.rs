//! `grade`: walk videos one by one and sort them into label folders.

use anyhow::{bail, Context as _, Result};

use vcmp_core::grading::GradingSession;
use vcmp_core::models::GradeLabel;
use vcmp_core::playback::{PositionPoller, SharedPlayer};

use super::{prompt, resolve_videos, Context};

const KEY_HELP: &str = "Grade: b bad, a average, g good, l <label> custom, s skip, c cancel";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Grade(GradeLabel),
    Skip,
    Cancel,
}

fn parse_action(line: &str) -> Option<Action> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix("l ").or_else(|| line.strip_prefix("L ")) {
        return GradeLabel::parse(rest).map(|label| match label {
            // `l bad` still means the custom text, not the built-in label
            GradeLabel::Custom(_) => Action::Grade(label),
            _ => Action::Grade(GradeLabel::Custom(rest.trim().to_string())),
        });
    }
    match line.to_ascii_lowercase().as_str() {
        "b" => Some(Action::Grade(GradeLabel::Bad)),
        "a" => Some(Action::Grade(GradeLabel::Average)),
        "g" => Some(Action::Grade(GradeLabel::Good)),
        "s" => Some(Action::Skip),
        "c" => Some(Action::Cancel),
        _ => None,
    }
}

pub fn run(ctx: &Context, videos: &[String], all: bool) -> Result<()> {
    let mut library = ctx.library()?;
    let selection = if all {
        library.check_all();
        if !library.can_grade() {
            bail!("No videos in {}", ctx.workspace().input_dir().display());
        }
        library.selected()
    } else {
        resolve_videos(&library, ctx.workspace().input_dir(), videos)?
    };

    let mut session =
        GradingSession::start(ctx.workspace(), selection).context("Failed to start grading")?;
    println!("Grading into {}", session.graded_dir().display());

    let player = ctx.player();
    // Loop each video until it is graded
    let poller = PositionPoller::spawn_looping(player.clone(), ctx.poll_interval(), |_| {});

    let mut loaded = None;
    while let Some(video) = session.current().map(|p| p.to_path_buf()) {
        if loaded.as_ref() != Some(&video) {
            let (index, total) = session.position();
            println!();
            println!("[{}/{}] {}", index + 1, total, video.display());
            if let Err(e) = player.swap_media(&video) {
                eprintln!("Warning: could not start playback: {}", e);
            }
            loaded = Some(video.clone());
        }

        let Some(line) = prompt(&format!("{}\n> ", KEY_HELP))? else {
            break;
        };
        let Some(action) = parse_action(&line) else {
            continue;
        };

        // The player must let go of the file before it moves
        release(&player);
        loaded = None;

        match action {
            Action::Grade(label) => match session.grade(label) {
                Ok(graded) => println!("Moved to {}", graded.to.display()),
                Err(e) => eprintln!("Warning: {}", e),
            },
            Action::Skip => session.skip()?,
            Action::Cancel => {
                drop(poller);
                player.unload();
                loop {
                    match session.cancel() {
                        Ok(summary) => {
                            println!(
                                "Grading cancelled. Restored {} video(s) to the input folder.",
                                summary.restored.len()
                            );
                            return Ok(());
                        }
                        Err(e) => {
                            eprintln!("Warning: {}", e);
                            let retry = prompt("Retry cancelling? [Y/n] ")?.unwrap_or_else(|| "n".to_string());
                            if retry.trim().eq_ignore_ascii_case("n") {
                                bail!("Some videos are still in {}", session.graded_dir().display());
                            }
                        }
                    }
                }
            }
        }
    }

    drop(poller);
    player.unload();

    if !session.is_complete() {
        println!("Input ended; keeping what was graded so far.");
    }
    let summary = session.finish();
    println!();
    println!("Graded videos are in {}", summary.graded_dir.display());
    for (label, count) in &summary.counts {
        println!("  {:<12} {}", label.folder_name(), count);
    }
    if summary.skipped > 0 {
        println!("  {:<12} {}", "skipped", summary.skipped);
    }
    Ok(())
}

fn release(player: &SharedPlayer) {
    if let Err(e) = player.stop() {
        tracing::warn!("Could not stop playback: {}", e);
    }
}

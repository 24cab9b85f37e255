//! `compare`, `review` and `discard`.

use std::path::Path;

use anyhow::{bail, Context as _, Result};

use vcmp_core::compare::{delete_comparison, Comparison, Review, ReviewOutcome};
use vcmp_core::probe::probe_resolution;

use super::{play, prompt, resolve_videos, Context};

pub fn run(ctx: &Context, videos: &[String], labels: &[String], play_after: bool) -> Result<()> {
    let library = ctx.library()?;
    let selection = resolve_videos(&library, ctx.workspace().input_dir(), videos)?;

    println!("Building comparison of {} videos...", selection.len());
    let comparison = ctx
        .comparer()
        .build(&selection, labels)
        .context("Comparison failed")?;

    println!("Comparison: {}", comparison.output_file.display());
    for (source, speed) in comparison.sources.iter().zip(&comparison.speed_factors) {
        println!("  {}  (speed x{:.3})", source.display(), speed);
    }
    println!("  frame rate: {}", comparison.target_fps);
    println!(
        "  size: {}",
        probe_resolution(&ctx.settings().tools.ffprobe, &comparison.output_file)
    );
    if let Some(log) = &comparison.log_file {
        println!("  log: {}", log.display());
    }

    if play_after {
        let player = ctx.player();
        match player.swap_media(&comparison.output_file) {
            Ok(()) => {
                let watched = play::watch(ctx, &player);
                player.unload();
                watched?;
            }
            Err(e) => eprintln!("Warning: could not start playback: {}", e),
        }
        choose_best(&comparison)?;
    }
    Ok(())
}

/// Ask for the best video and notes, or offer to discard the comparison.
fn choose_best(comparison: &Comparison) -> Result<()> {
    println!();
    for line in comparison.candidates() {
        println!("{}", line);
    }

    let Some(choice) = prompt("Best video number (Enter to skip, d to discard): ")? else {
        return Ok(());
    };
    let choice = choice.trim();
    if choice.is_empty() {
        println!("Review skipped. Record one later with `video-comparer review`.");
        return Ok(());
    }
    if choice.eq_ignore_ascii_case("d") {
        return discard(&comparison.dir, false);
    }

    let best = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| comparison.sources.get(i))
        .with_context(|| format!("No candidate '{}'", choice))?;
    let best_name = best
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let notes = prompt("Notes: ")?.unwrap_or_default();
    let outcome = Review::new(&best_name, notes)
        .save(&comparison.dir)
        .context("Failed to save review")?;
    report(&outcome);
    Ok(())
}

pub fn review(dir: &Path, best: &str, notes: &str) -> Result<()> {
    let outcome = Review::new(best, notes)
        .save(dir)
        .with_context(|| format!("Failed to review {}", dir.display()))?;
    report(&outcome);
    Ok(())
}

fn report(outcome: &ReviewOutcome) {
    println!("Notes saved to {}", outcome.notes_file.display());
    match &outcome.renamed_to {
        Some(path) => println!("Best video renamed to {}", path.display()),
        None => println!("Best video not found in the folder. Only notes were saved."),
    }
}

pub fn discard(dir: &Path, yes: bool) -> Result<()> {
    if !dir.is_dir() {
        bail!("Not a comparison folder: {}", dir.display());
    }
    if !yes {
        let answer = prompt(&format!(
            "Delete {} and every video in it? [y/N] ",
            dir.display()
        ))?
        .unwrap_or_default();
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Kept {}", dir.display());
            return Ok(());
        }
    }

    delete_comparison(dir).with_context(|| format!("Failed to delete {}", dir.display()))?;
    println!("Deleted {}", dir.display());
    Ok(())
}

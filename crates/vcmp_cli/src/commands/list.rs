//! `list`: input videos and existing comparisons.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use vcmp_core::compare::{Review, COMPARISON_FILE};

use super::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let library = ctx.library()?;
    let input_dir = ctx.workspace().input_dir();

    if library.is_empty() {
        println!("No videos in {}", input_dir.display());
    } else {
        println!("Videos in {}:", input_dir.display());
        for (i, entry) in library.entries().iter().enumerate() {
            println!("  {:>3}  {}", i + 1, entry.file_name());
        }
    }

    let comparisons = comparison_dirs(ctx)?;
    if !comparisons.is_empty() {
        println!();
        println!("Comparisons:");
        for dir in comparisons {
            let status = if Review::exists(&dir) { "reviewed" } else { "not reviewed" };
            println!("  {}  ({})", dir.display(), status);
        }
    }
    Ok(())
}

fn comparison_dirs(ctx: &Context) -> Result<Vec<PathBuf>> {
    let output_dir = ctx.workspace().output_dir();
    let entries = fs::read_dir(output_dir)
        .with_context(|| format!("Failed to read {}", output_dir.display()))?;

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.join(COMPARISON_FILE).is_file())
        .collect();
    dirs.sort();
    Ok(dirs)
}

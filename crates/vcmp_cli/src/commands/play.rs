//! `play`: transport control over the external player.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context as _, Result};

use vcmp_core::playback::{PositionPoller, SharedPlayer};

use super::{format_position, prompt, Context};

const KEY_HELP: &str = "Keys: p play, space pause, s stop, <seconds> seek, q quit (Enter after each)";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Key {
    Play,
    Pause,
    Stop,
    Seek(Duration),
    Quit,
}

fn parse_key(line: &str) -> Option<Key> {
    if !line.is_empty() && line.trim().is_empty() {
        return Some(Key::Pause);
    }
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "play" => Some(Key::Play),
        "space" | "pause" => Some(Key::Pause),
        "s" | "stop" => Some(Key::Stop),
        "q" | "quit" => Some(Key::Quit),
        other => other
            .parse::<f64>()
            .ok()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .map(Key::Seek),
    }
}

pub fn run(ctx: &Context, file: &Path) -> Result<()> {
    if !file.is_file() {
        bail!("Video not found: {}", file.display());
    }

    let player = ctx.player();
    player
        .swap_media(file)
        .with_context(|| format!("Failed to play {}", file.display()))?;

    let result = watch(ctx, &player);
    player.unload();
    result
}

/// Control loaded media from stdin until `q` or end of input.
pub fn watch(ctx: &Context, player: &SharedPlayer) -> Result<()> {
    let poller = PositionPoller::spawn(player.clone(), ctx.poll_interval(), |sample| {
        eprint!("\r{}    ", format_position(&sample));
    });
    let scrubber = poller.scrubber();

    println!("{}", KEY_HELP);
    while let Some(line) = prompt("")? {
        let outcome = match parse_key(&line) {
            Some(Key::Play) => player.play(),
            Some(Key::Pause) => player.pause(),
            Some(Key::Stop) => player.stop(),
            Some(Key::Seek(target)) => {
                scrubber.begin();
                scrubber.end(target)
            }
            Some(Key::Quit) => break,
            None => {
                if !line.is_empty() {
                    println!("{}", KEY_HELP);
                }
                Ok(())
            }
        };
        if let Err(e) = outcome {
            eprintln!("\nWarning: {}", e);
        }
    }

    drop(poller);
    eprintln!();
    Ok(())
}

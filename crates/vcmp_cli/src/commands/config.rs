//! `config show|set-player|set`.

use std::path::Path;

use anyhow::{Context as _, Result};

use super::Context;

pub fn show(ctx: &Context) -> Result<()> {
    println!("# {}", ctx.config.path().display());
    print!("{}", ctx.config.render().context("Failed to render config")?);
    Ok(())
}

pub fn set_player(mut ctx: Context, path: &Path) -> Result<()> {
    ctx.config
        .set_player_binary(path)
        .with_context(|| format!("Cannot use {} as the player", path.display()))?;
    println!("Player set to {}", ctx.settings().player.binary);
    Ok(())
}

pub fn set(mut ctx: Context, key: &str, value: &str) -> Result<()> {
    ctx.config
        .set_toggle(key, value)
        .with_context(|| format!("Cannot set {}", key))?;
    println!("{} = {}", key, value);
    Ok(())
}

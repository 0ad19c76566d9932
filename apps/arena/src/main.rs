use anyhow::Context;
use herald_arena::{Arena, init_logging, load_config};
use std::path::PathBuf;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let cfg = load_config(path.as_deref()).context("Critical: Configuration is malformed")?;

    let _log = init_logging(env!("CARGO_BIN_NAME"), &cfg.logging)?;

    let report = Arena::new(&cfg)?.run()?;

    for (player, position) in &report.positions {
        info!(player = player.as_str(), %position, "Final position");
    }
    info!(heard = report.chat.len(), late = report.late_chat_handlers, "Arena closed");

    Ok(())
}

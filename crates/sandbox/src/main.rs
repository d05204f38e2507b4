//! Scripted sandbox for the ability runtime.
//!
//! Loads content, spawns a player and an enemy, and replays a short input
//! script through the core. Set `RUST_LOG=debug` to see every grant,
//! activation and effect application.

mod abilities;
mod config;
mod scenario;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::SandboxConfig;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let config = SandboxConfig::from_env();
    tracing::info!(data_dir = %config.data_dir.display(), "starting sandbox");

    let report = scenario::run(&config)?;
    tracing::info!(
        player_health = report.player_health,
        enemy_health = report.enemy_health,
        max_walk_speed = report.max_walk_speed,
        ability_events = report.events.len(),
        replicated = report.replicated.len(),
        "sandbox finished"
    );
    Ok(())
}

fn setup_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod audio;
mod config;
mod error;
mod player;

use tracing_subscriber::EnvFilter;

fn main() -> Result<(), eframe::Error> {
    init_tracing();
    let config = config::PlayerConfig::load_or_default();
    player::run(config)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

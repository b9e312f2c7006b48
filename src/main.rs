mod action;
mod api;
mod app;
mod cli;
mod components;
mod config;
mod error;
mod input;
mod logging;
mod render;
mod session;
mod util;

use color_eyre::eyre::Result;
use cli::Cli;
use config::ConfigManager;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse_args();

    let manager = ConfigManager::new(cli.config.as_deref())?;
    let mut config = manager.app_config().clone();
    config.apply_cli(&cli);

    // Held until exit so buffered log lines are flushed
    let _log_guard = logging::init(&config.general.log_level, config.general.log_file.as_deref())?;
    tracing::info!("Config: {}", manager.config_path().display());
    if let Err(e) = manager.write_default_config() {
        tracing::warn!("{}", e);
    }

    let mut app = app::App::new(config)?;
    app.run()?;

    Ok(())
}

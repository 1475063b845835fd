//! pagewatch - browser tab keyword monitor
//!
//! Main entry point for the pagewatch CLI and daemon.

mod cli;
mod cmd_check;
mod cmd_config;
mod cmd_run;

use std::path::Path;

use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pagewatch_config::{AppConfig, ConfigLoader};

use crate::cli::{Cli, Commands};
use crate::cmd_check::run_check;
use crate::cmd_config::handle_config_command;
use crate::cmd_run::run_monitor;

/// Initialize tracing with console and file output.
///
/// Log files are written to the configured log dir with daily rotation.
fn init_tracing(level: &str, log_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("pagewatch")
        .filename_suffix("log")
        .max_log_files(14)
        .build(log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer when dropped, so it lives for the
    // whole program.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer
        .with(fmt::layer().with_target(true).with_ansi(true))
        // File layer (no colors)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(AppConfig::default_path);
    let config = ConfigLoader::load_or_default(&config_path)?;

    init_tracing(&config.logging.level, &config.log_dir())?;
    tracing::debug!("Using config file {}", config_path.display());

    match cli.command {
        None | Some(Commands::Run) => run_monitor(config).await,
        Some(Commands::Config { action }) => handle_config_command(action, &config).await,
        Some(Commands::Check {
            file,
            keywords,
            min_count,
        }) => run_check(&config, &file, keywords, min_count).await,
    }
}

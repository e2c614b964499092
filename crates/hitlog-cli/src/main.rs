//! hitlog - command-line driver for the offline-first workout log.
//!
//! Runs the cache controller, the exercise catalog resolver and the workout
//! log against on-disk storage.

mod cli;
mod commands;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use hitlog_core::Config;

/// Log file name prefix inside `<cache dir>/logs`
const LOG_FILE_PREFIX: &str = "hitlog.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and to a daily-rotated file under the cache directory.
/// The returned guard must stay alive for file output to be flushed.
fn init_tracing(verbose: u8, config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_dir = config
        .cache_dir()
        .ok()
        .map(|dir| dir.join("logs"))
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (mut config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_env();
    if cli.offline {
        config.offline_mode = true;
    }

    let _guard = init_tracing(cli.verbose, &config);
    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    debug!(origin = %config.origin, offline = config.offline_mode, "hitlog starting");

    commands::run(cli.command, &config).await
}

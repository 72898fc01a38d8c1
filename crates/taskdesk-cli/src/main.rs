//! taskdesk - a command-line client for the task tracker.
//!
//! Regular users list and complete their own tasks. Administrators also
//! manage the user roster and the global task list.

mod app;
mod cli;
mod commands;
mod output;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use cli::Cli;
use taskdesk_core::Config;

/// Directory for a daily rolling log file, if set
const LOG_DIR_ENV: &str = "TASKDESK_LOG_DIR";

/// Log file name prefix inside the log directory
const LOG_FILE_PREFIX: &str = "taskdesk.log";

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the file writer on drop.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => {
            let appender = tracing_appender::rolling::daily(PathBuf::from(dir), LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Dropped when main returns, which flushes the log file
    let _log_guard = init_tracing();
    info!("taskdesk starting");

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };

    finish(run(config, cli).await)
}

async fn run(config: Config, cli: Cli) -> Result<()> {
    let mut app = App::new(config, cli.api_url)?;
    commands::run(&mut app, cli.command).await
}

/// Report a failed command on stderr and turn the outcome into the exit status
fn finish(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", output::user_message(&e));
            ExitCode::FAILURE
        }
    }
}

//! CLI command implementations

pub mod logs;
pub mod migrate;
pub mod serve;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use hainco_core::{EntryPoint, HaincoContext, LogEvent, LoggingService};

/// Shared handle to the event log, absent when it failed to open
pub type Logger = Option<Arc<LoggingService>>;

/// Open the event log in the data directory
pub fn open_logger(entry_point: EntryPoint) -> Result<LoggingService> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;
    LoggingService::new(&data_dir, entry_point, env!("CARGO_PKG_VERSION"))
        .context("Failed to open event log")
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger(entry_point: EntryPoint) -> Logger {
    open_logger(entry_point).ok().map(Arc::new)
}

/// Log an event, ignoring any errors
pub fn log_event(logger: &Logger, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

pub fn log_command(logger: &Logger, command: &str) {
    if let Some(l) = logger {
        let _ = l.log_command(command);
    }
}

pub fn log_failure(logger: &Logger, command: &str, err: &anyhow::Error) {
    log_event(
        logger,
        LogEvent::new("command_failed")
            .with_command(command)
            .with_error(err.to_string())
            .with_error_details(format!("{:?}", err)),
    );
}

/// Install the stderr tracing subscriber; `RUST_LOG` overrides `default_level`
pub fn setup_tracing(default_level: &str) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Data directory from `HAINCO_DIR`, defaulting to `~/.hainco`
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("HAINCO_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".hainco"))
        .ok_or_else(|| anyhow!("Could not find home directory; set HAINCO_DIR"))
}

/// Open the database and build all services
pub fn get_context() -> Result<HaincoContext> {
    let data_dir = get_data_dir()?;
    HaincoContext::new(&data_dir).context("Failed to initialize Hain.co context")
}

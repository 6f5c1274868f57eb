//! Hain.co CLI - run and inspect the canteen backend

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hainco_core::EntryPoint;

mod commands;
mod output;

use commands::{logs, migrate, serve, status};

/// Hain.co - canteen ordering backend
#[derive(Parser)]
#[command(name = "hainco", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to bind (overrides settings.json and HAINCO_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides settings.json and HAINCO_PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show row counts for every resource table
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply pending database migrations
    Migrate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Serve { .. } => "serve",
            Commands::Status { .. } => "status",
            Commands::Migrate { .. } => "migrate",
            Commands::Logs { .. } => "logs",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let name = cli.command.name();

    let (default_level, entry_point) = match cli.command {
        Commands::Serve { .. } => ("info,tower_http=debug", EntryPoint::Api),
        _ => ("warn", EntryPoint::Cli),
    };
    commands::setup_tracing(default_level);

    let logger = commands::get_logger(entry_point);
    commands::log_command(&logger, name);

    match run(cli, logger.clone()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_failure(&logger, name, &e);
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, logger: commands::Logger) -> Result<()> {
    match cli.command {
        Commands::Serve { host, port } => serve::run(host, port, logger).await,
        Commands::Status { json } => status::run(json).await,
        Commands::Migrate { json } => migrate::run(json),
        Commands::Logs { command } => logs::run(command, logger),
    }
}

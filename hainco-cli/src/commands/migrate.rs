//! Migrate command - apply pending schema migrations

use anyhow::{Context, Result};
use colored::Colorize;
use hainco_core::adapters::duckdb::DuckDbRepository;
use hainco_core::config::Config;

use super::get_data_dir;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    let config = Config::load(&data_dir).context("Failed to load configuration")?;
    let db_path = data_dir.join(&config.database_file);
    let repository = DuckDbRepository::new(&db_path)
        .with_context(|| format!("Failed to open database: {:?}", db_path))?;

    let result = repository.run_migrations()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.applied.is_empty() {
        output::info(&format!(
            "Database is up to date ({} migrations applied)",
            result.already_applied
        ));
        return Ok(());
    }

    output::success(&format!("Applied {} migration(s):", result.applied.len()));
    for name in &result.applied {
        println!("  {}", name.dimmed());
    }

    Ok(())
}

//! Serve command - run the HTTP API

use std::sync::Arc;

use anyhow::{Context, Result};
use hainco_api::AppState;
use hainco_core::config::Config;
use hainco_core::HaincoContext;

use super::{get_data_dir, Logger};

pub async fn run(host: Option<String>, port: Option<u16>, logger: Logger) -> Result<()> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    let mut config = Config::load(&data_dir).context("Failed to load configuration")?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        anyhow::ensure!(port != 0, "Port must be between 1 and 65535");
        config.port = port;
    }

    tracing::info!(data_dir = %data_dir.display(), ?config, "starting Hain.co API");

    let context = HaincoContext::with_config(&data_dir, config)
        .context("Failed to initialize Hain.co context")?;

    let mut state = AppState::new(Arc::new(context));
    if let Some(events) = logger {
        state = state.with_events(events);
    }

    hainco_api::serve(state).await
}

pub mod cli;
pub mod core;
pub mod providers;

use crate::core::ConversionEngine;
use crate::core::config::AppConfig;
use crate::core::engine::ConversionRequest;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: String,
        from: Option<String>,
        to: Option<String>,
    },
    Rates,
}

/// Loads configuration from disk and the environment, then runs `command`.
pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    run_with_config(command, config.with_env_overrides()).await
}

/// Runs `command` against an already resolved configuration.
pub async fn run_with_config(command: AppCommand, config: AppConfig) -> Result<()> {
    info!("Currency converter starting...");
    debug!(
        base_url = %config.provider.base_url,
        base_currency = %config.base_currency,
        "Using config"
    );

    let provider = providers::ApiLayerProvider::new(
        &config.provider.base_url,
        &config.api_key()?,
        Duration::from_secs(config.provider.timeout_secs),
    )?;

    let request = ConversionRequest {
        from_currency: config.default_from.clone(),
        to_currency: config.default_to.clone(),
        ..ConversionRequest::default()
    };
    let engine = Arc::new(ConversionEngine::with_request(
        &config.base_currency,
        Arc::new(provider),
        request,
    ));

    match command {
        AppCommand::Convert { amount, from, to } => {
            let from = from.unwrap_or(config.default_from);
            let to = to.unwrap_or(config.default_to);
            cli::convert::run(engine, &amount, &from, &to).await
        }
        AppCommand::Rates => cli::rates::run(engine).await,
    }
}

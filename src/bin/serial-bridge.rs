use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use serial_bridge::action::client::ActionClient;
use serial_bridge::server;
use serial_bridge::server::process_serial::GatewayState;
use serial_bridge::sources::oauth2::OAuth2TokenProvider;
use serial_bridge::utils::config_loader;
use serial_bridge::utils::logging;
use serial_bridge::utils::logging::LogLevel;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "serial-bridge.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level)?;

    // -------------------------------
    // 2. Create request client, shared by token and action calls
    // -------------------------------

    let client = Client::builder()
        .timeout(Duration::from_millis(service_config.settings.http_timeout_ms()))
        .build()
        .context("failed to build HTTP client")?;

    // -------------------------------
    // 3. Token provider -> action client -> gateway
    // -------------------------------

    let provider = OAuth2TokenProvider::new(service_config.auth.clone(), client.clone());
    let action_client = ActionClient::new(service_config.action.clone(), client, provider);
    let gateway_state = GatewayState::new(&service_config.gateway, action_client)?;

    // -------------------------------
    // 4. Serve until Ctrl-C
    // -------------------------------

    info!("Service starting...");
    server::server::start(&service_config.settings, gateway_state, shutdown_signal()).await?;
    info!("Service stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

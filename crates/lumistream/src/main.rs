//! LumiStream daemon: mirrors capture-device colors onto Hue lights.

use anyhow::{bail, Context, Result};
use lumistream_control::hue::api::client::{HueClient, PairingOutcome};
use lumistream_control::{LumiConfig, SyncOrchestrator};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// How long the user gets to press the bridge link button during pairing.
const PAIRING_TIMEOUT: Duration = Duration::from_secs(60);

const DEVICE_NAME: &str = "lumistream#daemon";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "lumistream.toml".to_string());
    let mut config = LumiConfig::from_file(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path))?;

    // Pair with the bridge on first run, then persist the credentials.
    if config.bridge.username.is_empty() {
        info!("No bridge credentials; press the link button on the bridge to pair");
        match HueClient::register_with_timeout(&config.bridge.ip, DEVICE_NAME, PAIRING_TIMEOUT)
            .await?
        {
            PairingOutcome::Paired(credentials) => {
                config.bridge.username = credentials.username;
                config.bridge.client_key = credentials.client_key;
            }
            PairingOutcome::NotPaired => {
                bail!("pairing timed out: link button was not pressed");
            }
        }
        config.bridge.application_id =
            HueClient::get_application_id(&config.bridge.ip, &config.bridge.username).await?;
        config
            .to_file(&config_path)
            .with_context(|| format!("saving credentials to {}", config_path))?;
    } else if config.bridge.application_id.is_empty() {
        // Credentials from before the application-id was recorded.
        config.bridge.application_id =
            HueClient::get_application_id(&config.bridge.ip, &config.bridge.username).await?;
        config.to_file(&config_path)?;
    }

    let mut orchestrator = SyncOrchestrator::new(config);
    orchestrator.start_sync().await?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("Shutdown requested");

    orchestrator.dispose().await?;
    Ok(())
}

use super::error::HueError;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize, Debug, Clone)]
pub struct DiscoveredBridge {
    #[serde(rename = "internalipaddress")]
    pub ip: String,
    pub id: String,
}

/// Discover Hue bridges using the meethue.com N-UPnP API.
pub async fn discover_bridges() -> Result<Vec<DiscoveredBridge>, HueError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(HueError::Network)?;

    let resp = client.get("https://discovery.meethue.com").send().await?;
    let devices: Vec<DiscoveredBridge> = resp.json().await?;

    if devices.is_empty() {
        return Err(HueError::DiscoveryFailed);
    }
    Ok(devices)
}

/// Convenience wrapper returning the first discovered bridge's IP.
pub async fn discover_bridge() -> Result<String, HueError> {
    let bridges = discover_bridges().await?;
    bridges
        .first()
        .map(|b| b.ip.clone())
        .ok_or(HueError::DiscoveryFailed)
}

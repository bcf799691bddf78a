use super::error::HueError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Credentials handed out by the bridge after a successful pairing.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// REST username / hue-application-key
    pub username: String,
    /// DTLS pre-shared key (hex string)
    pub client_key: String,
}

/// Outcome of one pairing attempt.
///
/// "Link button not pressed" is an expected answer during pairing, not an
/// error, so it gets its own variant; transport failures still surface as
/// `Err`.
#[derive(Debug)]
pub enum PairingOutcome {
    Paired(Credentials),
    NotPaired,
}

pub struct HueClient;

#[derive(Serialize)]
struct RegisterBody<'a> {
    devicetype: &'a str,
    generateclientkey: bool,
}

#[derive(Deserialize)]
struct RegisterSuccess {
    username: String,
    clientkey: String,
}

#[derive(Deserialize)]
struct BridgeErrorBody {
    #[serde(rename = "type")]
    error_type: i32,
    description: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RegisterResponseItem {
    Success { success: RegisterSuccess },
    Error { error: BridgeErrorBody },
}

// Bridges serve a self-signed certificate; REST access would fail with
// default TLS verification.
fn build_client() -> Result<reqwest::Client, HueError> {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .build()
        .map_err(HueError::Network)
}

impl HueClient {
    /// Attempt to register a new application with the bridge, once.
    ///
    /// Returns [`PairingOutcome::NotPaired`] when the bridge reports that the
    /// physical link button has not been pressed (error type 101).
    pub async fn register_user(ip: &str, devicename: &str) -> Result<PairingOutcome, HueError> {
        let client = build_client()?;

        let body = RegisterBody {
            devicetype: devicename,
            generateclientkey: true,
        };

        let url = format!("https://{}/api", ip);
        let resp = client.post(&url).json(&body).send().await?;
        let items: Vec<RegisterResponseItem> = resp.json().await?;

        match items.first() {
            Some(RegisterResponseItem::Success { success }) => {
                Ok(PairingOutcome::Paired(Credentials {
                    username: success.username.clone(),
                    client_key: success.clientkey.clone(),
                }))
            }
            Some(RegisterResponseItem::Error { error }) => {
                if error.error_type == 101 {
                    Ok(PairingOutcome::NotPaired)
                } else {
                    Err(HueError::ApiError(error.description.clone()))
                }
            }
            None => Err(HueError::ApiError(
                "Empty response from Hue Bridge".to_string(),
            )),
        }
    }

    /// Poll the bridge for pairing, giving the user time to walk over and
    /// press the link button.
    ///
    /// Resolves to [`PairingOutcome::NotPaired`] if the button was never
    /// pressed within `timeout`; other API failures abort immediately.
    pub async fn register_with_timeout(
        ip: &str,
        devicename: &str,
        timeout: Duration,
    ) -> Result<PairingOutcome, HueError> {
        let start = std::time::Instant::now();
        let poll_interval = Duration::from_secs(2);

        info!(
            "Starting bridge registration at {} ({}s timeout)...",
            ip,
            timeout.as_secs()
        );

        while start.elapsed() < timeout {
            match Self::register_user(ip, devicename).await? {
                PairingOutcome::Paired(credentials) => {
                    info!("Successfully registered with Hue bridge");
                    return Ok(PairingOutcome::Paired(credentials));
                }
                PairingOutcome::NotPaired => {
                    info!(
                        "Link button not pressed yet ({}s/{}s), retrying...",
                        start.elapsed().as_secs(),
                        timeout.as_secs()
                    );
                }
            }
            tokio::time::sleep(poll_interval).await;
        }

        Ok(PairingOutcome::NotPaired)
    }

    /// Fetch the hue-application-id from the bridge.
    ///
    /// This ID is required as the PSK identity for DTLS streaming. The bridge
    /// returns it in the `hue-application-id` response header of
    /// `GET /auth/v1`.
    pub async fn get_application_id(ip: &str, username: &str) -> Result<String, HueError> {
        let client = build_client()?;

        let url = format!("https://{}/auth/v1", ip);
        let resp = client
            .get(&url)
            .header("hue-application-key", username)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(HueError::ApiError(format!(
                "Failed to get application ID: HTTP {}",
                resp.status()
            )));
        }

        resp.headers()
            .get("hue-application-id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                HueError::ApiError("Missing hue-application-id header in response".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_register_success() {
        let json = json!([{
            "success": {
                "username": "myuser",
                "clientkey": "mykey"
            }
        }]);

        let items: Vec<RegisterResponseItem> = serde_json::from_value(json).unwrap();
        if let RegisterResponseItem::Success { success } = &items[0] {
            assert_eq!(success.username, "myuser");
            assert_eq!(success.clientkey, "mykey");
        } else {
            panic!("Expected success");
        }
    }

    #[test]
    fn test_parse_register_error_101() {
        let json = json!([{
            "error": {
                "type": 101,
                "address": "",
                "description": "link button not pressed"
            }
        }]);

        let items: Vec<RegisterResponseItem> = serde_json::from_value(json).unwrap();
        if let RegisterResponseItem::Error { error } = &items[0] {
            assert_eq!(error.error_type, 101);
        } else {
            panic!("Expected error");
        }
    }
}

use serde::{Deserialize, Serialize};

/// Credentials and selection for one Hue bridge.
#[derive(Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BridgeConfig {
    pub ip: String,
    /// Used as "hue-application-key" in REST headers
    pub username: String,
    /// Used as PSK for DTLS encryption (hex string)
    pub client_key: String,
    /// Used as PSK identity for DTLS (from /auth/v1)
    #[serde(default)]
    pub application_id: String,
    /// Selected entertainment configuration (v2 UUID); empty means
    /// "fall back to the first group on the bridge"
    #[serde(default)]
    pub entertainment_group_id: String,
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("ip", &self.ip)
            .field("username", &"***REDACTED***")
            .field("client_key", &"***REDACTED***")
            .field("application_id", &self.application_id)
            .field("entertainment_group_id", &self.entertainment_group_id)
            .finish()
    }
}

/// One light channel in an entertainment configuration.
/// `channel_id` is the streaming ID (0, 1, 2...), NOT the light's REST API ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightNode {
    /// REST API light ID (matched against the mapping table)
    pub id: String,
    /// Streaming channel ID (0-based index for DTLS messages)
    pub channel_id: u8,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_config_debug_redaction() {
        let config = BridgeConfig {
            ip: "192.168.1.5".to_string(),
            username: "secret_user_123".to_string(),
            client_key: "secret_key_456".to_string(),
            application_id: "app_789".to_string(),
            entertainment_group_id: "group_001".to_string(),
        };
        let debug_str = format!("{:?}", config);

        assert!(debug_str.contains("***REDACTED***"));
        assert!(!debug_str.contains("secret_user_123"));
        assert!(!debug_str.contains("secret_key_456"));

        assert!(debug_str.contains("192.168.1.5"));
        assert!(debug_str.contains("app_789"));
        assert!(debug_str.contains("group_001"));
    }
}

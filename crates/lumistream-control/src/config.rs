//! Typed daemon configuration.
//!
//! Everything the daemon needs is enumerated here and loaded from one TOML
//! file at startup: bridge credentials, the light-to-sector mapping table,
//! global brightness, capture listener settings and the optional ambient
//! scene. Callers get strongly-typed fields; there is no runtime key-value
//! probing.

use crate::dreamscreen::DeviceKind;
use crate::error::{Result, SyncError};
use crate::hue::models::BridgeConfig;
use lumistream_core::{LightMapping, SceneContext};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LumiConfig {
    pub bridge: BridgeConfig,
    pub capture: CaptureConfig,
    #[serde(default)]
    pub sync: SyncSettings,
    /// Ambient scene context; absent means direct passthrough streaming
    #[serde(default)]
    pub scene: Option<SceneContext>,
    /// Light-to-sector mapping table
    #[serde(default)]
    pub lights: Vec<LightMapping>,
}

/// Capture-device listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    /// UDP bind address for capture frames, e.g. `0.0.0.0:8888`
    pub listen_address: String,
    /// Device identity we present on the capture network
    #[serde(default)]
    pub device_kind: DeviceKind,
    /// Capture group this listener subscribes to
    #[serde(default)]
    pub group_number: u8,
}

/// Streaming-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSettings {
    /// Global brightness percentage (0-100)
    pub brightness: u8,
    /// Number of sectors in a capture frame
    pub sector_count: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            brightness: 100,
            sector_count: 12,
        }
    }
}

impl LumiConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(&path)?;
        toml::from_str(&contents)
            .map_err(|e| SyncError::Config(format!("{}: {}", path.as_ref().display(), e)))
    }

    /// Save configuration to a TOML file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| SyncError::Config(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }
}

//! Light-to-sector mapping.
//!
//! Each physical light on the bridge can be mapped to one logical sector of
//! the capture frame, with an optional per-light brightness override. Lights
//! without a mapping (or mapped to sector -1) are never streamed to.

use serde::{Deserialize, Serialize};

/// Persisted mapping from a physical light to a logical sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightMapping {
    /// Bridge-side light identifier
    pub light_id: String,
    /// Logical sector index; -1 means unmapped
    pub sector_id: i32,
    /// When set, `brightness` replaces the global brightness for this light
    #[serde(default)]
    pub override_brightness: bool,
    /// Per-light brightness percentage (0-100), used when overriding
    #[serde(default = "default_brightness")]
    pub brightness: u8,
}

fn default_brightness() -> u8 {
    100
}

/// A light that will be streamed to, with its resolved sector and cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Index into the input light-id slice
    pub index: usize,
    /// Sector this light mirrors
    pub sector_id: usize,
    /// Maximum permitted brightness on a 0-255 scale
    pub brightness_cap: u8,
}

/// Convert a brightness percentage to a 0-255 cap.
///
/// Saturating integer truncation, matching the wire scale: `255 * pct / 100`.
/// Out-of-range percentages are clamped, not rejected.
pub fn brightness_cap(percent: u8) -> u8 {
    let pct = u32::from(percent.min(100));
    (255 * pct / 100) as u8
}

/// Resolve physical lights against the mapping table.
///
/// Lights with no mapping entry, or mapped to sector -1, are excluded from
/// the result entirely. The effective cap is the per-light override when
/// enabled, otherwise the global brightness percentage.
pub fn resolve_targets(
    light_ids: &[&str],
    mappings: &[LightMapping],
    global_brightness: u8,
) -> Vec<ResolvedTarget> {
    let mut out = Vec::new();
    for (index, id) in light_ids.iter().enumerate() {
        let Some(mapping) = mappings.iter().find(|m| m.light_id == *id) else {
            continue;
        };
        if mapping.sector_id < 0 {
            continue;
        }
        let percent = if mapping.override_brightness {
            mapping.brightness
        } else {
            global_brightness
        };
        out.push(ResolvedTarget {
            index,
            sector_id: mapping.sector_id as usize,
            brightness_cap: brightness_cap(percent),
        });
    }
    out
}

//! 24-bit RGB color with hex parsing and linear interpolation.

use crate::codec;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// A 24-bit RGB color as streamed to the lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Black (all channels zero)
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Construct from channel values
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a 6-digit hex color, with or without a leading `#`.
    pub fn from_hex(input: &str) -> Result<Self> {
        let digits = input.strip_prefix('#').unwrap_or(input);
        let bytes = codec::hex_to_bytes(digits)?;
        if bytes.len() != 3 {
            return Err(CoreError::Encoding(format!(
                "expected 6 hex digits for a color, got {:?}",
                input
            )));
        }
        Ok(Self::new(bytes[0], bytes[1], bytes[2]))
    }

    /// Format as an upper-case 6-digit hex string (no `#`).
    pub fn to_hex(self) -> String {
        codec::bytes_to_hex(&[self.r, self.g, self.b])
    }

    /// Intrinsic brightness of the color on a 0-255 scale (HSB value, i.e.
    /// the maximum channel).
    pub fn brightness(self) -> u8 {
        self.r.max(self.g).max(self.b)
    }

    /// Linearly interpolate toward `target` by fraction `f` in `[0, 1]`,
    /// per channel with rounding.
    pub fn lerp(self, target: Rgb, f: f64) -> Rgb {
        Rgb {
            r: lerp_channel(self.r, target.r, f),
            g: lerp_channel(self.g, target.g, f),
            b: lerp_channel(self.b, target.b, f),
        }
    }

    /// Scale all channels by `brightness / 255`.
    ///
    /// This is how a brightness cap is applied to the streamed color: the
    /// entertainment channel carries RGB only, so dimming rescales the
    /// channels.
    pub fn scaled(self, brightness: u8) -> Rgb {
        let scale = |c: u8| -> u8 {
            ((u16::from(c) * u16::from(brightness) + 127) / 255) as u8
        };
        Rgb {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }
}

fn lerp_channel(a: u8, b: u8, f: f64) -> u8 {
    let f = f.clamp(0.0, 1.0);
    (f64::from(a) + (f64::from(b) - f64::from(a)) * f).round() as u8
}

/// Linearly interpolate a brightness value by fraction `f` in `[0, 1]`.
pub fn lerp_brightness(a: u8, b: u8, f: f64) -> u8 {
    lerp_channel(a, b, f)
}

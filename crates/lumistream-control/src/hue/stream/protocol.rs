use lumistream_core::{codec, Rgb};

/// Color and brightness for one streaming channel, as produced by the
/// transition engine.
#[derive(Debug, Clone, Copy)]
pub struct ChannelUpdate {
    pub channel_id: u8,
    pub color: Rgb,
    /// Already-capped brightness on a 0-255 scale
    pub brightness: u8,
}

/// Builds Hue Entertainment streaming messages.
///
/// Format (per official Hue Entertainment API documentation):
/// - 16-byte Header:
///   - 9 bytes: "HueStream" (protocol name)
///   - 2 bytes: Version (0x02, 0x00 for v2.0)
///   - 1 byte:  Sequence number
///   - 2 bytes: Reserved (0x00, 0x00)
///   - 1 byte:  Color space (0x00 = RGB)
///   - 1 byte:  Reserved (0x00)
/// - 36-byte Entertainment Area ID (UUID as ASCII string)
/// - N x 7-byte Light Channel Data:
///   - 1 byte:  Channel ID (0-based index)
///   - 6 bytes: RGB color, 3x 16-bit big-endian
///
/// The channel carries RGB only, so brightness is applied by rescaling the
/// color before widening to 16 bits.
#[derive(Debug, Default)]
pub struct MessageEncoder {
    sequence: u8,
}

impl MessageEncoder {
    pub fn new() -> Self {
        Self { sequence: 0 }
    }

    /// Encode one complete frame for the given entertainment area.
    pub fn encode(&mut self, area_id: &str, updates: &[ChannelUpdate]) -> Vec<u8> {
        // Header (16) + Area ID (36) + channels (7 each)
        let mut buffer = Vec::with_capacity(16 + 36 + updates.len() * 7);

        // ===== 16-byte Header =====
        buffer.extend_from_slice(b"HueStream");
        buffer.extend_from_slice(&[0x02, 0x00]);
        buffer.push(self.sequence);
        self.sequence = self.sequence.wrapping_add(1);
        buffer.extend_from_slice(&[0x00, 0x00]);
        // Color space: RGB
        buffer.push(0x00);
        buffer.push(0x00);

        // ===== 36-byte Entertainment Area ID =====
        // A v2 UUID is exactly 36 ASCII characters; anything else is padded
        // or truncated to keep the frame well-formed.
        buffer.extend_from_slice(&codec::string_byte_pad(area_id, 36));

        // ===== Light Channel Data (7 bytes each) =====
        for update in updates {
            buffer.push(update.channel_id);

            let color = update.color.scaled(update.brightness);
            // Scale 8-bit to 16-bit: val * 257, since 255 * 257 = 65535
            for channel in [color.r, color.g, color.b] {
                let wide = u16::from(channel) * 257;
                buffer.extend_from_slice(&wide.to_be_bytes());
            }
        }

        buffer
    }
}

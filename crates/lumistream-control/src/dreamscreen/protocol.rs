//! Capture-device wire protocol.
//!
//! Packets are framed as
//! `magic (0xFC) | length | group | flags | command upper | command lower |
//! payload | crc`, where `length` counts every byte after itself and the CRC
//! covers every byte before the CRC. Sector-data payloads carry one RGB
//! triplet per sector.

use crate::error::{Result, SyncError};
use lumistream_core::{codec, ColorFrame, CoreError, Rgb};

/// First byte of every capture packet.
pub const PACKET_MAGIC: u8 = 0xFC;

/// Subscription handshake (upper, lower) command bytes.
pub const CMD_SUBSCRIBE: (u8, u8) = (0x01, 0x0C);

/// Sector color data (upper, lower) command bytes.
pub const CMD_SECTOR_DATA: (u8, u8) = (0x03, 0x16);

/// Sectors per capture frame on the wire.
pub const SECTOR_COUNT: usize = 12;

/// CRC-8, polynomial 0x07, zero init, as used on the capture wire.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x07
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// One decoded capture packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub group: u8,
    pub flags: u8,
    pub command_upper: u8,
    pub command_lower: u8,
    pub payload: Vec<u8>,
}

impl Packet {
    /// Serialize with length and CRC filled in.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.payload.len() + 7);
        buf.push(PACKET_MAGIC);
        // Group, flags, two command bytes and the CRC follow the length byte
        // alongside the payload.
        buf.push((self.payload.len() + 5) as u8);
        buf.push(self.group);
        buf.push(self.flags);
        buf.push(self.command_upper);
        buf.push(self.command_lower);
        buf.extend_from_slice(&self.payload);
        buf.push(crc8(&buf));
        buf
    }

    /// Parse and validate one datagram.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < 7 {
            return Err(encoding_err(format!("packet too short: {} bytes", buf.len())));
        }
        if buf[0] != PACKET_MAGIC {
            return Err(encoding_err(format!("bad magic byte 0x{:02X}", buf[0])));
        }
        let declared = buf[1] as usize;
        if declared + 2 != buf.len() {
            return Err(encoding_err(format!(
                "length byte {} does not match {} received bytes",
                declared,
                buf.len()
            )));
        }
        let crc = buf[buf.len() - 1];
        let computed = crc8(&buf[..buf.len() - 1]);
        if crc != computed {
            return Err(encoding_err(format!(
                "CRC mismatch: got 0x{:02X}, computed 0x{:02X}",
                crc, computed
            )));
        }

        let payload = codec::extract_bytes(buf, 6, buf.len() - 1)?.to_vec();
        Ok(Self {
            group: buf[2],
            flags: buf[3],
            command_upper: buf[4],
            command_lower: buf[5],
            payload,
        })
    }

    /// The (upper, lower) command pair.
    pub fn command(&self) -> (u8, u8) {
        (self.command_upper, self.command_lower)
    }
}

fn encoding_err(msg: String) -> SyncError {
    SyncError::Core(CoreError::Encoding(msg))
}

/// Decode a sector-data payload into a complete color frame.
pub fn decode_sector_frame(payload: &[u8]) -> Result<ColorFrame> {
    if payload.len() != SECTOR_COUNT * 3 {
        return Err(encoding_err(format!(
            "sector payload is {} bytes, expected {}",
            payload.len(),
            SECTOR_COUNT * 3
        )));
    }
    let sectors = payload
        .chunks_exact(3)
        .map(|rgb| Rgb::new(rgb[0], rgb[1], rgb[2]))
        .collect();
    Ok(ColorFrame::from_sectors(sectors))
}

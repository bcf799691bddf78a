//! Byte/hex codec for the capture-device wire protocol.
//!
//! The ambient-capture protocol mixes fixed-width ASCII fields, hex-encoded
//! color strings and raw byte ranges inside a single datagram. These helpers
//! convert between those representations and report malformed input as
//! [`CoreError::Encoding`] / [`CoreError::OutOfRange`] instead of panicking,
//! so a bad frame can be discarded and the caller can move on to the next
//! one.

use crate::error::{CoreError, Result};

/// Encode `text` as single-byte characters, truncated or right-zero-padded
/// to exactly `len` bytes.
///
/// Used for fixed-width name/serial fields in device frames.
pub fn string_byte_pad(text: &str, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    for (dst, ch) in out.iter_mut().zip(text.bytes()) {
        *dst = ch;
    }
    out
}

/// Decode a hex string into bytes.
///
/// Fails on odd length or non-hex characters.
pub fn hex_to_bytes(input: &str) -> Result<Vec<u8>> {
    hex::decode(input).map_err(|e| CoreError::Encoding(format!("invalid hex {:?}: {}", input, e)))
}

/// Encode bytes as an upper-case hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Interpret each 2-hex-digit group as one character code and collect the
/// resulting string.
pub fn hex_to_ascii(input: &str) -> Result<String> {
    let bytes = hex_to_bytes(input)?;
    Ok(bytes.iter().map(|&b| char::from(b)).collect())
}

/// Extract the half-open byte range `[start, end)` from `buf`.
///
/// The bounds check is against the remaining buffer from `start`, so a
/// request is valid iff `start <= end <= buf.len()`.
pub fn extract_bytes(buf: &[u8], start: usize, end: usize) -> Result<&[u8]> {
    if start > end || end > buf.len() {
        return Err(CoreError::OutOfRange {
            start,
            end,
            len: buf.len(),
        });
    }
    Ok(&buf[start..end])
}

/// Extract `[start, end)` and render each byte as a character.
pub fn extract_string(buf: &[u8], start: usize, end: usize) -> Result<String> {
    let bytes = extract_bytes(buf, start, end)?;
    Ok(bytes.iter().map(|&b| char::from(b)).collect())
}

/// Extract `[start, end)` widened to integers.
pub fn extract_ints(buf: &[u8], start: usize, end: usize) -> Result<Vec<i32>> {
    let bytes = extract_bytes(buf, start, end)?;
    Ok(bytes.iter().map(|&b| i32::from(b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_byte_pad_truncates() {
        assert_eq!(string_byte_pad("SideKick", 4), b"Side");
    }

    #[test]
    fn test_string_byte_pad_zero_fills() {
        assert_eq!(string_byte_pad("ab", 4), &[b'a', b'b', 0, 0]);
        assert_eq!(string_byte_pad("", 3), &[0, 0, 0]);
    }

    #[test]
    fn test_string_byte_pad_exact_length() {
        let padded = string_byte_pad("lumistream", 16);
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[..10], b"lumistream");
        assert!(padded[10..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_hex_round_trip() {
        for hx in ["FF0080", "00", "DEADBEEF", ""] {
            let bytes = hex_to_bytes(hx).unwrap();
            assert_eq!(bytes_to_hex(&bytes), hx);
        }
        // Case-normalized round trip
        assert_eq!(bytes_to_hex(&hex_to_bytes("deadbeef").unwrap()), "DEADBEEF");
    }

    #[test]
    fn test_hex_rejects_odd_length() {
        assert!(matches!(hex_to_bytes("FFF"), Err(CoreError::Encoding(_))));
    }

    #[test]
    fn test_hex_rejects_non_hex() {
        assert!(matches!(hex_to_bytes("GG"), Err(CoreError::Encoding(_))));
    }

    #[test]
    fn test_hex_to_ascii() {
        assert_eq!(hex_to_ascii("48756553747265616D").unwrap(), "HueStream");
        assert!(hex_to_ascii("4X").is_err());
    }

    #[test]
    fn test_extract_bytes_valid_ranges() {
        let buf = [1u8, 2, 3, 4, 5];
        assert_eq!(extract_bytes(&buf, 1, 4).unwrap(), &[2, 3, 4]);
        assert_eq!(extract_bytes(&buf, 0, 5).unwrap(), &buf[..]);
        // Empty range at the end of the buffer is valid
        assert_eq!(extract_bytes(&buf, 5, 5).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_extract_bytes_rejects_reversed_range() {
        let buf = [1u8, 2, 3];
        assert_eq!(
            extract_bytes(&buf, 2, 1),
            Err(CoreError::OutOfRange {
                start: 2,
                end: 1,
                len: 3
            })
        );
    }

    #[test]
    fn test_extract_bytes_rejects_past_end() {
        // A short range near the end of a longer buffer must still be
        // validated against the bytes remaining from `start`, not the total
        // buffer length.
        let buf = [0u8; 8];
        assert!(extract_bytes(&buf, 6, 9).is_err());
        assert!(extract_bytes(&buf, 6, 8).is_ok());
    }

    #[test]
    fn test_extract_string_and_ints() {
        let buf = b"..ABC..";
        assert_eq!(extract_string(buf, 2, 5).unwrap(), "ABC");
        assert_eq!(extract_ints(buf, 2, 5).unwrap(), vec![65, 66, 67]);
    }
}

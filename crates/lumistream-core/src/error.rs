//! Error types for the core engine
use thiserror::Error;

/// Core engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Malformed hex or ASCII input
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Byte-range extraction past buffer bounds
    #[error("range {start}..{end} out of bounds for {len}-byte buffer")]
    OutOfRange {
        /// Requested start offset
        start: usize,
        /// Requested end offset (exclusive)
        end: usize,
        /// Length of the buffer the range was applied to
        len: usize,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

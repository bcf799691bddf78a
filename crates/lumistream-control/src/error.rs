//! Error types for the synchronization pipeline
use crate::hue::api::error::HueError;
use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum SyncError {
    /// Frame decode failure (malformed hex, range out of bounds)
    #[error("decode error: {0}")]
    Core(#[from] lumistream_core::CoreError),

    /// Bridge REST API failure
    #[error("bridge API error: {0}")]
    Hue(#[from] HueError),

    /// Bridge unreachable or no entertainment groups available
    #[error("connection error: {0}")]
    Connection(String),

    /// Authorization rejected (link button not pressed)
    #[error("pairing error: {0}")]
    Pairing(String),

    /// Group or light resolution failed while setting up the stream
    #[error("stream setup error: {0}")]
    StreamSetup(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration load/save error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, SyncError>;

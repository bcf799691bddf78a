//! LumiStream Control - Capture-to-Bridge Synchronization
//!
//! This crate wires the pure engine from `lumistream-core` to the outside
//! world:
//! - **Hue**: bridge REST API (pairing, discovery, entertainment groups) and
//!   the DTLS entertainment stream (wire protocol, session lifecycle,
//!   streaming loop)
//! - **DreamScreen**: UDP listener decoding capture-device frames into the
//!   shared color frame
//! - **Sync**: the orchestrator tying listener and stream together with
//!   idempotent start/stop
//!
//! ## Modules
//!
//! - [`config`] - Typed daemon configuration (TOML)
//! - [`dreamscreen`] - Capture-device protocol and listener
//! - [`error`] - Error types
//! - [`hue`] - Bridge API and entertainment streaming
//! - [`sync`] - Sync orchestrator

#![allow(missing_docs)]

/// Typed configuration
pub mod config;
/// Capture-device side
pub mod dreamscreen;
/// Error types
pub mod error;
/// Bridge side
pub mod hue;
/// Pipeline orchestration
pub mod sync;

pub use config::LumiConfig;
pub use error::{Result, SyncError};
pub use sync::SyncOrchestrator;

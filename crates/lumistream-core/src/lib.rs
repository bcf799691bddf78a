//! LumiStream Core - Color Sync Domain Model
//!
//! This crate contains the pure, I/O-free half of the color
//! synchronization engine:
//! - Wire-level byte/hex codec for the capture-device protocol
//! - RGB color type with hex parsing and linear interpolation
//! - Light-to-sector mapping with per-light brightness caps
//! - Time-based transition engine (blend / fade easing)
//! - Tear-free shared color frame state
//!
//! Networked integration (bridge REST/DTLS, the capture listener and the
//! orchestrator) lives in `lumistream-control`.

#![warn(missing_docs)]

/// RGB color type and interpolation
pub mod color;
/// Byte/hex wire codec
pub mod codec;
/// Error types
pub mod error;
/// Color frame state shared between listener and streaming loop
pub mod frame;
/// Light-to-sector mapping
pub mod mapping;
/// Per-light eased transitions
pub mod transition;

pub use color::Rgb;
pub use error::{CoreError, Result};
pub use frame::{ColorFrame, SharedFrame};
pub use mapping::{resolve_targets, LightMapping, ResolvedTarget};
pub use transition::{
    EasingMode, LightChannelState, SceneContext, StepOutput, TransitionEngine, TransitionState,
};

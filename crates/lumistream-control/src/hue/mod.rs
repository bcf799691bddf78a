//! Philips Hue bridge integration: REST API and entertainment streaming.

pub mod api;
pub mod models;
pub mod stream;

//! Bridge REST API: pairing, discovery and entertainment groups.

pub mod client;
pub mod discovery;
pub mod error;
pub mod groups;

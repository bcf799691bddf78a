//! Capture-device side: wire protocol and the UDP listener that feeds the
//! shared color frame.

pub mod device;
pub mod listener;
pub mod protocol;

pub use device::DeviceKind;
pub use listener::CaptureListener;
pub use protocol::{decode_sector_frame, Packet};

//! Entertainment streaming: wire protocol, DTLS transport and the
//! streaming loop with its session lifecycle.

pub mod dtls;
pub mod manager;
pub mod protocol;

pub use dtls::HueStreamer;
pub use manager::{run_stream_loop, BridgeConnection, StreamSession, StreamSink};
pub use protocol::{ChannelUpdate, MessageEncoder};

//! UDP listener turning capture datagrams into shared color frames.

use crate::config::CaptureConfig;
use crate::dreamscreen::device::DeviceKind;
use crate::dreamscreen::protocol::{decode_sector_frame, Packet, CMD_SECTOR_DATA, CMD_SUBSCRIBE};
use crate::error::Result;
use lumistream_core::SharedFrame;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

/// Poll interval for the cancel flag while no datagrams arrive.
const RECV_TIMEOUT: Duration = Duration::from_millis(250);

/// Group address meaning "every receiver".
const BROADCAST_GROUP: u8 = 0xFF;

/// Bound capture listener. Feeds decoded frames into a [`SharedFrame`] and
/// answers subscription probes so the capture source keeps sending.
pub struct CaptureListener {
    socket: UdpSocket,
    device: DeviceKind,
    group: u8,
}

impl CaptureListener {
    /// Bind the listener socket.
    pub async fn bind(config: &CaptureConfig) -> Result<Self> {
        let socket = UdpSocket::bind(&config.listen_address).await?;
        info!("Capture listener bound to {}", socket.local_addr()?);
        Ok(Self {
            socket,
            device: config.device_kind,
            group: config.group_number,
        })
    }

    /// Actual bound address, useful when the port was chosen by the OS.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive until cancelled. Malformed datagrams are logged and skipped;
    /// the listener itself only stops on cancellation or a socket failure.
    pub async fn run(self, frame: Arc<SharedFrame>, cancel: Arc<AtomicBool>) -> Result<()> {
        let mut buf = [0u8; 512];
        while !cancel.load(Ordering::Relaxed) {
            let received = match tokio::time::timeout(RECV_TIMEOUT, self.socket.recv_from(&mut buf))
                .await
            {
                Err(_) => continue, // timeout, re-check the cancel flag
                Ok(result) => result,
            };
            let (len, peer) = received?;

            let packet = match Packet::decode(&buf[..len]) {
                Ok(packet) => packet,
                Err(e) => {
                    warn!("Dropping malformed capture datagram from {}: {}", peer, e);
                    continue;
                }
            };

            match packet.command() {
                CMD_SECTOR_DATA => {
                    if packet.group != self.group && packet.group != BROADCAST_GROUP {
                        continue;
                    }
                    match decode_sector_frame(&packet.payload) {
                        Ok(colors) => frame.publish(colors),
                        Err(e) => warn!("Dropping sector frame from {}: {}", peer, e),
                    }
                }
                CMD_SUBSCRIBE => {
                    let ack = self.device.subscription_ack(self.group);
                    if let Err(e) = self.socket.send_to(&ack.encode(), peer).await {
                        warn!("Subscription ack to {} failed: {}", peer, e);
                    }
                }
                other => {
                    debug!("Ignoring capture command {:02X?} from {}", other, peer);
                }
            }
        }
        info!("Capture listener stopped");
        Ok(())
    }
}

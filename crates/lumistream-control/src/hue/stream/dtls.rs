use crate::error::SyncError;
use crate::hue::stream::manager::StreamSink;
use openssl::ssl::{Ssl, SslContext, SslMethod};
use std::io::{self, Read, Write};
use std::net::UdpSocket;
use std::time::Duration;
use tracing::{debug, info};

/// UDP port of the bridge's entertainment endpoint.
const ENTERTAINMENT_PORT: u16 = 2100;

/// Handshake/read timeout; the bridge answers within milliseconds on a LAN.
const SOCKET_TIMEOUT: Duration = Duration::from_secs(5);

/// Connected UDP socket presented as a byte stream for the DTLS layer.
#[derive(Debug)]
struct UdpChannel {
    socket: UdpSocket,
}

impl Read for UdpChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.socket.recv(buf)
    }
}

impl Write for UdpChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.socket.send(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// DTLS-PSK connection to the bridge's entertainment endpoint.
///
/// The PSK identity is the hue-application-id (from `/auth/v1`) and the key
/// is the client key handed out at pairing, hex-decoded. The bridge only
/// accepts `PSK-AES128-GCM-SHA256`.
pub struct HueStreamer {
    stream: openssl::ssl::SslStream<UdpChannel>,
}

impl HueStreamer {
    /// Open the DTLS session. The bridge must already have streaming
    /// activated for the target entertainment configuration, otherwise it
    /// refuses the handshake.
    pub fn connect(ip: &str, application_id: &str, client_key: &str) -> Result<Self, SyncError> {
        let psk = hex::decode(client_key)
            .map_err(|_| SyncError::Connection("client key is not valid hex".into()))?;
        let identity = application_id.as_bytes().to_vec();

        let mut builder = SslContext::builder(SslMethod::dtls())
            .map_err(|e| SyncError::Connection(format!("DTLS context: {}", e)))?;
        builder
            .set_cipher_list("PSK-AES128-GCM-SHA256")
            .map_err(|e| SyncError::Connection(format!("DTLS cipher: {}", e)))?;
        builder.set_psk_client_callback(move |_ssl, _hint, identity_buf, psk_buf| {
            if identity.len() + 1 > identity_buf.len() || psk.len() > psk_buf.len() {
                return Ok(0);
            }
            identity_buf[..identity.len()].copy_from_slice(&identity);
            identity_buf[identity.len()] = 0;
            psk_buf[..psk.len()].copy_from_slice(&psk);
            Ok(psk.len())
        });
        let context = builder.build();

        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect((ip, ENTERTAINMENT_PORT))?;
        socket.set_read_timeout(Some(SOCKET_TIMEOUT))?;
        socket.set_write_timeout(Some(SOCKET_TIMEOUT))?;
        debug!("Starting DTLS handshake with {}:{}", ip, ENTERTAINMENT_PORT);

        let ssl = Ssl::new(&context)
            .map_err(|e| SyncError::Connection(format!("DTLS session: {}", e)))?;
        let stream = ssl
            .connect(UdpChannel { socket })
            .map_err(|e| SyncError::Connection(format!("DTLS handshake failed: {}", e)))?;

        info!("Entertainment stream connected to {}", ip);
        Ok(Self { stream })
    }
}

impl StreamSink for HueStreamer {
    fn send_frame(&mut self, payload: &[u8]) -> io::Result<()> {
        self.stream.write_all(payload)
    }
}

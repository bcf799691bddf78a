//! Streaming session lifecycle and the frame loop.
//!
//! `BridgeConnection` owns the REST side of a session (group selection,
//! stream activation); the DTLS sink lives in the `StreamSession` it hands
//! out. `run_stream_loop` drives the sink and returns it on exit, so the
//! caller can tell the bridge to stop streaming before the socket is
//! released.

use crate::error::SyncError;
use crate::hue::api::groups::{self, GroupInfo};
use crate::hue::models::{BridgeConfig, LightNode};
use crate::hue::stream::dtls::HueStreamer;
use crate::hue::stream::protocol::{ChannelUpdate, MessageEncoder};
use lumistream_core::{
    resolve_targets, LightChannelState, LightMapping, SharedFrame, TransitionEngine,
};
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Entertainment frames are paced at 50 Hz.
const FRAME_INTERVAL: Duration = Duration::from_millis(20);

/// Where encoded entertainment frames go.
///
/// The production implementation is [`HueStreamer`]; tests substitute an
/// in-memory sink.
pub trait StreamSink: Send {
    fn send_frame(&mut self, payload: &[u8]) -> io::Result<()>;
}

/// An established streaming session: the selected area, its channel layout
/// and the connected DTLS sink.
pub struct StreamSession {
    /// v2 entertainment configuration UUID, also the wire-level area ID
    pub area_id: String,
    /// Channels of the selected group
    pub lights: Vec<LightNode>,
    /// Connected DTLS transport
    pub sink: HueStreamer,
}

/// REST-side lifecycle of one bridge streaming session.
pub struct BridgeConnection {
    config: BridgeConfig,
    /// Group with streaming currently activated on the bridge, if any
    active_group: Option<String>,
    disposed: bool,
}

impl BridgeConnection {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            active_group: None,
            disposed: false,
        }
    }

    /// Whether a group currently has streaming activated.
    pub fn is_streaming(&self) -> bool {
        self.active_group.is_some()
    }

    /// Select an entertainment group, activate streaming on it and open the
    /// DTLS transport.
    ///
    /// If the configured group no longer exists the bridge's first group is
    /// used instead; only a bridge without any entertainment configuration
    /// fails. A DTLS failure deactivates streaming again before returning.
    pub async fn enable_streaming(
        &mut self,
        mappings: &[LightMapping],
    ) -> Result<StreamSession, SyncError> {
        if self.disposed {
            return Err(SyncError::Connection("connection is disposed".into()));
        }
        if self.active_group.is_some() {
            return Err(SyncError::StreamSetup(
                "streaming is already active".into(),
            ));
        }

        let all_groups = groups::get_entertainment_groups(&self.config).await?;
        let group = groups::select_group(&self.config.entertainment_group_id, all_groups)
            .ok_or_else(|| {
                SyncError::Connection("bridge has no entertainment configurations".into())
            })?;

        let mapped = mapped_lights(&group, mappings);
        if mapped.is_empty() {
            return Err(SyncError::StreamSetup(format!(
                "no lights in group '{}' are mapped to a sector",
                group.name
            )));
        }
        info!(
            "Streaming to group '{}' with {} of {} channels mapped",
            group.name,
            mapped.len(),
            group.lights.len()
        );

        groups::set_stream_active(&self.config, &group.id, true).await?;

        let sink = match HueStreamer::connect(
            &self.config.ip,
            &self.config.application_id,
            &self.config.client_key,
        ) {
            Ok(sink) => sink,
            Err(e) => {
                // Leave the bridge in a clean state before reporting.
                if let Err(stop_err) =
                    groups::set_stream_active(&self.config, &group.id, false).await
                {
                    warn!("Could not deactivate streaming after failed connect: {}", stop_err);
                }
                return Err(e);
            }
        };

        self.active_group = Some(group.id.clone());
        Ok(StreamSession {
            area_id: group.id,
            lights: mapped,
            sink,
        })
    }

    /// Tell the bridge to stop streaming. Safe to call when no session is
    /// active.
    pub async fn disable_streaming(&mut self) -> Result<(), SyncError> {
        let Some(group_id) = self.active_group.take() else {
            return Ok(());
        };
        debug!("Deactivating streaming for group {}", group_id);
        groups::set_stream_active(&self.config, &group_id, false).await?;
        Ok(())
    }

    /// Release the connection. Stops any active stream first; calling this
    /// more than once is a no-op.
    pub async fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Err(e) = self.disable_streaming().await {
            warn!("Stream deactivation during dispose failed: {}", e);
        }
        self.disposed = true;
    }
}

/// Channels of the group whose light is mapped to a real sector.
fn mapped_lights(group: &GroupInfo, mappings: &[LightMapping]) -> Vec<LightNode> {
    group
        .lights
        .iter()
        .filter(|light| {
            mappings
                .iter()
                .any(|m| m.light_id == light.id && m.sector_id >= 0)
        })
        .cloned()
        .collect()
}

/// Drive the streaming loop until cancelled or the sink fails.
///
/// Every tick takes an atomic snapshot of the shared frame, re-reads the
/// global brightness, advances each mapped light through the transition
/// engine and sends one entertainment message. The sink is returned so the
/// caller can stop streaming bridge-side before dropping the transport.
pub async fn run_stream_loop<S: StreamSink>(
    mut sink: S,
    area_id: String,
    lights: Vec<LightNode>,
    mappings: Vec<LightMapping>,
    frame: Arc<SharedFrame>,
    brightness: Arc<AtomicU8>,
    engine: TransitionEngine,
    cancel: Arc<AtomicBool>,
) -> S {
    let light_ids: Vec<&str> = lights.iter().map(|l| l.id.as_str()).collect();
    let mut states: HashMap<u8, LightChannelState> = HashMap::new();
    let mut encoder = MessageEncoder::new();

    info!("Streaming loop started for area {}", area_id);
    while !cancel.load(Ordering::Relaxed) {
        let tick_started = Instant::now();
        let snapshot = frame.snapshot();
        let global = brightness.load(Ordering::Relaxed);
        let targets = resolve_targets(&light_ids, &mappings, global);

        let mut updates = Vec::with_capacity(targets.len());
        for target in &targets {
            let light = &lights[target.index];
            let Some(color) = snapshot.sector(target.sector_id) else {
                continue;
            };
            let state = states.entry(light.channel_id).or_default();
            let out = engine.step(
                state,
                color,
                color.brightness(),
                target.brightness_cap,
                tick_started,
            );
            updates.push(ChannelUpdate {
                channel_id: light.channel_id,
                color: out.color,
                brightness: out.brightness,
            });
        }

        if !updates.is_empty() {
            let payload = encoder.encode(&area_id, &updates);
            if let Err(e) = sink.send_frame(&payload) {
                error!("Stream send failed, stopping loop: {}", e);
                break;
            }
        }

        tokio::time::sleep(FRAME_INTERVAL.saturating_sub(tick_started.elapsed())).await;
    }
    info!("Streaming loop stopped");
    sink
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumistream_core::{ColorFrame, Rgb};

    const AREA: &str = "1a8d99cc-967b-44f2-9202-43f976c0fa6b";

    struct RecordingSink {
        frames: Vec<Vec<u8>>,
    }

    impl StreamSink for RecordingSink {
        fn send_frame(&mut self, payload: &[u8]) -> io::Result<()> {
            self.frames.push(payload.to_vec());
            Ok(())
        }
    }

    struct FailingSink {
        attempts: usize,
    }

    impl StreamSink for FailingSink {
        fn send_frame(&mut self, _payload: &[u8]) -> io::Result<()> {
            self.attempts += 1;
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "bridge gone"))
        }
    }

    fn light(id: &str, channel_id: u8) -> LightNode {
        LightNode {
            id: id.to_string(),
            channel_id,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    fn mapping(id: &str, sector: i32) -> LightMapping {
        LightMapping {
            light_id: id.to_string(),
            sector_id: sector,
            override_brightness: false,
            brightness: 100,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_streams_only_mapped_lights() {
        let frame = Arc::new(SharedFrame::new(12));
        frame.publish(ColorFrame::from_sectors(vec![Rgb::new(255, 0, 0); 12]));
        let brightness = Arc::new(AtomicU8::new(100));
        let cancel = Arc::new(AtomicBool::new(false));

        let handle = tokio::spawn(run_stream_loop(
            RecordingSink { frames: Vec::new() },
            AREA.to_string(),
            vec![light("a", 0), light("b", 1)],
            vec![mapping("a", 0)], // "b" has no mapping and must not be sent
            frame,
            brightness,
            TransitionEngine::new(None),
            Arc::clone(&cancel),
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.store(true, Ordering::Relaxed);
        let sink = handle.await.unwrap();

        assert!(!sink.frames.is_empty());
        for msg in &sink.frames {
            // Exactly one 7-byte channel block, for channel 0.
            assert_eq!(msg.len(), 16 + 36 + 7);
            assert_eq!(msg[52], 0);
            // Red at full brightness, widened to 16 bits.
            assert_eq!(&msg[53..55], &(255u16 * 257).to_be_bytes());
            assert_eq!(&msg[55..57], &0u16.to_be_bytes());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_applies_global_brightness() {
        let frame = Arc::new(SharedFrame::new(1));
        frame.publish(ColorFrame::from_sectors(vec![Rgb::new(255, 255, 255)]));
        // 50% global brightness caps the output at 127.
        let brightness = Arc::new(AtomicU8::new(50));
        let cancel = Arc::new(AtomicBool::new(false));

        let handle = tokio::spawn(run_stream_loop(
            RecordingSink { frames: Vec::new() },
            AREA.to_string(),
            vec![light("a", 4)],
            vec![mapping("a", 0)],
            frame,
            brightness,
            TransitionEngine::new(None),
            Arc::clone(&cancel),
        ));

        tokio::time::sleep(Duration::from_millis(40)).await;
        cancel.store(true, Ordering::Relaxed);
        let sink = handle.await.unwrap();

        let msg = sink.frames.first().unwrap();
        assert_eq!(msg[52], 4);
        assert_eq!(&msg[53..55], &(127u16 * 257).to_be_bytes());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_stops_when_sink_fails() {
        let frame = Arc::new(SharedFrame::new(1));
        frame.publish(ColorFrame::from_sectors(vec![Rgb::new(0, 255, 0)]));
        let cancel = Arc::new(AtomicBool::new(false));

        // The loop must exit on its own without the cancel flag being set.
        let sink = run_stream_loop(
            FailingSink { attempts: 0 },
            AREA.to_string(),
            vec![light("a", 0)],
            vec![mapping("a", 0)],
            frame,
            Arc::new(AtomicU8::new(100)),
            TransitionEngine::new(None),
            cancel,
        )
        .await;

        assert_eq!(sink.attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_exits_immediately_when_cancelled() {
        let cancel = Arc::new(AtomicBool::new(true));
        let sink = run_stream_loop(
            RecordingSink { frames: Vec::new() },
            AREA.to_string(),
            vec![light("a", 0)],
            vec![mapping("a", 0)],
            Arc::new(SharedFrame::new(1)),
            Arc::new(AtomicU8::new(100)),
            TransitionEngine::new(None),
            cancel,
        )
        .await;

        assert!(sink.frames.is_empty());
    }

    #[test]
    fn test_mapped_lights_filters_unmapped_channels() {
        let group = GroupInfo {
            id: AREA.to_string(),
            name: "TV".to_string(),
            lights: vec![light("a", 0), light("b", 1), light("c", 2)],
        };
        let mappings = vec![mapping("a", 0), mapping("b", -1)];

        let mapped = mapped_lights(&group, &mappings);
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].id, "a");
    }
}

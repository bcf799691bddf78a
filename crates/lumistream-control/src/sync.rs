//! Pipeline orchestration.
//!
//! [`SyncOrchestrator`] owns every moving part of a sync session: the capture
//! listener, the shared frame, the bridge connection and the streaming loop.
//! Cancellation is a plain flag owned here and handed to both tasks; there is
//! no process-global state, so independent orchestrators can coexist (and
//! tests can run in parallel).

use crate::config::LumiConfig;
use crate::dreamscreen::CaptureListener;
use crate::error::{Result, SyncError};
use crate::hue::stream::{run_stream_loop, BridgeConnection, HueStreamer};
use lumistream_core::{SharedFrame, TransitionEngine};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Handles of one active sync session.
struct RunningSync {
    cancel: Arc<AtomicBool>,
    listener: JoinHandle<Result<()>>,
    stream: JoinHandle<HueStreamer>,
}

/// Drives capture frames onto the bridge.
pub struct SyncOrchestrator {
    config: LumiConfig,
    connection: BridgeConnection,
    /// Global brightness percentage, adjustable while streaming
    brightness: Arc<AtomicU8>,
    running: Option<RunningSync>,
}

impl SyncOrchestrator {
    pub fn new(config: LumiConfig) -> Self {
        let connection = BridgeConnection::new(config.bridge.clone());
        let brightness = Arc::new(AtomicU8::new(config.sync.brightness.min(100)));
        Self {
            config,
            connection,
            brightness,
            running: None,
        }
    }

    /// Whether a sync session is currently active.
    pub fn is_enabled(&self) -> bool {
        self.running.is_some()
    }

    /// Adjust global brightness (0-100). Takes effect on the next frame.
    pub fn set_brightness(&self, percent: u8) {
        self.brightness.store(percent.min(100), Ordering::Relaxed);
    }

    /// Start syncing. Calling this while already running is a no-op; a setup
    /// failure leaves the system fully stopped.
    pub async fn start_sync(&mut self) -> Result<()> {
        if self.running.is_some() {
            info!("Sync already running");
            return Ok(());
        }

        // Bind the listener before touching the bridge so a bad bind leaves
        // nothing to roll back remotely.
        let listener = CaptureListener::bind(&self.config.capture).await?;
        let session = self.connection.enable_streaming(&self.config.lights).await?;

        let frame = Arc::new(SharedFrame::new(self.config.sync.sector_count));
        let cancel = Arc::new(AtomicBool::new(false));

        let listener_task =
            tokio::spawn(listener.run(Arc::clone(&frame), Arc::clone(&cancel)));
        let stream_task = tokio::spawn(run_stream_loop(
            session.sink,
            session.area_id,
            session.lights,
            self.config.lights.clone(),
            frame,
            Arc::clone(&self.brightness),
            TransitionEngine::new(self.config.scene),
            Arc::clone(&cancel),
        ));

        self.running = Some(RunningSync {
            cancel,
            listener: listener_task,
            stream: stream_task,
        });
        info!("Sync started");
        Ok(())
    }

    /// Stop syncing. Calling this while already stopped is a no-op.
    ///
    /// The streaming loop is joined first so no frame is in flight, then the
    /// bridge is told to stop, and only then is the DTLS transport dropped.
    pub async fn stop_sync(&mut self) -> Result<()> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        running.cancel.store(true, Ordering::Relaxed);

        let sink = running
            .stream
            .await
            .map_err(|e| SyncError::Connection(format!("streaming task panicked: {}", e)))?;
        self.connection.disable_streaming().await?;
        drop(sink);

        match running.listener.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Capture listener exited with error: {}", e),
            Err(e) => warn!("Capture listener task panicked: {}", e),
        }
        info!("Sync stopped");
        Ok(())
    }

    /// Release everything. Stops an active session first; safe to call more
    /// than once.
    pub async fn dispose(&mut self) -> Result<()> {
        self.stop_sync().await?;
        self.connection.dispose().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CaptureConfig, SyncSettings};
    use crate::dreamscreen::DeviceKind;
    use crate::hue::models::BridgeConfig;

    fn test_config() -> LumiConfig {
        LumiConfig {
            bridge: BridgeConfig::default(),
            capture: CaptureConfig {
                listen_address: "127.0.0.1:0".to_string(),
                device_kind: DeviceKind::SideKick,
                group_number: 0,
            },
            sync: SyncSettings::default(),
            scene: None,
            lights: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let mut orchestrator = SyncOrchestrator::new(test_config());
        assert!(!orchestrator.is_enabled());

        orchestrator.stop_sync().await.unwrap();
        orchestrator.stop_sync().await.unwrap();
        assert!(!orchestrator.is_enabled());
    }

    #[tokio::test]
    async fn test_dispose_is_idempotent() {
        let mut orchestrator = SyncOrchestrator::new(test_config());
        orchestrator.dispose().await.unwrap();
        orchestrator.dispose().await.unwrap();
        assert!(!orchestrator.is_enabled());
    }

    #[test]
    fn test_brightness_clamped_to_percentage() {
        let orchestrator = SyncOrchestrator::new(test_config());
        orchestrator.set_brightness(250);
        assert_eq!(orchestrator.brightness.load(Ordering::Relaxed), 100);

        orchestrator.set_brightness(40);
        assert_eq!(orchestrator.brightness.load(Ordering::Relaxed), 40);
    }
}

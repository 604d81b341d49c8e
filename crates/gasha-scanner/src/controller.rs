//! Scan controller: one resolution callback for camera scans and manual entry.

use std::sync::Arc;

use gasha_core::Barcode;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::adapter::{DecodeEvent, DecoderAdapter};
use crate::camera::{CameraUnavailable, PreviewSurface};

const STREAM_ENDED_MESSAGE: &str = "The camera stopped unexpectedly. Please try again.";

/// Scanning state exposed to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    RequestingCamera,
    Scanning,
    /// Recoverable failure with a user-facing message.
    Error(String),
}

impl ScanState {
    /// Scanning is in flight; new start requests are ignored.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::RequestingCamera | Self::Scanning)
    }

    /// Manual entry is available in every state except while the camera
    /// permission prompt is up.
    #[must_use]
    pub fn manual_entry_offered(&self) -> bool {
        !matches!(self, Self::RequestingCamera)
    }
}

pub type ResolveCallback = Arc<dyn Fn(Barcode) + Send + Sync>;

pub struct ScanController {
    adapter: Mutex<DecoderAdapter>,
    state: Arc<watch::Sender<ScanState>>,
    on_resolved: ResolveCallback,
    forwarder: Mutex<Option<JoinHandle<()>>>,
}

impl ScanController {
    pub fn new(adapter: DecoderAdapter, on_resolved: ResolveCallback) -> Self {
        let (state, _) = watch::channel(ScanState::Idle);
        Self {
            adapter: Mutex::new(adapter),
            state: Arc::new(state),
            on_resolved,
            forwarder: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state.subscribe()
    }

    /// Starts a camera scan unless one is already requesting or running.
    ///
    /// A decoded barcode is forwarded to the resolve callback and the state
    /// returns to [`ScanState::Idle`].
    ///
    /// # Errors
    ///
    /// Returns [`CameraUnavailable`] when the camera cannot be acquired; the
    /// state moves to [`ScanState::Error`] and manual entry stays available.
    pub async fn start_scanning(
        &self,
        surface: Arc<dyn PreviewSurface>,
    ) -> Result<(), CameraUnavailable> {
        let claimed = self.state.send_if_modified(|state| {
            if state.is_busy() {
                return false;
            }
            *state = ScanState::RequestingCamera;
            true
        });
        if !claimed {
            debug!("scan already in progress; ignoring start request");
            return Ok(());
        }

        // Hold the adapter across the state update so a concurrent stop
        // cannot interleave between acquiring the camera and `Scanning`.
        let mut adapter = self.adapter.lock().await;
        let mut events = match adapter.start(surface).await {
            Ok(events) => events,
            Err(e) => {
                self.state
                    .send_replace(ScanState::Error(e.user_message().to_owned()));
                return Err(e);
            }
        };
        self.state.send_replace(ScanState::Scanning);

        let state = Arc::clone(&self.state);
        let on_resolved = Arc::clone(&self.on_resolved);
        let forwarder = tokio::spawn(async move {
            match events.next_event().await {
                Some(DecodeEvent::Decoded(result)) => {
                    state.send_replace(ScanState::Idle);
                    match Barcode::parse(&result.text) {
                        Ok(barcode) => {
                            info!(%barcode, "barcode resolved from camera");
                            on_resolved(barcode);
                        }
                        Err(_) => warn!("decoder returned a blank payload; ignoring"),
                    }
                }
                Some(DecodeEvent::StreamEnded) => {
                    state.send_replace(ScanState::Error(STREAM_ENDED_MESSAGE.to_owned()));
                }
                // Cancelled by stop or teardown; whoever cancelled owns the state.
                None => {}
            }
        });

        if let Some(previous) = self.forwarder.lock().await.replace(forwarder) {
            previous.abort();
        }
        drop(adapter);
        Ok(())
    }

    /// Stops any running scan and returns to [`ScanState::Idle`].
    pub async fn stop_scanning(&self) {
        let mut adapter = self.adapter.lock().await;
        adapter.stop().await;
        if let Some(forwarder) = self.forwarder.lock().await.take() {
            // The adapter is stopped, so the forwarder sees the channel close.
            let _ = forwarder.await;
        }
        self.state.send_replace(ScanState::Idle);
    }

    /// Waits until the current scan has resolved, failed or been stopped.
    /// Returns at once when no scan was started.
    pub async fn finished(&self) {
        let forwarder = self.forwarder.lock().await.take();
        if let Some(forwarder) = forwarder {
            if let Err(e) = forwarder.await {
                warn!(error = %e, "scan forwarder did not finish cleanly");
            }
        }
    }

    /// Resolves a manually typed barcode.
    ///
    /// Returns `false`, without invoking the callback, when `input` is empty
    /// or whitespace-only. A running scan is stopped before resolving.
    pub async fn submit_manual(&self, input: &str) -> bool {
        let Ok(barcode) = Barcode::parse(input) else {
            debug!("ignoring blank manual entry");
            return false;
        };
        if self.state().is_busy() {
            self.stop_scanning().await;
        }
        info!(%barcode, "barcode resolved from manual entry");
        (self.on_resolved)(barcode);
        true
    }
}

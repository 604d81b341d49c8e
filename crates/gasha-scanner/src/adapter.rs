//! Decoder adapter: camera stream lifecycle plus the continuous decode loop.
//!
//! A scan session owns exactly one camera stream and one decoder. The session
//! resources are released on every exit path: first successful decode,
//! explicit [`DecoderAdapter::stop`], the stream ending on its own, the event
//! consumer cancelling, and the adapter being dropped.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::camera::{
    Camera, CameraUnavailable, CaptureConstraints, Frame, MediaStream, PreviewSurface,
};
use crate::decoder::{BarcodeDecoder, DecodeAttempt, DecodeHints, DecodedBarcode, DecoderFactory};

/// Events pushed to the consumer of a scan session.
///
/// A session emits at most one event and then ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    Decoded(DecodedBarcode),
    /// The camera stream stopped delivering frames before anything decoded.
    StreamEnded,
}

/// Push-based stream of [`DecodeEvent`]s for one scan session.
///
/// Dropping it, or calling [`DecodeEvents::cancel`], ends the session and
/// releases the camera.
pub struct DecodeEvents {
    rx: mpsc::Receiver<DecodeEvent>,
    cancel: CancellationToken,
}

impl DecodeEvents {
    pub async fn next_event(&mut self) -> Option<DecodeEvent> {
        self.rx.recv().await
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Stream for DecodeEvents {
    type Item = DecodeEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for DecodeEvents {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct ActiveSession {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Camera stream, decoder and preview of one session.
///
/// Released exactly once, either explicitly or on drop. The decoder is
/// `None` only while a frame is being decoded on the blocking pool, or after
/// that task panicked.
struct SessionResources {
    stream: Box<dyn MediaStream>,
    decoder: Option<Box<dyn BarcodeDecoder>>,
    surface: Arc<dyn PreviewSurface>,
    released: bool,
}

impl SessionResources {
    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.reset();
        }
        self.stream.stop();
        self.surface.detach();
        debug!(stream = self.stream.label(), "scan session resources released");
    }
}

impl Drop for SessionResources {
    fn drop(&mut self) {
        self.release();
    }
}

/// Wraps the camera and decoder capabilities behind a start/stop contract.
pub struct DecoderAdapter {
    camera: Arc<dyn Camera>,
    decoders: Arc<dyn DecoderFactory>,
    constraints: CaptureConstraints,
    hints: DecodeHints,
    session: Option<ActiveSession>,
}

impl DecoderAdapter {
    pub fn new(camera: Arc<dyn Camera>, decoders: Arc<dyn DecoderFactory>) -> Self {
        Self {
            camera,
            decoders,
            constraints: CaptureConstraints::default(),
            hints: DecodeHints::default(),
            session: None,
        }
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: CaptureConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    #[must_use]
    pub fn with_hints(mut self, hints: DecodeHints) -> Self {
        self.hints = hints;
        self
    }

    /// Whether a decode loop is currently holding the camera.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.task.is_finished())
    }

    /// Acquires the camera, attaches it to `surface` and starts decoding.
    ///
    /// Any session still running is torn down first.
    ///
    /// # Errors
    ///
    /// Returns [`CameraUnavailable`] when the camera cannot be acquired. No
    /// resources are held in that case.
    pub async fn start(
        &mut self,
        surface: Arc<dyn PreviewSurface>,
    ) -> Result<DecodeEvents, CameraUnavailable> {
        self.stop().await;

        let stream = self.camera.open(&self.constraints).await.map_err(|e| {
            warn!(error = %e, "camera unavailable");
            e
        })?;
        let decoder = self.decoders.create(&self.hints);
        surface.attach(stream.label());
        info!(stream = stream.label(), "scan session started");

        let resources = SessionResources {
            stream,
            decoder: Some(decoder),
            surface,
            released: false,
        };

        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(run_decode_loop(resources, cancel.clone(), tx));

        self.session = Some(ActiveSession {
            cancel: cancel.clone(),
            task,
        });

        Ok(DecodeEvents { rx, cancel })
    }

    /// Stops the running session, if any, and waits until the camera is
    /// released. A no-op when idle.
    pub async fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        session.cancel.cancel();
        if let Err(e) = session.task.await {
            warn!(error = %e, "decode loop did not shut down cleanly");
        }
    }
}

impl Drop for DecoderAdapter {
    fn drop(&mut self) {
        // The loop releases its resources as soon as it observes the cancel.
        if let Some(session) = self.session.take() {
            session.cancel.cancel();
        }
    }
}

async fn run_decode_loop(
    mut resources: SessionResources,
    cancel: CancellationToken,
    events: mpsc::Sender<DecodeEvent>,
) {
    let mut frames: u64 = 0;

    loop {
        let frame = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(frames, "scan session cancelled");
                break;
            }
            frame = resources.stream.next_frame() => frame,
        };

        let Some(frame) = frame else {
            resources.release();
            info!(frames, "camera stream ended before a barcode was decoded");
            let _ = events.send(DecodeEvent::StreamEnded).await;
            return;
        };
        frames += 1;

        let Some(attempt) = decode_off_runtime(&mut resources, frame).await else {
            break;
        };
        match attempt {
            DecodeAttempt::Decoded(result) => {
                // Release before emitting so consumers never observe a live
                // camera after a successful scan.
                resources.release();
                info!(frames, format = ?result.format, "barcode decoded");
                let _ = events.send(DecodeEvent::Decoded(result)).await;
                return;
            }
            DecodeAttempt::NotFound => trace!(frames, "no barcode in frame"),
            DecodeAttempt::Failed(reason) => debug!(frames, reason = %reason, "frame decode failed"),
        }
    }

    resources.release();
}

/// Decodes `frame` on the blocking pool so `try_harder` passes over large
/// frames never stall the runtime's workers. The cancel check stays between
/// frames; an in-flight decode always runs to completion.
async fn decode_off_runtime(
    resources: &mut SessionResources,
    frame: Frame,
) -> Option<DecodeAttempt> {
    let mut decoder = resources.decoder.take()?;
    let joined = tokio::task::spawn_blocking(move || {
        let attempt = decoder.decode(&frame);
        (decoder, attempt)
    })
    .await;

    match joined {
        Ok((decoder, attempt)) => {
            resources.decoder = Some(decoder);
            Some(attempt)
        }
        Err(e) => {
            warn!(error = %e, "decoder task failed; ending scan session");
            None
        }
    }
}

#[cfg(test)]
#[path = "adapter_test.rs"]
mod tests;

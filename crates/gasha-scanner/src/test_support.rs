//! In-memory camera, decoder and preview fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::camera::{
    Camera, CameraUnavailable, CaptureConstraints, Frame, MediaStream, PreviewSurface,
};
use crate::decoder::{
    BarcodeDecoder, BarcodeFormat, DecodeAttempt, DecodeHints, DecodedBarcode, DecoderFactory,
};

/// Camera whose streams count how many tracks are live.
pub(crate) struct FakeCamera {
    failure: Option<CameraUnavailable>,
    /// Frames delivered before the stream ends; `None` means never ends.
    frame_limit: Option<usize>,
    pub(crate) live_tracks: Arc<AtomicUsize>,
    pub(crate) opened: AtomicUsize,
    pub(crate) last_constraints: Mutex<Option<CaptureConstraints>>,
}

impl FakeCamera {
    pub(crate) fn endless() -> Self {
        Self {
            failure: None,
            frame_limit: None,
            live_tracks: Arc::new(AtomicUsize::new(0)),
            opened: AtomicUsize::new(0),
            last_constraints: Mutex::new(None),
        }
    }

    pub(crate) fn with_frame_limit(limit: usize) -> Self {
        Self {
            frame_limit: Some(limit),
            ..Self::endless()
        }
    }

    pub(crate) fn failing(reason: CameraUnavailable) -> Self {
        Self {
            failure: Some(reason),
            ..Self::endless()
        }
    }

    pub(crate) fn live(&self) -> usize {
        self.live_tracks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Camera for FakeCamera {
    async fn open(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn MediaStream>, CameraUnavailable> {
        *self.last_constraints.lock().unwrap() = Some(constraints.clone());
        if let Some(reason) = &self.failure {
            return Err(reason.clone());
        }
        let id = self.opened.fetch_add(1, Ordering::SeqCst);
        self.live_tracks.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            label: format!("fake-camera-{id}"),
            remaining: self.frame_limit,
            live_tracks: Arc::clone(&self.live_tracks),
            stopped: false,
        }))
    }
}

struct FakeStream {
    label: String,
    remaining: Option<usize>,
    live_tracks: Arc<AtomicUsize>,
    stopped: bool,
}

#[async_trait]
impl MediaStream for FakeStream {
    fn label(&self) -> &str {
        &self.label
    }

    async fn next_frame(&mut self) -> Option<Frame> {
        if self.stopped {
            return None;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        tokio::task::yield_now().await;
        Some(Frame {
            width: 2,
            height: 2,
            luma: vec![0; 4],
        })
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.live_tracks.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Decoder that replays a script, then reports `NotFound` forever.
pub(crate) struct ScriptedDecoder {
    script: VecDeque<DecodeAttempt>,
    resets: Arc<AtomicUsize>,
}

impl BarcodeDecoder for ScriptedDecoder {
    fn decode(&mut self, _frame: &Frame) -> DecodeAttempt {
        self.script.pop_front().unwrap_or(DecodeAttempt::NotFound)
    }

    fn reset(&mut self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn decoded(text: &str) -> DecodeAttempt {
    DecodeAttempt::Decoded(DecodedBarcode {
        text: text.to_owned(),
        format: BarcodeFormat::Ean13,
    })
}

/// Factory handing every session a fresh copy of `script`.
pub(crate) fn scripted_factory(
    script: Vec<DecodeAttempt>,
    resets: Arc<AtomicUsize>,
) -> Arc<dyn DecoderFactory> {
    Arc::new(move |_hints: &DecodeHints| -> Box<dyn BarcodeDecoder> {
        Box::new(ScriptedDecoder {
            script: script.clone().into(),
            resets: Arc::clone(&resets),
        })
    })
}

#[derive(Default)]
pub(crate) struct RecordingSurface {
    pub(crate) attached: Mutex<Option<String>>,
    pub(crate) detaches: AtomicUsize,
}

impl PreviewSurface for RecordingSurface {
    fn attach(&self, stream_label: &str) {
        *self.attached.lock().unwrap() = Some(stream_label.to_owned());
    }

    fn detach(&self) {
        *self.attached.lock().unwrap() = None;
        self.detaches.fetch_add(1, Ordering::SeqCst);
    }
}

/// Renders `code` as a black-on-white EAN-13 frame with a quiet zone.
pub(crate) fn ean13_frame(code: &str) -> Frame {
    use rxing::Writer as _;

    let matrix = rxing::MultiFormatWriter::default()
        .encode(code, &rxing::BarcodeFormat::EAN_13, 380, 120)
        .expect("encodable EAN-13");
    let (width, height) = (matrix.getWidth(), matrix.getHeight());
    let mut luma = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            luma.push(if matrix.get(x, y) { 0 } else { 255 });
        }
    }
    Frame {
        width,
        height,
        luma,
    }
}

/// [`ean13_frame`] encoded as PNG, as a phone upload would arrive.
pub(crate) fn ean13_png(code: &str) -> Vec<u8> {
    let frame = ean13_frame(code);
    let image = image::GrayImage::from_raw(frame.width, frame.height, frame.luma)
        .expect("buffer matches dimensions");
    let mut png = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageLuma8(image)
        .write_to(&mut png, image::ImageFormat::Png)
        .expect("png encodes");
    png.into_inner()
}

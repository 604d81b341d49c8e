//! Still images as a camera: photo uploads and image files are scanned
//! through the same adapter and controller as a live stream.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use gasha_core::Barcode;
use image::imageops::FilterType;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::adapter::DecoderAdapter;
use crate::camera::{
    Camera, CameraUnavailable, CaptureConstraints, Frame, MediaStream, PreviewSurface,
};
use crate::controller::{ScanController, ScanState};
use crate::decoder::DecoderFactory;

#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    /// Encoded image bytes, e.g. a multipart upload.
    Bytes(Vec<u8>),
}

impl ImageSource {
    fn label(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes(bytes) => format!("uploaded image ({} bytes)", bytes.len()),
        }
    }
}

/// A [`Camera`] whose stream yields one frame per image, then ends.
#[derive(Debug, Clone, Default)]
pub struct StillImageCamera {
    sources: Vec<ImageSource>,
}

impl StillImageCamera {
    #[must_use]
    pub fn new(sources: Vec<ImageSource>) -> Self {
        Self { sources }
    }

    #[must_use]
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self::new(paths.into_iter().map(ImageSource::Path).collect())
    }

    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::new(vec![ImageSource::Bytes(bytes)])
    }
}

#[async_trait]
impl Camera for StillImageCamera {
    async fn open(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn MediaStream>, CameraUnavailable> {
        let Some(first) = self.sources.first() else {
            return Err(CameraUnavailable::NoDevice);
        };
        let label = first.label();
        let sources = self.sources.clone();
        let longest_side = constraints.ideal_width.max(constraints.ideal_height);

        let frames = tokio::task::spawn_blocking(move || {
            sources
                .iter()
                .map(|source| load_frame(source, longest_side))
                .collect::<Result<VecDeque<_>, _>>()
        })
        .await
        .map_err(|e| CameraUnavailable::Unreadable(e.to_string()))??;

        debug!(%label, frames = frames.len(), "still images loaded");
        Ok(Box::new(StillImageStream {
            label,
            frames,
            stopped: false,
        }))
    }
}

/// Decodes one image to grayscale, shrinking it so its longest side fits
/// `longest_side`.
fn load_frame(source: &ImageSource, longest_side: u32) -> Result<Frame, CameraUnavailable> {
    let image = match source {
        ImageSource::Path(path) => image::open(path),
        ImageSource::Bytes(bytes) => image::load_from_memory(bytes),
    }
    .map_err(|e| CameraUnavailable::Unreadable(format!("{}: {e}", source.label())))?;

    let image = if image.width().max(image.height()) > longest_side {
        image.resize(longest_side, longest_side, FilterType::Triangle)
    } else {
        image
    };
    let luma = image.to_luma8();
    Ok(Frame {
        width: luma.width(),
        height: luma.height(),
        luma: luma.into_raw(),
    })
}

struct StillImageStream {
    label: String,
    frames: VecDeque<Frame>,
    stopped: bool,
}

#[async_trait]
impl MediaStream for StillImageStream {
    fn label(&self) -> &str {
        &self.label
    }

    async fn next_frame(&mut self) -> Option<Frame> {
        if self.stopped {
            return None;
        }
        self.frames.pop_front()
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.frames.clear();
    }
}

/// Preview surface for front ends that have nothing to show.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreview;

impl PreviewSurface for NoPreview {
    fn attach(&self, stream_label: &str) {
        debug!(stream = stream_label, "scanning without preview");
    }

    fn detach(&self) {}
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StillScanError {
    #[error(transparent)]
    Camera(#[from] CameraUnavailable),

    #[error("No barcode was found in the image.")]
    NoBarcode,
}

/// Scans `camera`'s images through a [`ScanController`] and returns the
/// barcode its resolve callback received.
///
/// # Errors
///
/// [`StillScanError::Camera`] when an image cannot be read, and
/// [`StillScanError::NoBarcode`] when no image holds a readable barcode.
pub async fn scan_still_images(
    camera: StillImageCamera,
    decoders: Arc<dyn DecoderFactory>,
) -> Result<Barcode, StillScanError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let controller = ScanController::new(
        DecoderAdapter::new(Arc::new(camera), decoders),
        Arc::new(move |barcode: Barcode| {
            let _ = tx.send(barcode);
        }),
    );

    controller.start_scanning(Arc::new(NoPreview)).await?;
    controller.finished().await;

    match rx.try_recv() {
        Ok(barcode) => {
            info!(%barcode, "barcode read from still image");
            Ok(barcode)
        }
        Err(_) => {
            if let ScanState::Error(message) = controller.state() {
                debug!(%message, "still image scan ended without a barcode");
            }
            Err(StillScanError::NoBarcode)
        }
    }
}

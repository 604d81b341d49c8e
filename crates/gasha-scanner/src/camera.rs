//! Camera capability surface.

use async_trait::async_trait;
use thiserror::Error;

/// Which physical camera a capture request prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Rear camera; the one pointed at products.
    Environment,
    User,
}

/// Constraints passed to [`Camera::open`]. Sizes are hints, not requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub facing: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// One grayscale video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Row-major 8-bit luminance, `width * height` bytes.
    pub luma: Vec<u8>,
}

/// Why a camera stream could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraUnavailable {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device found")]
    NoDevice,

    #[error("camera device is busy")]
    DeviceBusy,

    #[error("camera capture is not supported")]
    Unsupported,

    /// A still image handed in place of a live camera could not be decoded.
    #[error("image could not be read: {0}")]
    Unreadable(String),
}

impl CameraUnavailable {
    /// Text shown next to the manual-entry fallback.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Camera access denied. Please allow camera access to scan barcodes."
            }
            Self::NoDevice => "No camera was found on this device.",
            Self::DeviceBusy => "The camera is being used by another application.",
            Self::Unsupported => "Camera scanning is not supported on this device.",
            Self::Unreadable(_) => "The photo could not be read. Please try another one.",
        }
    }
}

/// A source of live camera streams.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Requests exclusive access to a camera matching `constraints`.
    async fn open(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn MediaStream>, CameraUnavailable>;
}

/// An acquired camera stream. The hardware is held until [`MediaStream::stop`].
#[async_trait]
pub trait MediaStream: Send {
    /// Human-readable stream name, used when attaching a preview.
    fn label(&self) -> &str;

    /// Waits for the next frame. `None` once the stream has ended.
    async fn next_frame(&mut self) -> Option<Frame>;

    /// Stops every track of the stream. Must be safe to call repeatedly.
    fn stop(&mut self);
}

/// Where the live preview is shown.
pub trait PreviewSurface: Send + Sync {
    fn attach(&self, stream_label: &str);
    fn detach(&self);
}

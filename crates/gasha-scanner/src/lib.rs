//! Scan-and-resolve workflow.
//!
//! - [`adapter`]: owns the camera stream and decoder for one scan session and
//!   turns live frames into at most one decode event.
//! - [`controller`]: unifies camera scans and manual entry into a single
//!   "barcode resolved" callback and exposes the scanning state.
//! - [`location`]: bounded, cached device position lookups with a status view.
//! - [`rxing_decoder`]: the ZXing-compatible decoder used by every front end.
//! - [`still`]: photos and image files as a camera, plus a one-shot scan.
//!
//! Camera and position capabilities are traits; live camera bindings belong
//! to the front end that embeds this crate.

pub mod adapter;
pub mod camera;
pub mod controller;
pub mod decoder;
pub mod location;
pub mod rxing_decoder;
pub mod still;

#[cfg(test)]
mod test_support;

pub use adapter::{DecodeEvent, DecodeEvents, DecoderAdapter};
pub use camera::{
    Camera, CameraUnavailable, CaptureConstraints, FacingMode, Frame, MediaStream, PreviewSurface,
};
pub use controller::{ScanController, ScanState};
pub use decoder::{
    BarcodeDecoder, BarcodeFormat, DecodeAttempt, DecodeHints, DecodedBarcode, DecoderFactory,
};
pub use location::{
    FixedPosition, LocationError, LocationProvider, LocationStatus, NoPositionSource,
    PositionOptions, PositionSource,
};
pub use rxing_decoder::{RxingDecoder, RxingDecoderFactory};
pub use still::{scan_still_images, ImageSource, NoPreview, StillImageCamera, StillScanError};

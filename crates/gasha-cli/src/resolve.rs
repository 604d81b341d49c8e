//! Barcode input for the CLI. Typed codes and image files both resolve
//! through a `ScanController`, the same path the server's scan form uses.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use gasha_core::Barcode;
use gasha_scanner::{
    scan_still_images, DecoderAdapter, RxingDecoderFactory, ScanController, StillImageCamera,
};
use tokio::sync::mpsc;

/// Resolves a barcode typed on the command line.
///
/// # Errors
///
/// Fails when `input` is blank.
pub(crate) async fn manual_entry(input: &str) -> anyhow::Result<Barcode> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let controller = ScanController::new(
        DecoderAdapter::new(
            Arc::new(StillImageCamera::default()),
            Arc::new(RxingDecoderFactory),
        ),
        Arc::new(move |barcode: Barcode| {
            let _ = tx.send(barcode);
        }),
    );

    if !controller.submit_manual(input).await {
        bail!("barcode must not be blank");
    }
    rx.try_recv().context("manual entry did not resolve a barcode")
}

/// Reads the first decodable barcode from `images`, in order.
///
/// # Errors
///
/// Fails when an image cannot be read or none of them holds a barcode.
pub(crate) async fn scan_images(images: Vec<PathBuf>) -> anyhow::Result<Barcode> {
    let names = images
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    scan_still_images(
        StillImageCamera::from_paths(images),
        Arc::new(RxingDecoderFactory),
    )
    .await
    .with_context(|| format!("could not read a barcode from {names}"))
}

#[cfg(test)]
mod tests {
    use gasha_scanner::{CameraUnavailable, StillScanError};

    use super::*;

    #[tokio::test]
    async fn manual_entry_is_trimmed() {
        let barcode = manual_entry("  4901234567894\n").await.expect("resolves");
        assert_eq!(barcode.as_str(), "4901234567894");
    }

    #[tokio::test]
    async fn blank_manual_entry_is_rejected() {
        let err = manual_entry(" \t ").await.expect_err("blank input");
        assert_eq!(err.to_string(), "barcode must not be blank");
    }

    #[tokio::test]
    async fn missing_image_file_is_reported() {
        let path = std::env::temp_dir().join("gasha-cli-no-such-image.png");
        let err = scan_images(vec![path.clone()]).await.expect_err("missing file");

        assert_eq!(
            err.to_string(),
            format!("could not read a barcode from {}", path.display())
        );
        assert!(matches!(
            err.downcast_ref::<StillScanError>(),
            Some(StillScanError::Camera(CameraUnavailable::Unreadable(_)))
        ));
    }
}

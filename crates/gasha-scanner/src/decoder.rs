//! Barcode decoding capability.

use crate::camera::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    Ean13,
    Ean8,
    Code128,
    Code39,
    UpcA,
    UpcE,
    QrCode,
    DataMatrix,
    Pdf417,
    Aztec,
}

/// Decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeHints {
    pub formats: Vec<BarcodeFormat>,
    /// Spend more time per frame for better accuracy.
    pub try_harder: bool,
}

impl Default for DecodeHints {
    /// EAN-13 (JAN) first, plus the common linear and 2D symbologies.
    fn default() -> Self {
        Self {
            formats: vec![
                BarcodeFormat::Ean13,
                BarcodeFormat::Ean8,
                BarcodeFormat::Code128,
                BarcodeFormat::Code39,
                BarcodeFormat::UpcA,
                BarcodeFormat::UpcE,
                BarcodeFormat::QrCode,
                BarcodeFormat::DataMatrix,
                BarcodeFormat::Pdf417,
                BarcodeFormat::Aztec,
            ],
            try_harder: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBarcode {
    pub text: String,
    pub format: BarcodeFormat,
}

/// Outcome of decoding a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeAttempt {
    Decoded(DecodedBarcode),
    /// No barcode in this frame; the normal case while the user aims.
    NotFound,
    /// The decoder errored on this frame (checksum, format, ...).
    Failed(String),
}

pub trait BarcodeDecoder: Send {
    fn decode(&mut self, frame: &Frame) -> DecodeAttempt;

    /// Drops any per-session state held by the decoder.
    fn reset(&mut self);
}

/// Creates one decoder per scan session.
pub trait DecoderFactory: Send + Sync {
    fn create(&self, hints: &DecodeHints) -> Box<dyn BarcodeDecoder>;
}

impl<F> DecoderFactory for F
where
    F: Fn(&DecodeHints) -> Box<dyn BarcodeDecoder> + Send + Sync,
{
    fn create(&self, hints: &DecodeHints) -> Box<dyn BarcodeDecoder> {
        self(hints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hints_cover_jan_and_try_harder() {
        let hints = DecodeHints::default();
        assert_eq!(hints.formats.first(), Some(&BarcodeFormat::Ean13));
        assert!(hints.formats.contains(&BarcodeFormat::Ean8));
        assert!(hints.formats.contains(&BarcodeFormat::QrCode));
        assert_eq!(hints.formats.len(), 10);
        assert!(hints.try_harder);
    }
}

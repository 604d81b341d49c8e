//! [`BarcodeDecoder`] backed by `rxing`, the Rust port of ZXing.

use std::collections::HashSet;

use rxing::{DecodeHintType, DecodeHintValue, DecodingHintDictionary, Exceptions};

use crate::camera::Frame;
use crate::decoder::{
    BarcodeDecoder, BarcodeFormat, DecodeAttempt, DecodeHints, DecodedBarcode, DecoderFactory,
};

/// Creates one [`RxingDecoder`] per scan session.
#[derive(Debug, Clone, Copy, Default)]
pub struct RxingDecoderFactory;

impl DecoderFactory for RxingDecoderFactory {
    fn create(&self, hints: &DecodeHints) -> Box<dyn BarcodeDecoder> {
        Box::new(RxingDecoder::new(hints))
    }
}

/// Multi-format decoder over grayscale frames.
pub struct RxingDecoder {
    // Stored as plain data because `DecodingHintDictionary` is not `Send`.
    formats: HashSet<rxing::BarcodeFormat>,
    try_harder: bool,
}

impl RxingDecoder {
    #[must_use]
    pub fn new(hints: &DecodeHints) -> Self {
        let formats: HashSet<rxing::BarcodeFormat> =
            hints.formats.iter().copied().map(to_rxing).collect();
        Self {
            formats,
            try_harder: hints.try_harder,
        }
    }

    fn hint_dictionary(&self) -> DecodingHintDictionary {
        let mut dictionary = DecodingHintDictionary::new();
        dictionary.insert(
            DecodeHintType::POSSIBLE_FORMATS,
            DecodeHintValue::PossibleFormats(self.formats.clone()),
        );
        if self.try_harder {
            dictionary.insert(DecodeHintType::TRY_HARDER, DecodeHintValue::TryHarder(true));
        }
        dictionary
    }
}

impl BarcodeDecoder for RxingDecoder {
    fn decode(&mut self, frame: &Frame) -> DecodeAttempt {
        let expected = usize::try_from(u64::from(frame.width) * u64::from(frame.height)).ok();
        if frame.width == 0 || frame.height == 0 || expected != Some(frame.luma.len()) {
            return DecodeAttempt::Failed(format!(
                "frame is {}x{} but carries {} luma bytes",
                frame.width,
                frame.height,
                frame.luma.len()
            ));
        }

        let mut hints = self.hint_dictionary();
        match rxing::helpers::detect_in_luma_with_hints(
            frame.luma.clone(),
            frame.width,
            frame.height,
            None,
            &mut hints,
        ) {
            Ok(result) => match from_rxing(result.getBarcodeFormat()) {
                Some(format) => DecodeAttempt::Decoded(DecodedBarcode {
                    text: result.getText().to_string(),
                    format,
                }),
                None => DecodeAttempt::Failed(format!(
                    "unrequested format {:?}",
                    result.getBarcodeFormat()
                )),
            },
            Err(Exceptions::NotFoundException(_)) => DecodeAttempt::NotFound,
            Err(e) => DecodeAttempt::Failed(format!("{e:?}")),
        }
    }

    /// Stateless between frames.
    fn reset(&mut self) {}
}

fn to_rxing(format: BarcodeFormat) -> rxing::BarcodeFormat {
    match format {
        BarcodeFormat::Ean13 => rxing::BarcodeFormat::EAN_13,
        BarcodeFormat::Ean8 => rxing::BarcodeFormat::EAN_8,
        BarcodeFormat::Code128 => rxing::BarcodeFormat::CODE_128,
        BarcodeFormat::Code39 => rxing::BarcodeFormat::CODE_39,
        BarcodeFormat::UpcA => rxing::BarcodeFormat::UPC_A,
        BarcodeFormat::UpcE => rxing::BarcodeFormat::UPC_E,
        BarcodeFormat::QrCode => rxing::BarcodeFormat::QR_CODE,
        BarcodeFormat::DataMatrix => rxing::BarcodeFormat::DATA_MATRIX,
        BarcodeFormat::Pdf417 => rxing::BarcodeFormat::PDF_417,
        BarcodeFormat::Aztec => rxing::BarcodeFormat::AZTEC,
    }
}

fn from_rxing(format: &rxing::BarcodeFormat) -> Option<BarcodeFormat> {
    Some(match format {
        rxing::BarcodeFormat::EAN_13 => BarcodeFormat::Ean13,
        rxing::BarcodeFormat::EAN_8 => BarcodeFormat::Ean8,
        rxing::BarcodeFormat::CODE_128 => BarcodeFormat::Code128,
        rxing::BarcodeFormat::CODE_39 => BarcodeFormat::Code39,
        rxing::BarcodeFormat::UPC_A => BarcodeFormat::UpcA,
        rxing::BarcodeFormat::UPC_E => BarcodeFormat::UpcE,
        rxing::BarcodeFormat::QR_CODE => BarcodeFormat::QrCode,
        rxing::BarcodeFormat::DATA_MATRIX => BarcodeFormat::DataMatrix,
        rxing::BarcodeFormat::PDF_417 => BarcodeFormat::Pdf417,
        rxing::BarcodeFormat::AZTEC => BarcodeFormat::Aztec,
        _ => return None,
    })
}

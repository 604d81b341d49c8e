//! Product barcode value type.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Characters left untouched when a barcode is placed into a URL path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A JAN/EAN product code as captured from a scan or manual entry.
///
/// The only guarantee is that the value is trimmed and non-empty. Digit count
/// and check digit are deliberately not enforced: whatever the user scanned or
/// typed is forwarded to the upstream search as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Barcode(String);

impl Barcode {
    /// Trims `raw` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyBarcode`] when `raw` is empty or whitespace-only.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyBarcode);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code has the shape of an EAN-8 / EAN-13 / JAN code.
    ///
    /// Informational only; callers log on `false` but still search.
    #[must_use]
    pub fn looks_like_ean(&self) -> bool {
        (8..=13).contains(&self.0.len()) && self.0.bytes().all(|b| b.is_ascii_digit())
    }

    /// Percent-encoded form suitable for a single URL path segment.
    #[must_use]
    pub fn to_path_segment(&self) -> String {
        utf8_percent_encode(&self.0, PATH_SEGMENT).to_string()
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Barcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Barcode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Barcode> for String {
    fn from(value: Barcode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let code = Barcode::parse("  4901234567894\n").unwrap();
        assert_eq!(code.as_str(), "4901234567894");
    }

    #[test]
    fn parse_rejects_whitespace_only() {
        for raw in ["", " ", "\t\n", "   \r\n  "] {
            assert!(
                matches!(Barcode::parse(raw), Err(CoreError::EmptyBarcode)),
                "expected EmptyBarcode for {raw:?}"
            );
        }
    }

    #[test]
    fn parse_accepts_non_numeric_codes() {
        let code = Barcode::parse("ABC-123").unwrap();
        assert_eq!(code.as_str(), "ABC-123");
        assert!(!code.looks_like_ean());
    }

    #[test]
    fn looks_like_ean_checks_length_and_digits() {
        assert!(Barcode::parse("4901234567894").unwrap().looks_like_ean());
        assert!(Barcode::parse("49012345").unwrap().looks_like_ean());
        assert!(!Barcode::parse("4901234").unwrap().looks_like_ean());
        assert!(!Barcode::parse("49012345678945").unwrap().looks_like_ean());
    }

    #[test]
    fn path_segment_escapes_reserved_characters() {
        let code = Barcode::parse("12/34 ?x").unwrap();
        assert_eq!(code.to_path_segment(), "12%2F34%20%3Fx");
    }

    #[test]
    fn deserialize_rejects_blank_string() {
        let result: Result<Barcode, _> = serde_json::from_str("\"  \"");
        assert!(result.is_err());
    }
}

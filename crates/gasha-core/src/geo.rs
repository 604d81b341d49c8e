use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Fallback search origin used when no location is known (central Tokyo).
pub const DEFAULT_COORDINATES: Coordinates = Coordinates {
    lat: 35.6762,
    lng: 139.6503,
};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinates`] for non-finite values or
    /// values outside the valid degree ranges.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if !valid {
            return Err(CoreError::InvalidCoordinates { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    /// Builds a pair from raw query-string values.
    ///
    /// Both values must be present and parse; a lone `lat` or `lng` is
    /// treated the same as neither.
    #[must_use]
    pub fn from_query(lat: Option<&str>, lng: Option<&str>) -> Option<Self> {
        let lat = lat?.trim().parse::<f64>().ok()?;
        let lng = lng?.trim().parse::<f64>().ok()?;
        Self::new(lat, lng).ok()
    }

    /// `lat=..&lng=..` fragment for carrying coordinates across navigations.
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("lat={}&lng={}", self.lat, self.lng)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

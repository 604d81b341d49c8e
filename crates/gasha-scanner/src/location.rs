//! Device location lookups with a bounded wait and a short-lived cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gasha_core::{AppConfig, Coordinates};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location access was denied.")]
    PermissionDenied,

    #[error("Location information is unavailable.")]
    PositionUnavailable,

    #[error("The location request timed out.")]
    Timeout,

    #[error("Geolocation is not supported on this device.")]
    Unsupported,

    #[error("An unknown error occurred while getting the location: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// Upper bound on a single position request.
    pub timeout: Duration,
    /// A cached fix younger than this is reused instead of polling the device.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(60),
        }
    }
}

impl PositionOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: config.geo_timeout,
            maximum_age: config.geo_maximum_age,
            ..Self::default()
        }
    }
}

/// A device capability that reports the current position.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, LocationError>;
}

/// Always reports the same position, e.g. coordinates given on a command line.
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Used where the platform has no location capability at all.
pub struct NoPositionSource;

#[async_trait]
impl PositionSource for NoPositionSource {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Compact status for a location widget.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationStatus {
    Pending,
    Enabled(Coordinates),
    Error(String),
    /// Not requested yet, or the user has not granted it.
    Disabled,
}

impl LocationStatus {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Getting your location...",
            Self::Enabled(_) => "Location: Enabled",
            Self::Error(_) => "Location: Error",
            Self::Disabled => "Location: Not set",
        }
    }

    /// Secondary line: the coordinates or the error message.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Enabled(coords) => Some(format!("Coordinates: {coords}")),
            Self::Error(message) => Some(message.clone()),
            Self::Pending | Self::Disabled => None,
        }
    }

    /// Whether an "enable location" affordance should be shown.
    #[must_use]
    pub fn retry_offered(&self) -> bool {
        !matches!(self, Self::Pending | Self::Enabled(_))
    }
}

struct CachedFix {
    coords: Coordinates,
    at: Instant,
}

pub struct LocationProvider {
    source: Arc<dyn PositionSource>,
    options: PositionOptions,
    cached: Mutex<Option<CachedFix>>,
    status: watch::Sender<LocationStatus>,
}

impl LocationProvider {
    pub fn new(source: Arc<dyn PositionSource>, options: PositionOptions) -> Self {
        let (status, _) = watch::channel(LocationStatus::Disabled);
        Self {
            source,
            options,
            cached: Mutex::new(None),
            status,
        }
    }

    #[must_use]
    pub fn status(&self) -> LocationStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LocationStatus> {
        self.status.subscribe()
    }

    /// Returns the current position.
    ///
    /// A fix younger than `maximum_age` is served from cache; otherwise the
    /// source is queried for at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the source's [`LocationError`], or [`LocationError::Timeout`]
    /// when the source does not answer in time.
    pub async fn request(&self) -> Result<Coordinates, LocationError> {
        let mut cached = self.cached.lock().await;
        if let Some(fix) = cached.as_ref() {
            if fix.at.elapsed() <= self.options.maximum_age {
                debug!("serving cached location fix");
                return Ok(fix.coords);
            }
        }

        self.status.send_replace(LocationStatus::Pending);
        let outcome = tokio::time::timeout(
            self.options.timeout,
            self.source.current_position(&self.options),
        )
        .await
        .unwrap_or(Err(LocationError::Timeout));

        match outcome {
            Ok(coords) => {
                info!(lat = coords.lat, lng = coords.lng, "location acquired");
                *cached = Some(CachedFix {
                    coords,
                    at: Instant::now(),
                });
                self.status.send_replace(LocationStatus::Enabled(coords));
                Ok(coords)
            }
            Err(e) => {
                warn!(error = %e, "location request failed");
                self.status.send_replace(LocationStatus::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Current position, else `fallback`, else `None`.
    ///
    /// Callers searching with `None` let the search service apply its
    /// default origin.
    pub async fn resolve(&self, fallback: Option<Coordinates>) -> Option<Coordinates> {
        match self.request().await {
            Ok(coords) => Some(coords),
            Err(e) => {
                debug!(error = %e, has_fallback = fallback.is_some(), "using fallback location");
                fallback
            }
        }
    }
}

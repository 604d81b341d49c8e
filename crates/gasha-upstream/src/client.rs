//! HTTP client for the upstream shop-search endpoint.

use std::time::Duration;

use gasha_core::{Barcode, Coordinates};
use reqwest::{header, Client, Url};
use serde_json::Value;

use crate::error::UpstreamError;
use crate::normalize::normalize_search_response;

const SEARCH_PATH: &str = "data/search/result";

/// Prefix the upstream expects in front of a product code in `spot_code`.
pub const ITEM_CODE_PREFIX: &str = "gashaItem_";

/// Client for the upstream commerce shop search.
///
/// A single GET per search; failures are reported, never retried.
pub struct ShopSearchClient {
    client: Client,
    base_url: Url,
    domain: String,
}

impl ShopSearchClient {
    /// Creates a client for `base_url` (scheme + host, optionally a path
    /// prefix).
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`UpstreamError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        domain: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Ensure exactly one trailing slash so `join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| UpstreamError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            domain: domain.to_owned(),
        })
    }

    /// Builds the outbound search URL.
    ///
    /// The upstream names the longitude parameter `log`; all values are
    /// percent-encoded by `Url`.
    #[must_use]
    pub fn search_url(&self, barcode: &Barcode, origin: Coordinates) -> Url {
        let mut url = self
            .base_url
            .join(SEARCH_PATH)
            .unwrap_or_else(|_| self.base_url.clone());
        url.query_pairs_mut()
            .append_pair("domain", &self.domain)
            .append_pair("lat", &origin.lat.to_string())
            .append_pair("log", &origin.lng.to_string())
            .append_pair("spot_code", &format!("{ITEM_CODE_PREFIX}{barcode}"));
        url
    }

    /// Searches shops stocking `barcode` around `origin`.
    ///
    /// Returns the raw shop records in upstream order.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Http`] on network failure or timeout.
    /// - [`UpstreamError::UnexpectedStatus`] on any non-2xx status.
    /// - [`UpstreamError::Deserialize`] if the body is not JSON.
    pub async fn search(
        &self,
        barcode: &Barcode,
        origin: Coordinates,
    ) -> Result<Vec<Value>, UpstreamError> {
        let url = self.search_url(barcode, origin);
        tracing::debug!(%barcode, lat = origin.lat, lng = origin.lng, "querying upstream shop search");

        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: Value =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Deserialize {
                context: format!("shop search for {barcode}"),
                source: e,
            })?;

        let (shops, shape) = normalize_search_response(parsed);
        tracing::debug!(%barcode, count = shops.len(), ?shape, "upstream shop search complete");
        Ok(shops)
    }
}

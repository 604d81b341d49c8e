//! Shop search for a resolved barcode, rendered for the terminal.

use std::sync::Arc;

use anyhow::Context;
use gasha_core::{AppConfig, Barcode, Coordinates};
use gasha_render::{build_views, render_shop_list_text};
use gasha_scanner::{
    FixedPosition, LocationProvider, NoPositionSource, PositionOptions, PositionSource,
};
use gasha_upstream::ShopSearchClient;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LookupRequest {
    pub barcode: Barcode,
    pub origin: Option<Coordinates>,
    pub json: bool,
}

impl LookupRequest {
    /// Validates the command-line origin for an already resolved barcode.
    ///
    /// # Errors
    ///
    /// Fails when the coordinates are out of range.
    pub(crate) fn new(
        barcode: Barcode,
        origin: Option<(f64, f64)>,
        json: bool,
    ) -> anyhow::Result<Self> {
        let origin = origin
            .map(|(lat, lng)| Coordinates::new(lat, lng))
            .transpose()
            .context("invalid --lat/--lng")?;
        Ok(Self {
            barcode,
            origin,
            json,
        })
    }
}

/// Runs one search and returns the text to print.
///
/// # Errors
///
/// Fails when the upstream client cannot be built or the search fails.
pub(crate) async fn run_lookup(
    config: &AppConfig,
    request: &LookupRequest,
) -> anyhow::Result<String> {
    let source: Arc<dyn PositionSource> = match request.origin {
        Some(coords) => Arc::new(FixedPosition(coords)),
        None => Arc::new(NoPositionSource),
    };
    let location = LocationProvider::new(source, PositionOptions::from_config(config));
    let origin = location
        .resolve(None)
        .await
        .unwrap_or(config.default_coordinates);
    tracing::info!(
        barcode = %request.barcode,
        status = location.status().label(),
        %origin,
        "searching shops"
    );

    let client = ShopSearchClient::new(
        &config.upstream_base_url,
        &config.upstream_domain,
        config.upstream_timeout_secs,
        &config.upstream_user_agent,
    )?;
    let shops = client
        .search(&request.barcode, origin)
        .await
        .context("Failed to fetch shops from external API")?;

    if request.json {
        let mut out = serde_json::to_string_pretty(&serde_json::json!({ "shops": shops }))?;
        out.push('\n');
        return Ok(out);
    }

    let views = build_views(&shops, Some(&request.barcode), &config.asset_base_url);
    Ok(render_shop_list_text(&views))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gasha_core::{Environment, DEFAULT_COORDINATES};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(upstream: &str) -> AppConfig {
        AppConfig {
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().expect("addr"),
            log_level: "debug".to_owned(),
            upstream_base_url: upstream.to_owned(),
            upstream_domain: "bandai_gasha_shop".to_owned(),
            upstream_timeout_secs: 5,
            upstream_user_agent: "gasha-cli-test".to_owned(),
            asset_base_url: "https://assets.test".to_owned(),
            default_coordinates: DEFAULT_COORDINATES,
            geo_timeout: Duration::from_secs(10),
            geo_maximum_age: Duration::from_secs(60),
        }
    }

    fn shop() -> serde_json::Value {
        json!({
            "_id": "s1",
            "sort": ["0", 3.21],
            "_source": {
                "name": "Gasha Station",
                "tel": "03-1234-5678",
                "maker": "{\"z4901234567894\": \"few\"}"
            }
        })
    }

    fn jan() -> Barcode {
        Barcode::parse("4901234567894").expect("barcode")
    }

    #[test]
    fn request_validates_coordinates() {
        let request =
            LookupRequest::new(jan(), Some((35.0, 139.0)), false).expect("valid request");
        assert_eq!(request.barcode.as_str(), "4901234567894");
        assert_eq!(
            request.origin,
            Some(Coordinates {
                lat: 35.0,
                lng: 139.0
            })
        );

        assert!(LookupRequest::new(jan(), Some((91.0, 0.0)), false).is_err());
        assert!(LookupRequest::new(jan(), Some((0.0, 181.0)), false).is_err());
    }

    #[tokio::test]
    async fn explicit_coordinates_are_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/search/result"))
            .and(query_param("lat", "34.5"))
            .and(query_param("log", "135.5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "shops": [shop()] })))
            .expect(1)
            .mount(&server)
            .await;

        let request = LookupRequest::new(jan(), Some((34.5, 135.5)), false).expect("request");
        let text = run_lookup(&config(&server.uri()), &request)
            .await
            .expect("lookup");

        assert!(text.starts_with("Found 1 shop(s)\n"));
        assert!(text.contains("1. Gasha Station  [3.2 km away]"));
        assert!(text.contains("Avail: few"));
        assert!(text.contains("03-1234-5678"));
    }

    #[tokio::test]
    async fn missing_coordinates_use_default_origin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("lat", "35.6762"))
            .and(query_param("log", "139.6503"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "shops": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let request = LookupRequest::new(jan(), None, false).expect("request");
        let text = run_lookup(&config(&server.uri()), &request)
            .await
            .expect("lookup");

        assert_eq!(text, "No shops found for this JAN code.\n");
    }

    #[tokio::test]
    async fn json_output_mirrors_proxy_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "hits": { "hits": [shop()] } })),
            )
            .mount(&server)
            .await;

        let request = LookupRequest::new(jan(), None, true).expect("request");
        let out = run_lookup(&config(&server.uri()), &request)
            .await
            .expect("lookup");

        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(parsed, json!({ "shops": [shop()] }));
    }

    #[tokio::test]
    async fn upstream_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let request = LookupRequest::new(jan(), None, false).expect("request");
        let err = run_lookup(&config(&server.uri()), &request)
            .await
            .expect_err("upstream failure");

        assert_eq!(err.to_string(), "Failed to fetch shops from external API");
    }
}

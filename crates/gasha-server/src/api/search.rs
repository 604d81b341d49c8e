//! Shop search proxy: forwards `{barcode, lat, lng}` to the upstream search
//! and returns the normalized shop list.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use gasha_core::{Barcode, Coordinates};
use gasha_upstream::UpstreamError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::middleware::RequestId;

use super::AppState;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("Failed to fetch shops from external API")]
    UpstreamUnavailable(#[source] UpstreamError),
}

impl SearchError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    pub barcode: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

impl SearchQuery {
    /// Both coordinates when both parse; otherwise neither.
    pub(crate) fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_query(self.lat.as_deref(), self.lng.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    shops: Vec<Value>,
}

/// Runs one upstream search, defaulting the origin when `origin` is `None`.
pub(crate) async fn find_shops(
    state: &AppState,
    barcode: &Barcode,
    origin: Option<Coordinates>,
) -> Result<Vec<Value>, SearchError> {
    let origin = origin.unwrap_or(state.config.default_coordinates);
    if !barcode.looks_like_ean() {
        tracing::debug!(%barcode, "barcode is not EAN shaped; searching anyway");
    }

    state.search.search(barcode, origin).await.map_err(|e| {
        tracing::error!(%barcode, error = %e, "upstream shop search failed");
        SearchError::UpstreamUnavailable(e)
    })
}

pub(super) async fn search_shops(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>, SearchError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!(request_id = %req_id.0, error = %rejection, "rejected search query");
        SearchError::InvalidQuery(rejection.body_text())
    })?;
    let barcode = query
        .barcode
        .as_deref()
        .and_then(|raw| Barcode::parse(raw).ok())
        .ok_or(SearchError::MissingParameter("barcode"))?;

    let shops = find_shops(&state, &barcode, query.coordinates()).await?;
    tracing::info!(
        request_id = %req_id.0,
        %barcode,
        shops = shops.len(),
        "shop search complete"
    );
    Ok(Json(SearchResponse { shops }))
}

//! HTML page flows: landing page, manual lookup redirect and results page.

mod templates;

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Multipart, MultipartError},
        DefaultBodyLimit, Path, Query, State,
    },
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use gasha_core::{Barcode, Coordinates};
use gasha_render::{build_views, html::SEARCH_FAILED, render_search_error, render_shop_list};
use gasha_scanner::{
    scan_still_images, LocationStatus, RxingDecoderFactory, StillImageCamera, StillScanError,
};

use crate::api::{find_shops, AppState, SearchQuery};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/lookup", get(lookup))
        .route("/scan", post(scan).layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES)))
        .route("/jan/{code}", get(results))
}

/// Location status derived from coordinates the request carries.
///
/// Pages never block on a location fix; without coordinates the widget
/// offers to enable location and searches use the default origin.
/// Phone camera photos are a few megabytes.
const MAX_PHOTO_BYTES: usize = 16 * 1024 * 1024;

const NO_PHOTO: &str = "Choose a photo of the barcode first.";
const NO_BARCODE_IN_PHOTO: &str = "No barcode was found in the photo.";
const UPLOAD_FAILED: &str = "The photo upload failed.";

fn status_for(coords: Option<Coordinates>) -> LocationStatus {
    coords.map_or(LocationStatus::Disabled, LocationStatus::Enabled)
}

async fn landing(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Html<String> {
    landing_page(&state, query.coordinates(), None)
}

fn landing_page(
    state: &AppState,
    coords: Option<Coordinates>,
    scan_error: Option<&str>,
) -> Html<String> {
    Html(templates::layout(
        "Gacha Shop Finder",
        &templates::landing_body(&status_for(coords), coords, &state.config, scan_error),
    ))
}

/// Fields of the scan form: the photo plus the carried coordinates.
async fn read_scan_form(
    multipart: &mut Multipart,
) -> Result<(Option<Vec<u8>>, SearchQuery), MultipartError> {
    let mut photo = None;
    let mut query = SearchQuery::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("photo") => photo = Some(field.bytes().await?.to_vec()),
            Some("lat") => query.lat = Some(field.text().await?),
            Some("lng") => query.lng = Some(field.text().await?),
            _ => {}
        }
    }
    Ok((photo, query))
}

/// Decodes the uploaded photo and continues exactly like a manual lookup.
/// Failures go back to the landing page with manual entry offered.
async fn scan(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let (photo, query) = match read_scan_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::debug!(error = %e, "unreadable scan upload");
            return landing_page(&state, None, Some(UPLOAD_FAILED)).into_response();
        }
    };
    let coords = query.coordinates();
    let Some(photo) = photo.filter(|bytes| !bytes.is_empty()) else {
        return landing_page(&state, coords, Some(NO_PHOTO)).into_response();
    };

    match scan_still_images(
        StillImageCamera::from_bytes(photo),
        Arc::new(RxingDecoderFactory),
    )
    .await
    {
        Ok(barcode) => Redirect::to(&results_location(&barcode, coords)).into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "photo scan failed");
            let message = match &e {
                StillScanError::NoBarcode => NO_BARCODE_IN_PHOTO,
                StillScanError::Camera(camera) => camera.user_message(),
            };
            landing_page(&state, coords, Some(message)).into_response()
        }
    }
}

/// Path (and query) of the results page for `barcode`.
fn results_location(barcode: &Barcode, coords: Option<Coordinates>) -> String {
    let path = format!("/jan/{}", barcode.to_path_segment());
    match coords {
        Some(c) => format!("{path}?{}", c.to_query()),
        None => path,
    }
}

async fn lookup(Query(query): Query<SearchQuery>) -> Redirect {
    let Some(barcode) = query
        .barcode
        .as_deref()
        .and_then(|raw| Barcode::parse(raw).ok())
    else {
        tracing::debug!("blank manual entry; back to landing page");
        return Redirect::to("/");
    };
    Redirect::to(&results_location(&barcode, query.coordinates()))
}

async fn results(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let Ok(barcode) = Barcode::parse(&code) else {
        return Redirect::to("/").into_response();
    };
    let coords = query.coordinates();

    let results_html = match find_shops(&state, &barcode, coords).await {
        Ok(shops) => {
            let views = build_views(&shops, Some(&barcode), &state.config.asset_base_url);
            render_shop_list(&views)
        }
        Err(_) => render_search_error(SEARCH_FAILED),
    };

    let title = format!("Shops for {barcode}");
    Html(templates::layout(
        &title,
        &templates::results_body(
            &barcode,
            &status_for(coords),
            coords,
            &state.config,
            &results_html,
        ),
    ))
    .into_response()
}

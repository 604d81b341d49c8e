//! Display-ready projection of one upstream shop record.

use gasha_core::shop::text_field;
use gasha_core::{Barcode, ShopRecord};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::sanitize::sanitize_rich_text;
use crate::RenderError;

pub const DISTANCE_UNKNOWN: &str = "Distance unknown";
pub const PHONE_FALLBACK: &str = "Phone not available";
pub const HOURS_FALLBACK: &str = "Hours not available";
pub const ADDRESS_FALLBACK: &str = "Address not available";
pub const ACCESS_FALLBACK: &str = "Access information not available";

/// Everything a result card shows.
///
/// Fields ending in `_html` hold sanitized markup; all other strings are
/// plain text and must be escaped by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopView {
    pub id: Option<String>,
    pub name: String,
    pub distance: String,
    pub availability: Option<String>,
    pub thumbnail_url: Option<String>,
    pub phone: String,
    pub hours_html: String,
    pub address: String,
    pub access_html: String,
    pub zipcode: Option<String>,
    pub label_html: Option<String>,
    pub fax: Option<String>,
    pub holidays_html: Option<String>,
}

impl ShopView {
    /// Builds the view for `record`.
    ///
    /// Malformed `maker` or `etc1` blobs degrade to "no badge" and "no
    /// overrides" respectively.
    #[must_use]
    pub fn build(record: &Value, barcode: Option<&Barcode>, asset_base: &str) -> Self {
        let shop = ShopRecord::from_value(record);
        let source = &shop.source;

        let overrides = source
            .etc1
            .as_deref()
            .and_then(|raw| log_malformed(shop.id.as_deref(), parse_object("etc1", raw)))
            .unwrap_or_default();
        let overrides = Value::Object(overrides);
        let pick = |key: &str, base: Option<&String>| {
            text_field(&overrides, key).or_else(|| base.cloned())
        };

        let availability = match (source.maker.as_deref(), barcode) {
            (Some(raw), Some(barcode)) => {
                log_malformed(shop.id.as_deref(), available_amount(raw, barcode)).flatten()
            }
            _ => None,
        };

        Self {
            id: shop.id.clone(),
            name: source.name.clone().unwrap_or_default(),
            distance: format_distance(shop.distance_km),
            availability,
            thumbnail_url: source
                .thumb
                .as_deref()
                .map(|thumb| format!("{asset_base}{thumb}")),
            phone: pick("tel", source.tel.as_ref()).unwrap_or_else(|| PHONE_FALLBACK.to_owned()),
            hours_html: pick("operating_hours", source.operating_hours.as_ref())
                .map_or_else(|| HOURS_FALLBACK.to_owned(), |raw| sanitize_rich_text(&raw)),
            address: pick("address1", source.address1.as_ref())
                .unwrap_or_else(|| ADDRESS_FALLBACK.to_owned()),
            access_html: pick("access", source.access.as_ref())
                .map_or_else(|| ACCESS_FALLBACK.to_owned(), |raw| sanitize_rich_text(&raw)),
            zipcode: text_field(&overrides, "zipcode"),
            label_html: text_field(&overrides, "shop_label").map(|raw| sanitize_rich_text(&raw)),
            fax: text_field(&overrides, "fax"),
            holidays_html: text_field(&overrides, "Regular_holiday")
                .map(|raw| sanitize_rich_text(&raw)),
        }
    }

    /// Badge text for the availability amount, e.g. `Avail: 3`.
    #[must_use]
    pub fn availability_badge(&self) -> Option<String> {
        self.availability
            .as_deref()
            .map(|amount| format!("Avail: {amount}"))
    }
}

/// `"1.2 km away"`; a missing or zero distance is unknown.
#[must_use]
pub fn format_distance(distance_km: Option<f64>) -> String {
    match distance_km {
        Some(km) if km.is_finite() && km != 0.0 => format!("{km:.1} km away"),
        _ => DISTANCE_UNKNOWN.to_owned(),
    }
}

/// Looks up `"z" + barcode` in the `maker` availability map.
///
/// Null, `false`, zero and empty values mean no stock information.
///
/// # Errors
///
/// Returns [`RenderError::MalformedRecordData`] when `raw` is not a JSON object.
pub fn available_amount(raw: &str, barcode: &Barcode) -> Result<Option<String>, RenderError> {
    let map = parse_object("maker", raw)?;
    let key = format!("z{barcode}");
    Ok(map.get(&key).and_then(|value| match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_owned()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        _ => None,
    }))
}

fn parse_object(field: &'static str, raw: &str) -> Result<Map<String, Value>, RenderError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RenderError::MalformedRecordData {
            field,
            reason: format!("expected a JSON object, got {other}"),
        }),
        Err(e) => Err(RenderError::MalformedRecordData {
            field,
            reason: e.to_string(),
        }),
    }
}

fn log_malformed<T>(shop_id: Option<&str>, result: Result<T, RenderError>) -> Option<T> {
    result
        .map_err(|e| {
            debug!(
                shop_id = shop_id.unwrap_or("-"),
                error = %e,
                "ignoring malformed shop data"
            );
        })
        .ok()
}

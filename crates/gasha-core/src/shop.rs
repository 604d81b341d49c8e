//! Lenient typed view over an upstream shop record.
//!
//! The upstream API owns the record shape. The proxy passes records through
//! as raw JSON; presenters read them through [`ShopRecord::from_value`],
//! which never fails: missing or mistyped fields simply come back as `None`.

use serde::Serialize;
use serde_json::Value;

/// The fields of one upstream shop hit that this application reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShopRecord {
    pub id: Option<String>,
    /// First element of the upstream `sort` tuple (an opaque sort key).
    pub sort_key: Option<String>,
    /// Second element of the upstream `sort` tuple, in kilometres.
    pub distance_km: Option<f64>,
    pub source: ShopSource,
}

/// The nested `_source` payload of a shop hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShopSource {
    pub name: Option<String>,
    pub address1: Option<String>,
    pub tel: Option<String>,
    pub operating_hours: Option<String>,
    pub access: Option<String>,
    /// Path of the thumbnail image relative to the asset host.
    pub thumb: Option<String>,
    /// JSON-encoded per-product availability map (`"z<barcode>" -> amount`).
    pub maker: Option<String>,
    /// JSON-encoded free-form overrides (`tel`, `operating_hours`, ...).
    pub etc1: Option<String>,
}

impl ShopRecord {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let sort = value.get("sort").and_then(Value::as_array);
        let source = value.get("_source").unwrap_or(&Value::Null);

        Self {
            id: value.get("_id").and_then(json_scalar_string),
            sort_key: sort.and_then(|s| s.first()).and_then(json_scalar_string),
            distance_km: sort.and_then(|s| s.get(1)).and_then(json_number_or_string),
            source: ShopSource {
                name: text_field(source, "name"),
                address1: text_field(source, "address1"),
                tel: text_field(source, "tel"),
                operating_hours: text_field(source, "operating_hours"),
                access: text_field(source, "access"),
                thumb: text_field(source, "thumb"),
                maker: text_field(source, "maker"),
                etc1: text_field(source, "etc1"),
            },
        }
    }
}

/// Reads `key` from a JSON object as a non-empty string.
///
/// Numbers and booleans are stringified; empty strings count as absent.
#[must_use]
pub fn text_field(object: &Value, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(json_scalar_string)
        .filter(|s| !s.trim().is_empty())
}

fn json_scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_number_or_string(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_value_reads_full_hit() {
        let hit = json!({
            "_id": "shop-001",
            "sort": ["a", 1.234],
            "_source": {
                "name": "Gasha Corner Akihabara",
                "address1": "Tokyo, Chiyoda 1-1",
                "tel": "03-0000-0000",
                "operating_hours": "10:00-20:00",
                "access": "JR Akihabara 3 min",
                "thumb": "/img/shop-001.jpg",
                "maker": "{\"z4901234567894\": 3}",
                "etc1": "{}"
            }
        });

        let record = ShopRecord::from_value(&hit);
        assert_eq!(record.id.as_deref(), Some("shop-001"));
        assert_eq!(record.sort_key.as_deref(), Some("a"));
        assert_eq!(record.distance_km, Some(1.234));
        assert_eq!(
            record.source.name.as_deref(),
            Some("Gasha Corner Akihabara")
        );
        assert_eq!(record.source.thumb.as_deref(), Some("/img/shop-001.jpg"));
        assert_eq!(
            record.source.maker.as_deref(),
            Some("{\"z4901234567894\": 3}")
        );
    }

    #[test]
    fn from_value_tolerates_missing_and_mistyped_fields() {
        let record = ShopRecord::from_value(&json!({
            "_id": 42,
            "sort": "not-a-tuple",
            "_source": { "name": ["array"], "tel": "" }
        }));
        assert_eq!(record.id.as_deref(), Some("42"));
        assert!(record.distance_km.is_none());
        assert!(record.source.name.is_none());
        assert!(record.source.tel.is_none());
    }

    #[test]
    fn from_value_accepts_string_distance() {
        let record = ShopRecord::from_value(&json!({ "sort": ["k", "2.5"] }));
        assert_eq!(record.distance_km, Some(2.5));
    }

    #[test]
    fn from_value_on_non_object_is_empty() {
        assert_eq!(ShopRecord::from_value(&json!("oops")), ShopRecord::default());
    }
}

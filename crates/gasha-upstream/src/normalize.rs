//! Folds the upstream response variants into one shop list.

use serde_json::Value;

/// Which upstream response variant a body matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Search-engine style `{ "hits": { "hits": [...] } }`.
    NestedHits,
    /// Flat `{ "shops": [...] }`.
    FlatShops,
    /// Anything else; treated as no results.
    Unrecognized,
}

/// Extracts the shop list from an upstream response body.
///
/// Priority order: nested `hits.hits`, then flat `shops`, then an empty list.
/// Records are returned untouched. Only arrays count as a match, so a body
/// with `hits.hits: null` falls through to the next shape.
#[must_use]
pub fn normalize_search_response(body: Value) -> (Vec<Value>, ResponseShape) {
    let Value::Object(mut root) = body else {
        return (Vec::new(), ResponseShape::Unrecognized);
    };

    if let Some(Value::Object(hits)) = root.get_mut("hits") {
        if let Some(Value::Array(inner)) = hits.get_mut("hits") {
            return (std::mem::take(inner), ResponseShape::NestedHits);
        }
    }

    if let Some(Value::Array(shops)) = root.get_mut("shops") {
        return (std::mem::take(shops), ResponseShape::FlatShops);
    }

    (Vec::new(), ResponseShape::Unrecognized)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;

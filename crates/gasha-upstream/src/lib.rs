//! Client for the upstream commerce shop-search API.
//!
//! [`ShopSearchClient`] builds the outbound request from a barcode and a
//! search origin, and [`normalize_search_response`] folds the response
//! shapes the service is known to return into a single shop list.

pub mod client;
pub mod error;
pub mod normalize;

pub use client::{ShopSearchClient, ITEM_CODE_PREFIX};
pub use error::UpstreamError;
pub use normalize::{normalize_search_response, ResponseShape};

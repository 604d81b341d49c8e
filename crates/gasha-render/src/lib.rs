pub mod html;
pub mod sanitize;
pub mod shop_view;
pub mod text;

pub use html::{render_search_error, render_shop_list, results_header};
pub use sanitize::{escape_html, sanitize_html, sanitize_rich_text};
pub use shop_view::ShopView;
pub use text::render_shop_list_text;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("malformed {field} data: {reason}")]
    MalformedRecordData { field: &'static str, reason: String },
}

/// Builds views for a normalized shop list in upstream order.
#[must_use]
pub fn build_views(
    shops: &[Value],
    barcode: Option<&gasha_core::Barcode>,
    asset_base: &str,
) -> Vec<ShopView> {
    shops
        .iter()
        .map(|shop| ShopView::build(shop, barcode, asset_base))
        .collect()
}

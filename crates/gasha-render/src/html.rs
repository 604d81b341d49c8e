//! HTML fragments for the results list.

use std::fmt::Write as _;

use crate::sanitize::escape_html;
use crate::shop_view::ShopView;

pub const EMPTY_STATE: &str = "No shops found for this JAN code.";
pub const SEARCH_FAILED: &str = "Failed to fetch shops from external API";

#[must_use]
pub fn results_header(count: usize) -> String {
    format!("Found {count} shop(s)")
}

/// Renders the header and one card per shop, or the empty state.
#[must_use]
pub fn render_shop_list(views: &[ShopView]) -> String {
    if views.is_empty() {
        return format!(r#"<p class="empty-state">{EMPTY_STATE}</p>"#);
    }

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<h2 class="results-header">{}</h2><ul class="shop-list">"#,
        results_header(views.len())
    );
    for view in views {
        render_card(view, &mut out);
    }
    out.push_str("</ul>");
    out
}

/// Inline error banner shown in place of the list.
#[must_use]
pub fn render_search_error(message: &str) -> String {
    format!(r#"<p class="error" role="alert">{}</p>"#, escape_html(message))
}

fn render_card(view: &ShopView, out: &mut String) {
    out.push_str(r#"<li class="shop-card">"#);

    if let Some(url) = &view.thumbnail_url {
        let _ = write!(
            out,
            r#"<img class="shop-thumb" src="{}" alt="{}" loading="lazy">"#,
            escape_html(url),
            escape_html(&view.name)
        );
    }

    let _ = write!(
        out,
        r#"<div class="shop-body"><h3 class="shop-name">{}</h3><p class="shop-distance">{}</p>"#,
        escape_html(&view.name),
        escape_html(&view.distance)
    );
    if let Some(badge) = view.availability_badge() {
        let _ = write!(out, r#"<span class="badge">{}</span>"#, escape_html(&badge));
    }
    if let Some(label) = &view.label_html {
        let _ = write!(out, r#"<div class="shop-label">{label}</div>"#);
    }

    out.push_str("<dl>");
    row(out, "Phone", &escape_html(&view.phone));
    row(out, "Hours", &view.hours_html);
    if let Some(holidays) = &view.holidays_html {
        row(out, "Closed", holidays);
    }
    let address = match &view.zipcode {
        Some(zip) => format!("〒{} {}", escape_html(zip), escape_html(&view.address)),
        None => escape_html(&view.address),
    };
    row(out, "Address", &address);
    row(out, "Access", &view.access_html);
    if let Some(fax) = &view.fax {
        row(out, "Fax", &escape_html(fax));
    }
    out.push_str("</dl></div></li>");
}

/// `markup` must already be escaped or sanitized.
fn row(out: &mut String, term: &str, markup: &str) {
    let _ = write!(out, "<dt>{term}</dt><dd>{markup}</dd>");
}

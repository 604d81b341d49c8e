//! Plain-text rendering of results for terminals.

use std::fmt::Write as _;

use crate::html::{results_header, EMPTY_STATE};
use crate::sanitize::rich_text_to_plain;
use crate::shop_view::ShopView;

#[must_use]
pub fn render_shop_list_text(views: &[ShopView]) -> String {
    if views.is_empty() {
        return format!("{EMPTY_STATE}\n");
    }

    let mut out = format!("{}\n", results_header(views.len()));
    for (index, view) in views.iter().enumerate() {
        let name = if view.name.is_empty() {
            "(unnamed shop)"
        } else {
            view.name.as_str()
        };
        let _ = writeln!(out, "\n{}. {name}  [{}]", index + 1, view.distance);
        if let Some(badge) = view.availability_badge() {
            let _ = writeln!(out, "   {badge}");
        }
        field(&mut out, "Phone", &view.phone);
        field(&mut out, "Hours", &rich_text_to_plain(&view.hours_html));
        if let Some(holidays) = &view.holidays_html {
            field(&mut out, "Closed", &rich_text_to_plain(holidays));
        }
        match &view.zipcode {
            Some(zip) => field(&mut out, "Address", &format!("〒{zip} {}", view.address)),
            None => field(&mut out, "Address", &view.address),
        }
        field(&mut out, "Access", &rich_text_to_plain(&view.access_html));
        if let Some(fax) = &view.fax {
            field(&mut out, "Fax", fax);
        }
    }
    out
}

/// Multi-line values are indented under their label.
fn field(out: &mut String, label: &str, value: &str) {
    let mut lines = value.lines();
    let first = lines.next().unwrap_or_default();
    let _ = writeln!(out, "   {label:<8}{first}");
    for line in lines {
        let _ = writeln!(out, "   {:<8}{line}", "");
    }
}

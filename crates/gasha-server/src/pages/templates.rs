//! Server-rendered page markup.

use std::fmt::Write as _;

use gasha_core::{AppConfig, Barcode, Coordinates, DEFAULT_COORDINATES};
use gasha_render::escape_html;
use gasha_scanner::{LocationError, LocationStatus, PositionOptions};

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0 auto;max-width:40rem;padding:1rem}\
.location{border:1px solid #ddd;border-radius:.5rem;padding:.5rem 1rem;margin:1rem 0}\
.shop-list{list-style:none;padding:0}\
.shop-card{display:flex;gap:1rem;border-bottom:1px solid #eee;padding:1rem 0}\
.shop-thumb{width:96px;height:96px;object-fit:cover}\
.badge{background:#e60012;color:#fff;border-radius:.25rem;padding:0 .4rem}\
.error{color:#b00020}\
.scan{margin:1rem 0}\
dt{font-weight:bold}dd{margin:0 0 .5rem}";

/// Wraps `body` (trusted markup) in the document shell.
pub(super) fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html><html lang="en"><head><meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1"><title>{title}</title><style>{STYLE}</style></head><body><header><h1><a href="/">Gacha Shop Finder</a></h1></header><main>{body}</main></body></html>"#,
        title = escape_html(title),
    )
}

/// Status widget for the location carried by the request.
///
/// The "enable location" button asks the browser for a fix and fills the
/// hidden `lat`/`lng` inputs of the lookup form; nothing waits for it.
pub(super) fn location_widget(status: &LocationStatus, config: &AppConfig) -> String {
    let mut out = String::from(r#"<section class="location" id="location">"#);
    let _ = write!(
        out,
        r#"<p class="location-label" id="location-label">{}</p>"#,
        escape_html(status.label())
    );
    if let Some(detail) = status.detail() {
        let _ = write!(
            out,
            r#"<p class="location-detail" id="location-detail">{}</p>"#,
            escape_html(&detail)
        );
    } else {
        out.push_str(r#"<p class="location-detail" id="location-detail"></p>"#);
    }
    if status.retry_offered() {
        out.push_str(&enable_location_button(&PositionOptions::from_config(config)));
        out.push_str(LOCATION_SCRIPT);
    }
    out.push_str("</section>");
    out
}

/// The button carries every string and option the script needs, taken from
/// the same `LocationError`/`LocationStatus` values the server renders.
fn enable_location_button(options: &PositionOptions) -> String {
    let unknown = LocationError::Unknown(String::new()).to_string();
    let attrs = [
        ("timeout", options.timeout.as_millis().to_string()),
        ("max-age", options.maximum_age.as_millis().to_string()),
        ("high-accuracy", options.high_accuracy.to_string()),
        ("label-pending", LocationStatus::Pending.label().to_owned()),
        (
            "label-enabled",
            LocationStatus::Enabled(DEFAULT_COORDINATES).label().to_owned(),
        ),
        (
            "label-error",
            LocationStatus::Error(String::new()).label().to_owned(),
        ),
        ("msg-denied", LocationError::PermissionDenied.to_string()),
        ("msg-unavailable", LocationError::PositionUnavailable.to_string()),
        ("msg-timeout", LocationError::Timeout.to_string()),
        ("msg-unsupported", LocationError::Unsupported.to_string()),
        ("msg-unknown", unknown.trim_end_matches(": ").to_owned()),
    ];

    let mut out = String::from(r#"<button type="button" id="enable-location""#);
    for (name, value) in attrs {
        let _ = write!(out, r#" data-{name}="{}""#, escape_html(&value));
    }
    out.push_str(">Enable location</button>");
    out
}

const LOCATION_SCRIPT: &str = r#"<script>
(function(){
  var btn=document.getElementById('enable-location');
  var label=document.getElementById('location-label');
  var detail=document.getElementById('location-detail');
  if(!btn){return;}
  var d=btn.dataset;
  btn.addEventListener('click',function(){
    if(!navigator.geolocation){label.textContent=d.labelError;detail.textContent=d.msgUnsupported;return;}
    label.textContent=d.labelPending;
    navigator.geolocation.getCurrentPosition(function(pos){
      var lat=pos.coords.latitude,lng=pos.coords.longitude;
      document.querySelectorAll('input[name=lat]').forEach(function(i){i.value=lat;});
      document.querySelectorAll('input[name=lng]').forEach(function(i){i.value=lng;});
      label.textContent=d.labelEnabled;
      detail.textContent='Coordinates: '+lat.toFixed(4)+', '+lng.toFixed(4);
      btn.hidden=true;
    },function(err){
      var msg={1:d.msgDenied,2:d.msgUnavailable,3:d.msgTimeout}[err.code]||(d.msgUnknown+': '+err.message);
      label.textContent=d.labelError;detail.textContent=msg;
    },{enableHighAccuracy:d.highAccuracy==='true',timeout:+d.timeout,maximumAge:+d.maxAge});
  });
})();
</script>"#;

fn hidden_coordinates(coords: Option<Coordinates>) -> String {
    let (lat, lng) = coords.map_or((String::new(), String::new()), |c| {
        (c.lat.to_string(), c.lng.to_string())
    });
    format!(r#"<input type="hidden" name="lat" value="{lat}"><input type="hidden" name="lng" value="{lng}">"#)
}

/// Camera scan: a photo input that opens the rear camera on phones and posts
/// the picture to `/scan`. `error` is the outcome of the previous attempt.
pub(super) fn scan_form(coords: Option<Coordinates>, error: Option<&str>) -> String {
    let mut out = format!(
        r#"<form class="scan" id="scan" method="post" action="/scan" enctype="multipart/form-data"><label for="photo">Scan with camera</label> <input id="photo" name="photo" type="file" accept="image/*" capture="environment" required> {}<button type="submit">Read barcode</button>"#,
        hidden_coordinates(coords),
    );
    if let Some(error) = error {
        let _ = write!(
            out,
            r#"<p class="error" role="alert">{} You can type the JAN code below instead.</p>"#,
            escape_html(error)
        );
    }
    out.push_str("</form>");
    out.push_str(SCAN_SCRIPT);
    out
}

const SCAN_SCRIPT: &str = r"<script>
(function(){
  var photo=document.getElementById('photo');
  if(photo){photo.addEventListener('change',function(){if(photo.files.length){photo.form.submit();}});}
})();
</script>";

/// Manual JAN entry form, submitting to `/lookup`.
pub(super) fn lookup_form(coords: Option<Coordinates>, prefill: Option<&Barcode>) -> String {
    format!(
        r#"<form class="lookup" method="get" action="/lookup"><label for="barcode">JAN code</label> <input id="barcode" name="barcode" inputmode="numeric" autocomplete="off" placeholder="4901234567894" value="{}" required> {}<button type="submit">Search shops</button></form>"#,
        prefill.map(|b| escape_html(b.as_str())).unwrap_or_default(),
        hidden_coordinates(coords),
    )
}

pub(super) fn landing_body(
    status: &LocationStatus,
    coords: Option<Coordinates>,
    config: &AppConfig,
    scan_error: Option<&str>,
) -> String {
    format!(
        "<p>Scan the product barcode with your camera, or type the JAN code printed under it, to find shops nearby.</p>{}{}{}",
        scan_form(coords, scan_error),
        lookup_form(coords, None),
        location_widget(status, config),
    )
}

pub(super) fn results_body(
    barcode: &Barcode,
    status: &LocationStatus,
    coords: Option<Coordinates>,
    config: &AppConfig,
    results_html: &str,
) -> String {
    let back = coords.map_or_else(|| "/".to_owned(), |c| format!("/?{}", c.to_query()));
    format!(
        r#"<p class="scanned">JAN: <strong>{code}</strong></p>{widget}{results}<nav><a href="{back}">Back to start</a></nav>{scan}{form}"#,
        code = escape_html(barcode.as_str()),
        widget = location_widget(status, config),
        results = results_html,
        back = escape_html(&back),
        scan = scan_form(coords, None),
        form = lookup_form(coords, Some(barcode)),
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gasha_core::Environment;

    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().expect("addr"),
            log_level: "debug".to_owned(),
            upstream_base_url: "http://127.0.0.1:9".to_owned(),
            upstream_domain: "bandai_gasha_shop".to_owned(),
            upstream_timeout_secs: 5,
            upstream_user_agent: "gasha-test".to_owned(),
            asset_base_url: "https://assets.test".to_owned(),
            default_coordinates: DEFAULT_COORDINATES,
            geo_timeout: Duration::from_secs(7),
            geo_maximum_age: Duration::from_secs(30),
        }
    }

    #[test]
    fn location_script_reads_messages_from_location_error() {
        let html = location_widget(&LocationStatus::Disabled, &config());

        for (attr, message) in [
            ("msg-denied", LocationError::PermissionDenied),
            ("msg-unavailable", LocationError::PositionUnavailable),
            ("msg-timeout", LocationError::Timeout),
            ("msg-unsupported", LocationError::Unsupported),
        ] {
            let expected = format!(r#"data-{attr}="{}""#, escape_html(&message.to_string()));
            assert!(html.contains(&expected), "missing {expected}");
        }
        assert!(html.contains(
            r#"data-msg-unknown="An unknown error occurred while getting the location""#
        ));
        assert!(html.contains(r#"data-label-error="Location: Error""#));
        assert!(html.contains(r#"data-label-pending="Getting your location...""#));
    }

    #[test]
    fn location_script_has_no_hardcoded_messages() {
        assert!(!LOCATION_SCRIPT.contains("denied"));
        assert!(!LOCATION_SCRIPT.contains("Location:"));
        assert!(LOCATION_SCRIPT.contains("d.msgDenied"));
    }

    #[test]
    fn position_options_come_from_config() {
        let html = location_widget(&LocationStatus::Disabled, &config());
        assert!(html.contains(r#"data-timeout="7000""#));
        assert!(html.contains(r#"data-max-age="30000""#));
        assert!(html.contains(r#"data-high-accuracy="true""#));
    }

    #[test]
    fn scan_form_posts_photo_with_coordinates() {
        let coords = Coordinates::new(35.5, 139.5).expect("coords");
        let html = scan_form(Some(coords), None);

        assert!(html.contains(r#"action="/scan""#));
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains(r#"capture="environment""#));
        assert!(html.contains(r#"name="lat" value="35.5""#));
        assert!(!html.contains(r#"role="alert""#));
    }

    #[test]
    fn scan_error_points_to_manual_entry() {
        let html = scan_form(None, Some("No <barcode> found."));
        assert!(html.contains(
            "No &lt;barcode&gt; found. You can type the JAN code below instead."
        ));
    }
}

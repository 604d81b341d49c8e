use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(parse_environment("development").unwrap(), Environment::Development);
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(parse_environment("production").unwrap(), Environment::Production);
}

#[test]
fn parse_environment_rejects_unknown_values() {
    for raw in ["prod", "staging", "Production", ""] {
        assert!(
            matches!(
                parse_environment(raw),
                Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GASHA_ENV"
            ),
            "{raw:?}"
        );
    }
}

#[test]
fn build_app_config_fails_fast_on_mistyped_env() {
    let map: HashMap<&str, &str> = HashMap::from([("GASHA_ENV", "prod")]);
    let err = build_app_config(lookup_from_map(&map)).unwrap_err();
    assert!(err.to_string().contains("GASHA_ENV"), "{err}");
}

#[test]
fn build_app_config_uses_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();

    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.upstream_base_url, "https://bandainamco-am.co.jp");
    assert_eq!(cfg.upstream_domain, "bandai_gasha_shop");
    assert_eq!(cfg.upstream_timeout_secs, 15);
    assert_eq!(
        cfg.upstream_user_agent,
        "Mozilla/5.0 (compatible; GachaShopFinder/1.0)"
    );
    assert_eq!(cfg.asset_base_url, cfg.upstream_base_url);
    assert_eq!(cfg.default_coordinates, DEFAULT_COORDINATES);
    assert_eq!(cfg.geo_timeout, Duration::from_secs(10));
    assert_eq!(cfg.geo_maximum_age, Duration::from_secs(60));
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("GASHA_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GASHA_BIND_ADDR"),
        "expected InvalidEnvVar(GASHA_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_strips_trailing_slash_from_upstream() {
    let mut map = HashMap::new();
    map.insert("GASHA_UPSTREAM_BASE_URL", "http://127.0.0.1:9999/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.upstream_base_url, "http://127.0.0.1:9999");
    assert_eq!(cfg.asset_base_url, "http://127.0.0.1:9999");
}

#[test]
fn build_app_config_rejects_non_http_upstream() {
    let mut map = HashMap::new();
    map.insert("GASHA_UPSTREAM_BASE_URL", "ftp://example.com");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GASHA_UPSTREAM_BASE_URL"),
        "expected InvalidEnvVar(GASHA_UPSTREAM_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_asset_base_override() {
    let mut map = HashMap::new();
    map.insert("GASHA_ASSET_BASE_URL", "https://cdn.example.com");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.asset_base_url, "https://cdn.example.com");
    assert_eq!(cfg.upstream_base_url, "https://bandainamco-am.co.jp");
}

#[test]
fn build_app_config_upstream_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("GASHA_UPSTREAM_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GASHA_UPSTREAM_TIMEOUT_SECS"),
        "expected InvalidEnvVar(GASHA_UPSTREAM_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_default_coordinates_override() {
    let mut map = HashMap::new();
    map.insert("GASHA_DEFAULT_LAT", "34.6937");
    map.insert("GASHA_DEFAULT_LNG", "135.5023");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.default_coordinates,
        Coordinates {
            lat: 34.6937,
            lng: 135.5023
        }
    );
}

#[test]
fn build_app_config_default_coordinates_out_of_range() {
    let mut map = HashMap::new();
    map.insert("GASHA_DEFAULT_LAT", "123.0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { .. })),
        "expected InvalidEnvVar, got: {result:?}"
    );
}

#[test]
fn build_app_config_geo_overrides() {
    let mut map = HashMap::new();
    map.insert("GASHA_GEO_TIMEOUT_MS", "2500");
    map.insert("GASHA_GEO_MAX_AGE_MS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.geo_timeout, Duration::from_millis(2500));
    assert_eq!(cfg.geo_maximum_age, Duration::ZERO);
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let mut map = HashMap::new();
    map.insert("GASHA_LOG_LEVEL", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.log_level, "info");
}

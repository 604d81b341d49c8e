use std::net::SocketAddr;
use std::time::Duration;

use crate::app_config::{AppConfig, Environment};
use crate::{ConfigError, Coordinates, DEFAULT_COORDINATES};

const DEFAULT_UPSTREAM_BASE_URL: &str = "https://bandainamco-am.co.jp";
const DEFAULT_UPSTREAM_USER_AGENT: &str = "Mozilla/5.0 (compatible; GachaShopFinder/1.0)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so only malformed values fail.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: f64| -> Result<f64, ConfigError> {
        or_default(var, &default.to_string())
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if !(raw.starts_with("http://") || raw.starts_with("https://")) {
            return Err(invalid(var, "expected an http(s) URL".to_string()));
        }
        Ok(raw.trim_end_matches('/').to_string())
    };

    let env = parse_environment(&or_default("GASHA_ENV", "development"))?;
    let bind_addr = parse_addr("GASHA_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("GASHA_LOG_LEVEL", "info");

    let upstream_base_url = parse_url("GASHA_UPSTREAM_BASE_URL", DEFAULT_UPSTREAM_BASE_URL)?;
    let upstream_domain = or_default("GASHA_UPSTREAM_DOMAIN", "bandai_gasha_shop");
    let upstream_timeout_secs = parse_u64("GASHA_UPSTREAM_TIMEOUT_SECS", "15")?;
    let upstream_user_agent = or_default("GASHA_UPSTREAM_USER_AGENT", DEFAULT_UPSTREAM_USER_AGENT);
    let asset_base_url = parse_url("GASHA_ASSET_BASE_URL", &upstream_base_url)?;

    let default_lat = parse_f64("GASHA_DEFAULT_LAT", DEFAULT_COORDINATES.lat)?;
    let default_lng = parse_f64("GASHA_DEFAULT_LNG", DEFAULT_COORDINATES.lng)?;
    let default_coordinates = Coordinates::new(default_lat, default_lng)
        .map_err(|e| invalid("GASHA_DEFAULT_LAT/GASHA_DEFAULT_LNG", e.to_string()))?;

    let geo_timeout = Duration::from_millis(parse_u64("GASHA_GEO_TIMEOUT_MS", "10000")?);
    let geo_maximum_age = Duration::from_millis(parse_u64("GASHA_GEO_MAX_AGE_MS", "60000")?);

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        upstream_base_url,
        upstream_domain,
        upstream_timeout_secs,
        upstream_user_agent,
        asset_base_url,
        default_coordinates,
        geo_timeout,
        geo_maximum_age,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GASHA_ENV".to_string(),
            reason: format!("unknown environment `{other}`"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

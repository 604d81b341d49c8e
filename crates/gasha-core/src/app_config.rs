use std::net::SocketAddr;
use std::time::Duration;

use crate::Coordinates;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Scheme + host of the upstream commerce search service.
    pub upstream_base_url: String,
    /// Value of the upstream `domain` query parameter.
    pub upstream_domain: String,
    pub upstream_timeout_secs: u64,
    pub upstream_user_agent: String,
    /// Host that shop thumbnail paths are resolved against.
    pub asset_base_url: String,
    /// Search origin applied when a request carries no coordinates.
    pub default_coordinates: Coordinates,
    pub geo_timeout: Duration,
    pub geo_maximum_age: Duration,
}

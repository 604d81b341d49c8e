pub mod app_config;
pub mod barcode;
pub mod config;
pub mod geo;
pub mod shop;

pub use app_config::{AppConfig, Environment};
pub use barcode::Barcode;
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{Coordinates, DEFAULT_COORDINATES};
pub use shop::{ShopRecord, ShopSource};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("barcode is empty")]
    EmptyBarcode,

    #[error("invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

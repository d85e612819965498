use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod countries;
pub mod geo;
pub mod page;
pub mod restaurant;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use restaurant::{Location, Restaurant, UserRating};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

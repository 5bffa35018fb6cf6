mod app_config;
mod config;
pub mod product_list;
pub mod products;

pub use app_config::{AppConfig, Environment, WooConfig, WordPressDbConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use product_list::{load_product_list, ProductList};
pub use products::{meta_keys, MetaEntry, Product};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read product list at {path}: {source}")]
    ProductListIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse product list: {0}")]
    ProductListParse(#[from] serde_yaml::Error),

    #[error("product list validation failed: {0}")]
    Validation(String),
}

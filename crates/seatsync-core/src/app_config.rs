use std::path::PathBuf;
use std::time::Duration;

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

/// Credentials and location of the WooCommerce REST API.
#[derive(Clone)]
pub struct WooConfig {
    /// Store root, e.g. `https://shop.example.com` (no trailing slash).
    pub api_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl std::fmt::Debug for WooConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooConfig")
            .field("api_url", &self.api_url)
            .field("consumer_key", &"[redacted]")
            .field("consumer_secret", &"[redacted]")
            .finish()
    }
}

/// Connection settings for the WordPress MySQL database that holds the
/// FooEvents ticket posts.
#[derive(Clone)]
pub struct WordPressDbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub table_prefix: String,
    pub acquire_timeout_secs: u64,
}

impl std::fmt::Debug for WordPressDbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordPressDbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[redacted]")
            .field("database", &self.database)
            .field("table_prefix", &self.table_prefix)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub woo: WooConfig,
    /// `None` when no database credentials are configured; ticket sales are
    /// then reported as unavailable rather than zero.
    pub wordpress_db: Option<WordPressDbConfig>,
    pub http_timeout_secs: u64,
    pub cache_path: PathBuf,
    /// `None` means a cached snapshot never expires on its own.
    pub cache_ttl_hours: Option<u64>,
    pub products_path: PathBuf,
}

impl AppConfig {
    /// Snapshot cache TTL as a `Duration`, or `None` for "never expires".
    #[must_use]
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_hours
            .map(|hours| Duration::from_secs(hours.saturating_mul(3600)))
    }
}

use crate::app_config::{AppConfig, Environment, WooConfig, WordPressDbConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("SEATSYNC_ENV", "development"))?;
    let log_level = or_default("SEATSYNC_LOG_LEVEL", "info");

    let woo = WooConfig {
        api_url: require("WOOCOMMERCE_API_URL")?
            .trim_end_matches('/')
            .to_string(),
        consumer_key: require("WOOCOMMERCE_CONSUMER_KEY")?,
        consumer_secret: require("WOOCOMMERCE_CONSUMER_SECRET")?,
    };

    let http_timeout_secs = parse_u64("SEATSYNC_HTTP_TIMEOUT_SECS", "30")?;
    let acquire_timeout_secs = parse_u64("SEATSYNC_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let wordpress_db = {
        let user = lookup("WORDPRESS_DB_USER").ok();
        let password = lookup("WORDPRESS_DB_PASSWORD").ok();
        let database = lookup("WORDPRESS_DB_NAME").ok();

        match (user, password, database) {
            (None, None, None) => None,
            (Some(user), Some(password), Some(database)) => {
                let port_raw = or_default("WORDPRESS_DB_PORT", "3306");
                let port = port_raw
                    .parse::<u16>()
                    .map_err(|e| invalid("WORDPRESS_DB_PORT", e.to_string()))?;
                let table_prefix = or_default("WORDPRESS_TABLE_PREFIX", "wp_");
                if !is_valid_table_prefix(&table_prefix) {
                    return Err(invalid(
                        "WORDPRESS_TABLE_PREFIX",
                        format!("'{table_prefix}' must contain only ASCII letters, digits, or '_'"),
                    ));
                }
                Some(WordPressDbConfig {
                    host: or_default("WORDPRESS_DB_HOST", "localhost"),
                    port,
                    user,
                    password,
                    database,
                    table_prefix,
                    acquire_timeout_secs,
                })
            }
            _ => {
                return Err(invalid(
                    "WORDPRESS_DB_USER",
                    "WORDPRESS_DB_USER, WORDPRESS_DB_PASSWORD and WORDPRESS_DB_NAME must be set together"
                        .to_string(),
                ))
            }
        }
    };

    let cache_path = PathBuf::from(or_default("SEATSYNC_CACHE_PATH", "./woocommerce_cache.json"));
    let cache_ttl_hours = match lookup("SEATSYNC_CACHE_TTL_HOURS") {
        Ok(raw) => Some(
            raw.parse::<u64>()
                .map_err(|e| invalid("SEATSYNC_CACHE_TTL_HOURS", e.to_string()))?,
        ),
        Err(_) => None,
    };
    let products_path = PathBuf::from(or_default("SEATSYNC_PRODUCTS_PATH", "./config/products.yaml"));

    Ok(AppConfig {
        env,
        log_level,
        woo,
        wordpress_db,
        http_timeout_secs,
        cache_path,
        cache_ttl_hours,
        products_path,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SEATSYNC_ENV".to_string(),
            reason: format!("'{other}' is not one of development, test, production"),
        }),
    }
}

/// The table prefix is interpolated into SQL, so it is limited to identifier
/// characters.
fn is_valid_table_prefix(prefix: &str) -> bool {
    !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

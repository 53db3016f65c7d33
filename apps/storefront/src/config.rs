//! Storefront configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. Command-line flags override what is loaded here.
//!
//! | Variable                        | Default       | Meaning                          |
//! |---------------------------------|---------------|----------------------------------|
//! | `DOKAN_DB_PATH`                 | `./dokan.db`  | SQLite file                      |
//! | `DOKAN_LOCALE`                  | `en`          | `en` or `bn`                     |
//! | `DOKAN_STORE_NAME`              | `Dokan`       | Header line                      |
//! | `DOKAN_SHIPPING_FEE`            | `60`          | Flat delivery fee, whole taka    |
//! | `DOKAN_FREE_SHIPPING_THRESHOLD` | `2000`        | Whole taka, `none` to disable    |
//! | `DOKAN_MAX_CONNECTIONS`         | `5`           | SQLite pool size                 |

use dokan_core::{Locale, Money, ShippingPolicy};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Display language.
    pub locale: Locale,

    /// Shown above listings.
    pub store_name: String,

    /// Delivery charges for checkout.
    pub shipping: ShippingPolicy,

    /// Connection pool size.
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            db_path: PathBuf::from("./dokan.db"),
            locale: Locale::En,
            store_name: "Dokan".to_string(),
            shipping: ShippingPolicy::default(),
            max_connections: 5,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = StoreConfig::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let locale = match get("DOKAN_LOCALE") {
            Some(raw) => Locale::from_str(&raw)
                .map_err(|_| ConfigError::InvalidValue("DOKAN_LOCALE".to_string()))?,
            None => defaults.locale,
        };

        let flat_fee = match get("DOKAN_SHIPPING_FEE") {
            Some(raw) => parse_taka("DOKAN_SHIPPING_FEE", &raw)?,
            None => defaults.shipping.flat_fee,
        };

        let free_threshold = match get("DOKAN_FREE_SHIPPING_THRESHOLD") {
            Some(raw) if raw.eq_ignore_ascii_case("none") => None,
            Some(raw) => Some(parse_taka("DOKAN_FREE_SHIPPING_THRESHOLD", &raw)?),
            None => defaults.shipping.free_threshold,
        };

        let max_connections = match get("DOKAN_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("DOKAN_MAX_CONNECTIONS".to_string()))?,
            None => defaults.max_connections,
        };

        Ok(StoreConfig {
            db_path: get("DOKAN_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            locale,
            store_name: get("DOKAN_STORE_NAME").unwrap_or(defaults.store_name),
            shipping: ShippingPolicy {
                flat_fee,
                free_threshold,
            },
            max_connections,
        })
    }
}

/// Whole, non-negative taka.
fn parse_taka(key: &str, raw: &str) -> Result<Money, ConfigError> {
    raw.parse::<i64>()
        .ok()
        .filter(|taka| *taka >= 0)
        .map(|taka| Money::from_taka_poisha(taka, 0))
        .ok_or_else(|| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

//! Service configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use quotation_core::validation::validate_tax_rate_percent;
use quotation_core::{TaxRate, DEFAULT_TAX_RATE_PERCENT};
use quotation_db::DbConfig;

use crate::orders::OrderSettings;

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Tax rate stamped on new orders, whole percent
    pub tax_rate_percent: u32,

    /// How many order numbers a create may try before giving up
    pub order_number_attempts: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            database_path: PathBuf::from("./quotation.db"),
            max_connections: 5,
            tax_rate_percent: DEFAULT_TAX_RATE_PERCENT,
            order_number_attempts: 3,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn load_from(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ServiceConfig::default();

        let config = ServiceConfig {
            database_path: var("QUOTATION_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: parse_or(&var, "QUOTATION_DB_MAX_CONNECTIONS", defaults.max_connections)?,

            tax_rate_percent: parse_or(&var, "QUOTATION_TAX_RATE", defaults.tax_rate_percent)?,

            order_number_attempts: parse_or(
                &var,
                "QUOTATION_ORDER_NUMBER_ATTEMPTS",
                defaults.order_number_attempts,
            )?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("QUOTATION_DB_MAX_CONNECTIONS".to_string()));
        }
        if validate_tax_rate_percent(config.tax_rate_percent).is_err() {
            return Err(ConfigError::InvalidValue("QUOTATION_TAX_RATE".to_string()));
        }
        if config.order_number_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "QUOTATION_ORDER_NUMBER_ATTEMPTS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Pool settings for this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }

    /// Order service settings for this configuration.
    pub fn order_settings(&self) -> OrderSettings {
        OrderSettings {
            tax_rate: TaxRate::from_percent(self.tax_rate_percent),
            max_number_attempts: self.order_number_attempts,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

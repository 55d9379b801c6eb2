//! # quotation-service: Order Aggregate Service
//!
//! The in-process service an HTTP layer calls to create, update, read and
//! delete quotation orders.
//!
//! ## Module Organization
//! ```text
//! quotation_service/
//! ├── config      - Environment-driven settings (ServiceConfig)
//! ├── error       - ServiceError, ErrorCode, serialized ErrorBody
//! ├── resolver    - Customer / employee / item lookup, fail fast
//! └── orders      - OrderService: every operation in one transaction
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use quotation_service::{init_tracing, OrderService, ServiceConfig};
//! use quotation_db::Database;
//!
//! init_tracing();
//! let config = ServiceConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//! let orders = OrderService::new(db, config.order_settings());
//!
//! let order = orders.create_order(&request, &ActorRef::new("sales@example.com")).await?;
//! ```

use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod orders;
pub mod resolver;

pub use config::{ConfigError, ServiceConfig};
pub use error::{ErrorBody, ErrorCode, ServiceError, ServiceResult};
pub use orders::{OrderService, OrderSettings};
pub use resolver::{resolve_references, ResolvedReferences};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,quotation=debug,sqlx=warn";

/// Installs the global tracing subscriber for binaries.
///
/// Reads `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`]. If a global
/// subscriber is already set, it is kept and the refusal is logged to it.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if let Err(err) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        tracing::debug!(error = %err, "Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_keeps_first_subscriber() {
        init_tracing();
        init_tracing();
        tracing::info!("still logging");
    }
}

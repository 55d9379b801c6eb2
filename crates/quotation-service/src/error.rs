//! # Service Error Type
//!
//! Unified error type for order operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Order Service                      │
//! │                                                                         │
//! │  ValidationError ──► CoreError ──┐                                     │
//! │                                   ├──► ServiceError ──► code()         │
//! │  sqlx::Error ──────► DbError ────┘          │            │             │
//! │                                             │            ▼             │
//! │  Reference Resolver ── NotFound ────────────┘      ErrorCode           │
//! │  Order number retries exhausted ── Conflict        .http_status()      │
//! │                                                                         │
//! │  HTTP layer:  404 ◄─ NOT_FOUND          400 ◄─ VALIDATION_ERROR        │
//! │               409 ◄─ CONFLICT           422 ◄─ BUSINESS_LOGIC          │
//! │               500 ◄─ DATABASE_ERROR                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error aborts the enclosing transaction. Nothing is retried here
//! except the order number draw, which the service handles itself.

use serde::Serialize;
use thiserror::Error;

use quotation_core::{CoreError, EntityId, EntityKind};
use quotation_db::DbError;

/// Errors returned by the order service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A referenced customer, employee, item, or the order itself is absent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: EntityId },

    /// Input or order rule violation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// No free order number after the configured number of attempts.
    #[error("Order number {order_number} still taken after {attempts} attempts")]
    Conflict { order_number: String, attempts: u32 },

    /// Storage failure.
    #[error(transparent)]
    Database(#[from] DbError),
}

impl ServiceError {
    pub fn not_found(entity: EntityKind, id: EntityId) -> Self {
        ServiceError::NotFound { entity, id }
    }

    /// Machine-readable category of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::NotFound { .. } => ErrorCode::NotFound,
            ServiceError::Core(CoreError::Validation(_)) => ErrorCode::ValidationError,
            ServiceError::Core(_) => ErrorCode::BusinessLogic,
            ServiceError::Conflict { .. } => ErrorCode::Conflict,
            ServiceError::Database(DbError::NotFound { .. }) => ErrorCode::NotFound,
            ServiceError::Database(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<quotation_core::ValidationError> for ServiceError {
    fn from(err: quotation_core::ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Order rule violated, e.g. an illegal status change (422)
    BusinessLogic,

    /// Order number collision that survived every retry (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,
}

impl ErrorCode {
    /// The HTTP status the excluded HTTP layer answers with.
    pub const fn http_status(&self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::ValidationError => 400,
            ErrorCode::BusinessLogic => 422,
            ErrorCode::Conflict => 409,
            ErrorCode::DatabaseError => 500,
        }
    }
}

/// Serialized error body.
///
/// ```json
/// { "code": "NOT_FOUND", "message": "Customer not found: 42" }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&ServiceError> for ErrorBody {
    fn from(err: &ServiceError) -> Self {
        let message = match err {
            ServiceError::Database(DbError::NotFound { .. }) => err.to_string(),
            ServiceError::Database(db_err) => {
                // Log the actual error but return a generic message
                tracing::error!(error = %db_err, "Database operation failed");
                "Database operation failed".to_string()
            }
            _ => err.to_string(),
        };

        ErrorBody {
            code: err.code(),
            message,
        }
    }
}

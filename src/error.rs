// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
// endregion: --- Imports

pub type Result<T> = std::result::Result<T, AuctionError>;

// region:    --- Auction Error
/// Errors surfaced by the marketplace core.
///
/// Every variant is recoverable at the caller boundary and maps to a
/// user-facing message. Only `Storage` is an infrastructure failure.
#[derive(Debug, Error)]
pub enum AuctionError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("bid of {amount} must be higher than {minimum}")]
    BidTooLow { amount: i64, minimum: i64 },

    #[error("listing {0} is closed")]
    ListingClosed(i64),

    #[error("listing {0} is already closed")]
    AlreadyClosed(i64),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl AuctionError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        AuctionError::NotFound { entity, id }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AuctionError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Short machine-readable code rendered next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            AuctionError::NotFound { .. } => "NOT_FOUND",
            AuctionError::Forbidden(_) => "FORBIDDEN",
            AuctionError::Validation { .. } => "VALIDATION",
            AuctionError::BidTooLow { .. } => "LOW_BID",
            AuctionError::ListingClosed(_) => "LISTING_CLOSED",
            AuctionError::AlreadyClosed(_) => "ALREADY_CLOSED",
            AuctionError::Storage(_) => "STORAGE",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuctionError::NotFound { .. } => StatusCode::NOT_FOUND,
            AuctionError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuctionError::Validation { .. } | AuctionError::BidTooLow { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AuctionError::ListingClosed(_) | AuctionError::AlreadyClosed(_) => {
                StatusCode::CONFLICT
            }
            AuctionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Storage failures worth another attempt: lost connections, pool
    /// exhaustion, serialization failures and deadlocks.
    pub fn is_transient(&self) -> bool {
        match self {
            AuctionError::Storage(err) => match err {
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => true,
                sqlx::Error::Database(db) => {
                    matches!(db.code().as_deref(), Some("40001") | Some("40P01"))
                }
                _ => false,
            },
            _ => false,
        }
    }
}

impl IntoResponse for AuctionError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}
// endregion: --- Auction Error

// region:    --- Config Error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
// endregion: --- Config Error

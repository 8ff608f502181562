//! # Application Error Type
//!
//! What the presentation layer sees when a token could not be handled.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Scanner                            │
//! │                                                                         │
//! │  dispatch(token)                                                        │
//! │       │                                                                 │
//! │       ├── CoreError (NotInStock, InvalidPercent, bad SKU)               │
//! │       │       └──► sink.on_warning(..), dispatch returns Ok             │
//! │       │                                                                 │
//! │       ├── DbError (storage fault)                                       │
//! │       │       └──► AppError::Database, propagated to the caller         │
//! │       │                                                                 │
//! │       └── EnrichError::ChannelClosed (worker gone)                      │
//! │               └──► logged, scanning continues                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use stockscan_core::ValidationError;
use stockscan_db::DbError;
use stockscan_enrich::EnrichError;
use thiserror::Error;

/// Scanner application errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// scanner.toml could not be read or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage fault. Never a domain rule violation: those are warnings.
    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Enrich(#[from] EnrichError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Config,
    Database,
    Enrichment,
    Io,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            ErrorCode::Config => "CONFIG_ERROR",
            ErrorCode::Database => "DATABASE_ERROR",
            ErrorCode::Enrichment => "ENRICHMENT_ERROR",
            ErrorCode::Io => "IO_ERROR",
        };
        f.write_str(code)
    }
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Config(_) => ErrorCode::Config,
            AppError::Database(_) => ErrorCode::Database,
            AppError::Enrich(_) => ErrorCode::Enrichment,
            AppError::Io(_) => ErrorCode::Io,
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Result type for scanner operations.
pub type AppResult<T> = Result<T, AppError>;

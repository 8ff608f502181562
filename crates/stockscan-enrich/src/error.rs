//! # Enrichment Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Lookup      │  │    Transport    │  │     Local               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Lookup         │  │  Http           │  │  InvalidConfig          │ │
//! │  │  NotFound       │  │  HttpStatus     │  │  ChannelClosed          │ │
//! │  │                 │  │  InvalidResponse│  │  Database               │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Lookup + Transport: swallowed by the worker (warn!), catalog unchanged │
//! │  Local: logged at error!, or returned to the caller                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockscan_db::DbError;
use thiserror::Error;

/// Result type alias for enrichment operations.
pub type EnrichResult<T> = Result<T, EnrichError>;

#[derive(Debug, Error)]
pub enum EnrichError {
    // =========================================================================
    // Lookup Errors
    // =========================================================================
    /// The lookup service failed for a reason of its own.
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// The lookup service knows nothing about this SKU.
    #[error("No product data found for SKU {sku}")]
    NotFound { sku: String },

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The HTTP request itself failed (network, DNS, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The lookup endpoint returned a non-2xx status.
    #[error("Lookup returned HTTP {0}")]
    HttpStatus(u16),

    /// The response body was not a product document.
    #[error("Invalid lookup response: {0}")]
    InvalidResponse(String),

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Invalid lookup settings.
    #[error("Invalid lookup configuration: {0}")]
    InvalidConfig(String),

    /// The worker has stopped and no longer accepts requests.
    #[error("Enrichment queue is closed")]
    ChannelClosed,

    /// Catalog read or write failed.
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl EnrichError {
    /// True for failures of the external lookup, which are non-fatal and
    /// leave the catalog unchanged.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            EnrichError::Lookup(_)
                | EnrichError::NotFound { .. }
                | EnrichError::Http(_)
                | EnrichError::HttpStatus(_)
                | EnrichError::InvalidResponse(_)
        )
    }
}

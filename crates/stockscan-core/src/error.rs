//! # Error Types
//!
//! Domain-specific error types for stockscan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockscan-core errors (this file)                                     │
//! │  ├── CoreError        - Stock / protocol rule violations               │
//! │  └── ValidationError  - Token and config validation failures           │
//! │                                                                         │
//! │  stockscan-db errors (separate crate)                                  │
//! │  └── DbError          - Storage failures (wraps CoreError)             │
//! │                                                                         │
//! │  scanner app errors                                                    │
//! │  └── AppError         - What the presentation layer sees               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → AppError → UI warning    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` is recoverable: it is reported as a warning and the
//! scanner keeps going.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Stock and scanning rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Output scanned for a SKU that has nothing left.
    ///
    /// ## When This Occurs
    /// - SKU was never stocked
    /// - `qty == 0` and no open fraction remains
    ///
    /// Nothing is mutated when this is returned.
    #[error("SKU {sku} not in stock")]
    NotInStock { sku: String },

    /// Token scanned during Set mode step 2 is not a percentage.
    ///
    /// The pending SKU is kept so the operator can rescan.
    #[error("'{value}' is not a valid percentage (expected e.g. 25%)")]
    InvalidPercent { value: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::NotInStock {
            sku: "7501055363056".to_string(),
        };
        assert_eq!(err.to_string(), "SKU 7501055363056 not in stock");

        let err = CoreError::InvalidPercent {
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'abc' is not a valid percentage (expected e.g. 25%)"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

//! # Validation Module
//!
//! Token validation for StockScan.
//!
//! Scanners deliver raw strings. Everything that reaches the ledger goes
//! through here first.
//!
//! ## Usage
//! ```rust
//! use stockscan_core::validation::{parse_percent, validate_sku};
//!
//! assert_eq!(validate_sku("  7501055363056 ").unwrap(), "7501055363056");
//! assert_eq!(parse_percent("25%").unwrap().value(), 25);
//! assert!(parse_percent("abc").is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::stock::Percent;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a scanned SKU and returns it trimmed.
///
/// Only an empty token is rejected. Length and content are left alone:
/// GS1-128 and DataMatrix codes run long and carry the GS separator
/// (`\x1d`) between application identifiers.
pub fn validate_sku(sku: &str) -> ValidationResult<&str> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    Ok(sku)
}

/// Parses a percent token: 1–3 digits, optional `%`, surrounding
/// whitespace allowed (`"25"`, `"25%"`, `" 7 % "`). Values above 100 are
/// clamped.
///
/// ## Errors
/// [`CoreError::InvalidPercent`] for anything else.
pub fn parse_percent(token: &str) -> CoreResult<Percent> {
    let invalid = || CoreError::InvalidPercent {
        value: token.to_string(),
    };

    let trimmed = token.trim();
    let digits = trimmed
        .strip_suffix('%')
        .map(str::trim_end)
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let value: i64 = digits.parse().map_err(|_| invalid())?;
    Ok(Percent::clamped(value))
}

/// Validates a positive row limit.
pub fn validate_limit(field: &str, value: u32, max: u32) -> ValidationResult<u32> {
    if value == 0 || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: i64::from(max),
        });
    }
    Ok(value)
}

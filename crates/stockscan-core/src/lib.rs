//! # stockscan-core: Pure Inventory Logic for StockScan
//!
//! This crate is the **heart** of StockScan. It contains the stock
//! projection rules, the scanner's mode and dispatch state machines and the
//! undo history as pure functions and values with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StockScan Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation (console / GUI, external)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ dispatch(token)                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/scanner (Scanner)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ stockscan-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  stock  │ │ dispatch │ │  mode  │ │ history │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              stockscan-db (ledger, stock, catalog)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ScanEvent, StockEntry, CatalogEntry, ...)
//! - [`stock`] - Whole/fractional stock transitions and ledger replay
//! - [`dispatch`] - Token → action table (mode switch / command / config)
//! - [`mode`] - Active scanner mode and the Set mode two-step protocol
//! - [`history`] - Bounded undo stack
//! - [`validation`] - SKU and percent token parsing
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockscan_core::stock::{Percent, StockLevel};
//!
//! // First scan in Input mode creates one whole unit
//! let level = StockLevel::apply_input(None);
//! assert_eq!((level.qty(), level.percent().value()), (1, 100));
//!
//! // Opening it at 40% converts the whole unit into an open fraction
//! let outcome = StockLevel::apply_set(Some(level), Percent::clamped(40));
//! assert_eq!(outcome.delta, -1);
//! assert_eq!(outcome.level.qty(), 0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dispatch;
pub mod error;
pub mod history;
pub mod mode;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use dispatch::{Action, Command, ConfigAction, DispatchTable, Mappings};
pub use error::{CoreError, CoreResult, ValidationError};
pub use history::{History, HistoryEntry};
pub use mode::{Mode, ModeKind, SetStep};
pub use stock::{OutputOutcome, Percent, SetOutcome, StockLevel};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default undo history depth.
///
/// Older entries are evicted silently once the stack is full.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Default number of ledger rows shown by the `show` command.
pub const DEFAULT_SHOW_LIMIT: u32 = 5;

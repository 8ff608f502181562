//! # stockscan-db: Database Layer for StockScan
//!
//! This crate provides persistence for the three StockScan stores. It uses
//! SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StockScan Data Flow                              │
//! │                                                                         │
//! │  Scanner (dispatch thread)          Enrichment worker                   │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockscan-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌────────────────┐  ┌──────────────────┐  │   │
//! │  │   │ LedgerRepo    │  │ StockRepo      │  │ CatalogRepo      │  │   │
//! │  │   │ append        │  │ apply_input    │  │ upsert / ensure  │  │   │
//! │  │   │ last_n        │  │ apply_output   │  │ fill_missing     │  │   │
//! │  │   │ delete_last   │  │ apply_set      │  │ search / remove  │  │   │
//! │  │   │ clear_all     │  │ rebuild        │  │                  │  │   │
//! │  │   └───────┬───────┘  └───────┬────────┘  └────────┬─────────┘  │   │
//! │  │           │   no shared transactions between stores  │          │   │
//! │  └───────────┼──────────────────┼────────────────────────┼──────────┘   │
//! │              ▼                  ▼                        ▼              │
//! │         scans table         stock table            catalog table        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger is the source of truth. A crash between a ledger append and
//! the matching projection update leaves the two diverged until
//! [`Database::rebuild_stock`] is run.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockscan_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/stockscan.db")).await?;
//! let recent = db.ledger().last_n(5).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::catalog::CatalogRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::stock::StockRepository;

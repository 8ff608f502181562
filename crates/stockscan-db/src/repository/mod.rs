//! # Repository Module
//!
//! One repository per store. Each one owns its own table and never opens a
//! transaction that touches another store's table.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Scanner / worker                                                       │
//! │       │                                                                 │
//! │       │  db.ledger().append(&event)                                     │
//! │       │  db.stock().apply_output("750105...")                           │
//! │       │  db.catalog().fill_missing(sku, &info)                          │
//! │       ▼                                                                 │
//! │  LedgerRepository ── scans    (append-only, newest id = newest row)     │
//! │  StockRepository  ── stock    (read-compute-write per SKU)              │
//! │  CatalogRepository ─ catalog  (blank fields upgraded, never downgraded) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`LedgerRepository`](ledger::LedgerRepository) - Scan ledger
//! - [`StockRepository`](stock::StockRepository) - Current-stock projection
//! - [`CatalogRepository`](catalog::CatalogRepository) - Product metadata

pub mod catalog;
pub mod ledger;
pub mod stock;

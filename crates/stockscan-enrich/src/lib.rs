//! # stockscan-enrich: Catalog Enrichment for StockScan
//!
//! Fills missing catalog metadata from an external product lookup without
//! ever blocking the scanner.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Enrichment Architecture                          │
//! │                                                                         │
//! │  Scanner (dispatch thread)                                              │
//! │       │  handle.enqueue(sku, force)                                     │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 EnrichmentWorker (single tokio task)             │  │
//! │  │                                                                  │  │
//! │  │  Strict FIFO, one lookup at a time. Lookup errors are logged    │  │
//! │  │  and dropped; there is no retry until the next explicit enrich.  │  │
//! │  └──────────────┬───────────────────────────────┬───────────────────┘  │
//! │                 ▼                               ▼                       │
//! │  ┌────────────────────────────┐  ┌────────────────────────────────┐    │
//! │  │  dyn ProductLookup         │  │  CatalogRepository             │    │
//! │  │  HttpLookup / NoLookup /   │  │  fill_missing (blank fields    │    │
//! │  │  StaticLookup              │  │  only)                         │    │
//! │  └────────────────────────────┘  └────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`worker`] - Queue, worker loop and handle
//! - [`lookup`] - `ProductLookup` trait, `NoLookup`, `StaticLookup`
//! - [`http`] - HTTP lookup adapter
//! - [`config`] - `[lookup]` settings
//! - [`error`] - Enrichment error types

pub mod config;
pub mod error;
pub mod http;
pub mod lookup;
pub mod worker;

pub use config::LookupConfig;
pub use error::{EnrichError, EnrichResult};
pub use http::HttpLookup;
pub use lookup::{NoLookup, ProductLookup, StaticLookup};
pub use worker::{EnrichHandle, EnrichRequest, EnrichmentWorker};

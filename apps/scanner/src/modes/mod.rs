//! # Mode Handlers
//!
//! What a data token does depends on the active mode. Each mode lives in
//! its own file as an `impl Scanner` block.
//!
//! ```text
//! modes/
//! ├── mod.rs      ◄─── You are here (routing, shared helpers)
//! ├── input.rs    ◄─── +1 unit, ledger "input"
//! ├── output.rs   ◄─── -1 unit or open fraction, ledger "output"
//! ├── set.rs      ◄─── SKU then percent, ledger "set" with "pct|delta"
//! ├── add.rs      ◄─── register in catalog, enrich
//! └── remove.rs   ◄─── drop from catalog
//! ```
//!
//! ## Ledger-Writing Scans
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. snapshot   catalog.ensure(sku) + catalog.get(sku)                   │
//! │  2. project    stock.apply_*(sku, ...)          (own transaction)       │
//! │  3. record     ledger.append(event)             (own transaction)       │
//! │                history.push(ScanUndo)                                   │
//! │                enrichment.enqueue(sku)                                  │
//! │                                                                         │
//! │  A crash between 2 and 3 leaves the stores diverged until the next      │
//! │  rebuild_stock.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod add;
mod input;
mod output;
mod remove;
mod set;

use stockscan_core::validation::validate_sku;
use stockscan_core::{CoreError, HistoryEntry, Mode, ModeKind, NewScanEvent, ProductInfo, ScanEvent};

use crate::dispatcher::Scanner;
use crate::error::AppResult;

/// What a data token did in the active mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// One unit received.
    Input { sku: String, qty: i64 },
    /// One unit, or the open fraction, consumed.
    Output { sku: String, consumed_fraction: bool },
    /// Output scanned with nothing left. The scan is still logged.
    NotInStock { sku: String },
    /// Set mode captured a SKU and waits for a percentage.
    AwaitingPercent { sku: String },
    /// Set mode got something that is not a percentage; `sku` stays pending.
    InvalidPercent { sku: String, value: String },
    /// Set mode applied a percentage.
    Set { sku: String, pct: u8, delta: i64 },
    /// Catalog entry registered (`created` is false if it already existed).
    Added { sku: String, created: bool },
    /// Catalog entry removed (`existed` is false if there was none).
    Removed { sku: String, existed: bool },
    /// Token rejected before touching any store.
    Invalid { reason: String },
}

impl Scanner {
    /// Routes a data token to the active mode.
    pub(crate) async fn process_code(&mut self, token: &str) -> AppResult<ScanOutcome> {
        if let Mode::Set(protocol) = &mut self.mode {
            let step = protocol.advance(token);
            return self.scan_set(token, step).await;
        }

        let sku = match validate_sku(token) {
            Ok(sku) => sku,
            Err(e) => return Ok(self.rejected(e.into())),
        };

        match self.mode.kind() {
            ModeKind::Input => self.scan_input(sku).await,
            ModeKind::Output => self.scan_output(sku).await,
            ModeKind::Add => self.scan_add(sku).await,
            ModeKind::Remove => self.scan_remove(sku).await,
            // handled above
            ModeKind::Set => Ok(ScanOutcome::Invalid {
                reason: "set mode out of sync".to_string(),
            }),
        }
    }

    /// Catalog metadata to freeze into a ledger row. Registers unknown SKUs.
    pub(crate) async fn snapshot(&self, sku: &str) -> AppResult<ProductInfo> {
        let catalog = self.db.catalog();
        catalog.ensure(sku).await?;
        Ok(catalog
            .get(sku)
            .await?
            .map(|entry| entry.info())
            .unwrap_or_default())
    }

    /// Appends a ledger row and does the bookkeeping every logged scan
    /// shares.
    pub(crate) async fn record(&mut self, event: NewScanEvent) -> AppResult<ScanEvent> {
        let row = self.db.ledger().append(&event).await?;

        self.history.push(HistoryEntry::ScanUndo {
            sku: row.sku.clone(),
            kind: row.kind,
        });
        self.enqueue(&row.sku, false);
        self.last_sku = Some(row.sku.clone());

        Ok(row)
    }

    /// Reports a domain rule violation as a warning.
    pub(crate) fn rejected(&self, error: CoreError) -> ScanOutcome {
        let reason = error.to_string();
        self.sink.on_warning(&reason);
        ScanOutcome::Invalid { reason }
    }
}

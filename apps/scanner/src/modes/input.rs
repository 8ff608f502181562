//! Input mode: every scan receives one whole unit.

use tracing::info;

use stockscan_core::{EventKind, NewScanEvent};

use super::ScanOutcome;
use crate::dispatcher::Scanner;
use crate::error::AppResult;

impl Scanner {
    pub(crate) async fn scan_input(&mut self, sku: &str) -> AppResult<ScanOutcome> {
        let snapshot = self.snapshot(sku).await?;
        let entry = self.db.stock().apply_input(sku, &snapshot).await?;

        self.record(NewScanEvent::new(sku, EventKind::Input).with_snapshot(snapshot))
            .await?;

        info!(sku = %sku, stock = %entry.display_quantity(), "Input");
        Ok(ScanOutcome::Input {
            sku: sku.to_string(),
            qty: entry.qty,
        })
    }
}

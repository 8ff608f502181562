//! Output mode: every scan consumes the open fraction, else one whole unit.
//!
//! A scan with nothing left to consume is still written to the ledger, it
//! records the attempt. The projection is not touched and the operator is
//! warned.

use tracing::info;

use stockscan_core::{EventKind, NewScanEvent};
use stockscan_db::DbError;

use super::ScanOutcome;
use crate::dispatcher::Scanner;
use crate::error::AppResult;

impl Scanner {
    pub(crate) async fn scan_output(&mut self, sku: &str) -> AppResult<ScanOutcome> {
        let snapshot = self.snapshot(sku).await?;

        let outcome = match self.db.stock().apply_output(sku).await {
            Ok(outcome) => {
                info!(
                    sku = %sku,
                    stock = %outcome.level,
                    consumed_fraction = outcome.consumed_fraction,
                    "Output"
                );
                ScanOutcome::Output {
                    sku: sku.to_string(),
                    consumed_fraction: outcome.consumed_fraction,
                }
            }
            Err(DbError::Core(e)) => {
                self.sink.on_warning(&e.to_string());
                ScanOutcome::NotInStock {
                    sku: sku.to_string(),
                }
            }
            Err(e) => return Err(e.into()),
        };

        self.record(NewScanEvent::new(sku, EventKind::Output).with_snapshot(snapshot))
            .await?;

        Ok(outcome)
    }
}

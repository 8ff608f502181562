//! # Set Mode
//!
//! Two scans per record: the SKU, then how much of the opened unit is left
//! (`"40"` or `"40%"`, clamped to 0..=100).
//!
//! ```text
//!   scan "123"  ──► AwaitingPercent { sku: "123" }     (no mutation)
//!   scan "abc"  ──► InvalidPercent, "123" still pending
//!   scan "40%"  ──► stock.apply_set("123", 40)
//!                   ledger "set" with aux "40|-1"
//! ```

use tracing::info;

use stockscan_core::stock::set_aux;
use stockscan_core::{CoreError, CoreResult, EventKind, NewScanEvent, SetStep};

use super::ScanOutcome;
use crate::dispatcher::Scanner;
use crate::error::AppResult;

impl Scanner {
    pub(crate) async fn scan_set(
        &mut self,
        token: &str,
        step: CoreResult<SetStep>,
    ) -> AppResult<ScanOutcome> {
        match step {
            Ok(SetStep::AwaitingPercent { sku }) => {
                self.sink
                    .on_info(&format!("{}: scan the remaining percentage", sku));
                Ok(ScanOutcome::AwaitingPercent { sku })
            }

            Ok(SetStep::Apply { sku, pct }) => {
                let snapshot = self.snapshot(&sku).await?;
                let outcome = self.db.stock().apply_set(&sku, pct, &snapshot).await?;

                let event = NewScanEvent::new(&sku, EventKind::Set)
                    .with_aux(set_aux(pct, outcome.delta))
                    .with_snapshot(snapshot);
                self.record(event).await?;

                info!(sku = %sku, pct = pct.value(), delta = outcome.delta, "Set");
                Ok(ScanOutcome::Set {
                    sku,
                    pct: pct.value(),
                    delta: outcome.delta,
                })
            }

            Err(e @ CoreError::InvalidPercent { .. }) => {
                let sku = self.mode.pending_sku().unwrap_or_default().to_string();
                self.sink
                    .on_warning(&format!("{}, rescan the percentage for {}", e, sku));
                Ok(ScanOutcome::InvalidPercent {
                    sku,
                    value: token.to_string(),
                })
            }

            Err(e) => Ok(self.rejected(e)),
        }
    }
}

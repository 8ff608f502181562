//! Remove mode: deletes the catalog entry. Ledger rows and stock for the
//! SKU survive.

use tracing::info;

use super::ScanOutcome;
use crate::dispatcher::Scanner;
use crate::error::AppResult;

impl Scanner {
    pub(crate) async fn scan_remove(&mut self, sku: &str) -> AppResult<ScanOutcome> {
        let existed = self.db.catalog().remove(sku).await?;

        if !existed {
            self.sink.on_warning(&format!("{} is not in the catalog", sku));
        }

        info!(sku = %sku, existed, "Catalog remove");
        Ok(ScanOutcome::Removed {
            sku: sku.to_string(),
            existed,
        })
    }
}

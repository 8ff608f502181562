//! Add mode: registers the SKU in the catalog and asks for enrichment.
//! Ledger and stock are left alone.

use tracing::info;

use super::ScanOutcome;
use crate::dispatcher::Scanner;
use crate::error::AppResult;

impl Scanner {
    pub(crate) async fn scan_add(&mut self, sku: &str) -> AppResult<ScanOutcome> {
        let created = self.db.catalog().ensure(sku).await?;
        self.enqueue(sku, false);
        self.last_sku = Some(sku.to_string());

        if !created {
            self.sink.on_info(&format!("{} already in catalog", sku));
        }

        info!(sku = %sku, created, "Catalog add");
        Ok(ScanOutcome::Added {
            sku: sku.to_string(),
            created,
        })
    }
}

//! `show` and `stock`: read-only listings, also printed through the sink.

use stockscan_core::StockOrder;

use super::CommandOutcome;
use crate::dispatcher::Scanner;
use crate::error::AppResult;

impl Scanner {
    /// The last `show_limit` ledger rows.
    pub(crate) async fn show(&self) -> AppResult<CommandOutcome> {
        let rows = self.db.ledger().last_n(self.show_limit).await?;

        for row in &rows {
            let label = row.product.as_deref().unwrap_or("-");
            let line = match &row.aux {
                Some(aux) => format!("#{} {} {} {} [{}]", row.id, row.kind, row.sku, label, aux),
                None => format!("#{} {} {} {}", row.id, row.kind, row.sku, label),
            };
            self.sink.on_info(&line);
        }

        Ok(CommandOutcome::Shown(rows))
    }

    pub(crate) async fn stock_listing(&self) -> AppResult<CommandOutcome> {
        let entries = self.db.stock().list_all(StockOrder::default()).await?;

        if entries.is_empty() {
            self.sink.on_info("no stock");
        }
        for entry in &entries {
            let label = entry.product.as_deref().unwrap_or("-");
            self.sink
                .on_info(&format!("{:>10}  {}  {}", entry.display_quantity(), entry.sku, label));
        }

        Ok(CommandOutcome::StockListed(entries))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stockscan_db::{Database, DbConfig};
    use stockscan_enrich::{EnrichmentWorker, NoLookup};

    use super::*;
    use crate::config::AppConfig;
    use crate::events::NoOpSink;
    use crate::Dispatched;

    #[tokio::test]
    async fn test_show_respects_limit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (_worker, handle) = EnrichmentWorker::new(db.catalog(), Arc::new(NoLookup));
        let mut config = AppConfig::default();
        config.scanner.show_limit = 2;
        let mut scanner = Scanner::new(&config, db, handle, Arc::new(NoOpSink));

        for sku in ["a", "b", "c"] {
            scanner.dispatch(sku).await.unwrap();
        }

        let Dispatched::Command(CommandOutcome::Shown(rows)) =
            scanner.dispatch("show").await.unwrap()
        else {
            panic!("expected show output");
        };
        let skus: Vec<&str> = rows.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_stock_lists_highest_quantity_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (_worker, handle) = EnrichmentWorker::new(db.catalog(), Arc::new(NoLookup));
        let mut scanner = Scanner::new(&AppConfig::default(), db, handle, Arc::new(NoOpSink));

        for sku in ["a", "b", "b"] {
            scanner.dispatch(sku).await.unwrap();
        }

        let Dispatched::Command(CommandOutcome::StockListed(entries)) =
            scanner.dispatch("stock").await.unwrap()
        else {
            panic!("expected stock listing");
        };
        assert_eq!(entries[0].sku, "b");
        assert_eq!(entries[0].qty, 2);
        assert_eq!(entries[1].sku, "a");
    }
}

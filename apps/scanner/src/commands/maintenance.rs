//! # Maintenance Commands
//!
//! Both commands reach this file only after the two-scan confirmation in
//! the dispatcher.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rebuild_stock   projection := replay(ledger)                           │
//! │                  qty = inputs - outputs, open fractions flattened       │
//! │                                                                         │
//! │  clear_all       ledger := ∅, projection := ∅, history := ∅             │
//! │                  catalog is kept                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{info, warn};

use super::CommandOutcome;
use crate::dispatcher::Scanner;
use crate::error::AppResult;

impl Scanner {
    pub(crate) async fn rebuild_stock(&mut self) -> AppResult<CommandOutcome> {
        let rows = self.db.rebuild_stock().await?;
        self.sink
            .on_info(&format!("stock rebuilt from ledger: {} items", rows));
        Ok(CommandOutcome::Rebuilt { rows })
    }

    pub(crate) async fn clear_all(&mut self) -> AppResult<CommandOutcome> {
        let scans = self.db.ledger().clear_all().await?;
        let stock = self.db.stock().clear().await?;

        // remaining scan undos would point at rows that no longer exist
        self.history.clear();

        warn!(scans, stock, "Ledger and stock cleared");
        info!("Undo history reset");
        self.sink
            .on_info(&format!("cleared {} scans and {} stock rows", scans, stock));
        Ok(CommandOutcome::Cleared { scans, stock })
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
    async fn test_rebuild_flattens_open_fraction() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (_worker, handle) = EnrichmentWorker::new(db.catalog(), Arc::new(NoLookup));
        let mut scanner = Scanner::new(&AppConfig::default(), db, handle, Arc::new(NoOpSink));

        for token in ["K", "K", "set", "K", "30"] {
            scanner.dispatch(token).await.unwrap();
        }
        let entry = scanner.stock().get("K").await.unwrap().unwrap();
        assert_eq!((entry.qty, entry.percent), (1, 30));

        scanner.dispatch("rebuild_stock").await.unwrap();
        let result = scanner.dispatch("rebuild_stock").await.unwrap();

        assert_eq!(result, Dispatched::Command(CommandOutcome::Rebuilt { rows: 1 }));
        let entry = scanner.stock().get("K").await.unwrap().unwrap();
        assert_eq!((entry.qty, entry.percent), (2, 100));
    }

    #[tokio::test]
    async fn test_clear_all_keeps_catalog() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (_worker, handle) = EnrichmentWorker::new(db.catalog(), Arc::new(NoLookup));
        let mut scanner = Scanner::new(&AppConfig::default(), db, handle, Arc::new(NoOpSink));

        scanner.dispatch("K").await.unwrap();
        scanner.dispatch("clear_all").await.unwrap();
        scanner.dispatch("clear_all").await.unwrap();

        assert_eq!(scanner.ledger().count().await.unwrap(), 0);
        assert!(scanner.stock().get("K").await.unwrap().is_none());
        assert!(scanner.catalog().get("K").await.unwrap().is_some());
        assert!(scanner.history().is_empty());
    }
}

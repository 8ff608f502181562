//! # Enrichment Worker
//!
//! One background task that drains the enrichment queue strictly in
//! submission order.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Enrichment Worker Flow                             │
//! │                                                                         │
//! │  EnrichHandle::enqueue(sku, force)      (never blocks the scanner)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────┐                                       │
//! │  │ unbounded mpsc queue (FIFO)  │                                       │
//! │  └──────────────┬───────────────┘                                       │
//! │                 ▼                                                       │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  process(request)                                               │   │
//! │  │                                                                 │   │
//! │  │  1. entry = catalog.get(sku)                                    │   │
//! │  │  2. skip unless force || entry missing || product blank         │   │
//! │  │  3. info = lookup.lookup(sku, force)   ── failure: warn!, skip  │   │
//! │  │  4. catalog.fill_missing(sku, info)    (blank fields only,      │   │
//! │  │                                         existing rows only)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  STOPPING:                                                              │
//! │  • every handle dropped → queued items drained, then exit               │
//! │  • shutdown()           → queued items abandoned, in-flight finishes    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `force_refresh` decides whether the lookup is queried again. It never
//! lets the answer overwrite a field the catalog already has.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use stockscan_db::CatalogRepository;

use crate::error::{EnrichError, EnrichResult};
use crate::lookup::ProductLookup;

/// One queued enrichment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichRequest {
    pub sku: String,
    pub force_refresh: bool,
}

// =============================================================================
// Handle
// =============================================================================

/// Producer side of the queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EnrichHandle {
    queue_tx: mpsc::UnboundedSender<EnrichRequest>,
    shutdown_tx: mpsc::Sender<()>,
}

impl EnrichHandle {
    /// Queues a SKU for enrichment. Returns immediately.
    ///
    /// ## Errors
    /// [`EnrichError::ChannelClosed`] once the worker has stopped.
    pub fn enqueue(&self, sku: impl Into<String>, force_refresh: bool) -> EnrichResult<()> {
        self.queue_tx
            .send(EnrichRequest {
                sku: sku.into(),
                force_refresh,
            })
            .map_err(|_| EnrichError::ChannelClosed)
    }

    /// Stops the worker without draining the queue.
    pub async fn shutdown(&self) -> EnrichResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| EnrichError::ChannelClosed)
    }

    /// True once the worker has stopped.
    pub fn is_closed(&self) -> bool {
        self.queue_tx.is_closed()
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Consumer side of the queue. Owns its own catalog handle.
pub struct EnrichmentWorker {
    catalog: CatalogRepository,
    lookup: Arc<dyn ProductLookup>,
    queue_rx: mpsc::UnboundedReceiver<EnrichRequest>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl EnrichmentWorker {
    /// Creates a worker and the handle that feeds it.
    pub fn new(
        catalog: CatalogRepository,
        lookup: Arc<dyn ProductLookup>,
    ) -> (Self, EnrichHandle) {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = EnrichmentWorker {
            catalog,
            lookup,
            queue_rx,
            shutdown_rx,
        };

        (worker, EnrichHandle { queue_tx, shutdown_tx })
    }

    /// Creates a worker and spawns it on the current runtime.
    pub fn spawn(
        catalog: CatalogRepository,
        lookup: Arc<dyn ProductLookup>,
    ) -> (EnrichHandle, JoinHandle<()>) {
        let (worker, handle) = EnrichmentWorker::new(catalog, lookup);
        (handle, tokio::spawn(worker.run()))
    }

    /// Runs until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!("Enrichment worker starting");

        loop {
            tokio::select! {
                biased;

                // closed shutdown channel just disables this branch
                Some(()) = self.shutdown_rx.recv() => {
                    info!("Enrichment worker shutting down");
                    break;
                }

                request = self.queue_rx.recv() => match request {
                    Some(request) => self.handle(request).await,
                    None => {
                        debug!("Enrichment queue closed and drained");
                        break;
                    }
                },
            }
        }

        info!("Enrichment worker stopped");
    }

    async fn handle(&self, request: EnrichRequest) {
        match self.process(&request).await {
            Ok(true) => debug!(sku = %request.sku, "Catalog enriched"),
            Ok(false) => {}
            Err(e) if e.is_lookup_failure() => {
                warn!(sku = %request.sku, error = %e, "Product lookup failed");
            }
            Err(e) => {
                error!(sku = %request.sku, error = %e, "Enrichment failed");
            }
        }
    }

    /// Handles one request. Returns true when the lookup was queried and
    /// its answer merged.
    ///
    /// An entry removed while its request was queued stays removed: the
    /// answer is dropped instead of recreating the row.
    pub async fn process(&self, request: &EnrichRequest) -> EnrichResult<bool> {
        let entry = self.catalog.get(&request.sku).await?;
        let needed = request.force_refresh
            || entry.as_ref().map_or(true, |entry| entry.needs_enrichment());

        if !needed {
            return Ok(false);
        }

        let info = self
            .lookup
            .lookup(&request.sku, request.force_refresh)
            .await?;

        if info.is_empty() {
            return Ok(false);
        }

        let filled = self.catalog.fill_missing(&request.sku, &info).await?;
        if !filled {
            debug!(sku = %request.sku, "No catalog entry to fill, answer dropped");
        }
        Ok(filled)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::StaticLookup;
    use stockscan_core::ProductInfo;
    use stockscan_db::{Database, DbConfig};

    fn request(sku: &str, force_refresh: bool) -> EnrichRequest {
        EnrichRequest {
            sku: sku.to_string(),
            force_refresh,
        }
    }

    async fn setup(lookup: StaticLookup) -> (Database, Arc<StaticLookup>, EnrichmentWorker) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let lookup = Arc::new(lookup);
        let (worker, _handle) = EnrichmentWorker::new(db.catalog(), lookup.clone());
        (db, lookup, worker)
    }

    #[tokio::test]
    async fn test_empty_entry_is_looked_up() {
        let (db, lookup, worker) =
            setup(StaticLookup::new().with("1", ProductInfo::named("Flour"))).await;
        db.catalog().ensure("1").await.unwrap();

        assert!(worker.process(&request("1", false)).await.unwrap());

        let entry = db.catalog().get("1").await.unwrap().unwrap();
        assert_eq!(entry.product.as_deref(), Some("Flour"));
        assert_eq!(lookup.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_removed_entry_is_not_recreated() {
        let (db, lookup, worker) =
            setup(StaticLookup::new().with("1", ProductInfo::named("Flour"))).await;
        db.catalog().ensure("1").await.unwrap();
        db.catalog().remove("1").await.unwrap();

        assert!(!worker.process(&request("1", false)).await.unwrap());

        assert!(db.catalog().get("1").await.unwrap().is_none());
        assert_eq!(db.catalog().count().await.unwrap(), 0);
        assert_eq!(lookup.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_named_entry_is_skipped_without_force() {
        let (db, lookup, worker) =
            setup(StaticLookup::new().with("1", ProductInfo::named("Other"))).await;
        db.catalog().upsert("1", &ProductInfo::named("Flour")).await.unwrap();

        assert!(!worker.process(&request("1", false)).await.unwrap());
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn test_force_requeries_but_never_overwrites() {
        let answer = ProductInfo {
            product: Some("Other".to_string()),
            brand: Some("Acme".to_string()),
            ..Default::default()
        };
        let (db, lookup, worker) = setup(StaticLookup::new().with("1", answer)).await;
        db.catalog().upsert("1", &ProductInfo::named("Flour")).await.unwrap();

        assert!(worker.process(&request("1", true)).await.unwrap());

        let entry = db.catalog().get("1").await.unwrap().unwrap();
        assert_eq!(entry.product.as_deref(), Some("Flour"));
        assert_eq!(entry.brand.as_deref(), Some("Acme"));
        assert_eq!(lookup.calls(), vec![("1".to_string(), true)]);
    }

    #[tokio::test]
    async fn test_lookup_failure_leaves_catalog_unchanged() {
        let (db, lookup, worker) =
            setup(StaticLookup::new().with("1", ProductInfo::named("Flour"))).await;
        db.catalog().ensure("1").await.unwrap();
        lookup.set_failing(true);

        let err = worker.process(&request("1", false)).await.unwrap_err();
        assert!(err.is_lookup_failure());
        assert!(db.catalog().get("1").await.unwrap().unwrap().info().is_empty());
    }

    #[tokio::test]
    async fn test_dropping_handles_drains_queue_in_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let lookup = Arc::new(
            StaticLookup::new()
                .with("a", ProductInfo::named("A"))
                .with("c", ProductInfo::named("C")),
        );
        for sku in ["a", "b", "c"] {
            db.catalog().ensure(sku).await.unwrap();
        }
        let (handle, task) = EnrichmentWorker::spawn(db.catalog(), lookup.clone());

        handle.enqueue("a", false).unwrap();
        handle.enqueue("b", false).unwrap(); // unknown: swallowed
        handle.enqueue("c", true).unwrap();
        drop(handle);
        task.await.unwrap();

        assert_eq!(
            lookup.calls(),
            vec![
                ("a".to_string(), false),
                ("b".to_string(), false),
                ("c".to_string(), true)
            ]
        );
        let named = db.catalog().search("", 10).await.unwrap();
        assert_eq!(named.iter().filter(|e| !e.needs_enrichment()).count(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_stops_worker() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (handle, task) = EnrichmentWorker::spawn(db.catalog(), Arc::new(StaticLookup::new()));

        handle.shutdown().await.unwrap();
        task.await.unwrap();

        assert!(handle.is_closed());
        assert!(matches!(
            handle.enqueue("1", false),
            Err(EnrichError::ChannelClosed)
        ));
    }
}

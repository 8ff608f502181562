//! # Product Lookup
//!
//! The external product lookup is an injected collaborator. The worker only
//! sees `Arc<dyn ProductLookup>`, so the HTTP adapter, a fixed table or
//! nothing at all can stand behind it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use stockscan_core::ProductInfo;

use crate::error::{EnrichError, EnrichResult};

/// External source of product metadata.
///
/// Implementations may be slow or unreliable. Timeouts are their own
/// business; the worker waits for whatever they return.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Fetches metadata for `sku`. `force_refresh` asks the service to
    /// bypass any cache it keeps.
    async fn lookup(&self, sku: &str, force_refresh: bool) -> EnrichResult<ProductInfo>;
}

// =============================================================================
// No Lookup
// =============================================================================

/// Used when no lookup service is configured. Always answers with empty
/// metadata, so the catalog stays as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

#[async_trait]
impl ProductLookup for NoLookup {
    async fn lookup(&self, _sku: &str, _force_refresh: bool) -> EnrichResult<ProductInfo> {
        Ok(ProductInfo::default())
    }
}

// =============================================================================
// Static Lookup
// =============================================================================

/// Map-backed lookup for tests and offline demos.
///
/// Records every call so tests can assert on what was queried.
///
/// ```rust
/// use stockscan_core::ProductInfo;
/// use stockscan_enrich::StaticLookup;
///
/// let lookup = StaticLookup::new().with("7501", ProductInfo::named("Coffee"));
/// assert!(lookup.calls().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct StaticLookup {
    products: HashMap<String, ProductInfo>,
    failing: AtomicBool,
    calls: Mutex<Vec<(String, bool)>>,
}

impl StaticLookup {
    pub fn new() -> Self {
        StaticLookup::default()
    }

    /// Adds a product answer.
    pub fn with(mut self, sku: impl Into<String>, info: ProductInfo) -> Self {
        self.products.insert(sku.into(), info);
        self
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// `(sku, force_refresh)` of every call so far, in order.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl ProductLookup for StaticLookup {
    async fn lookup(&self, sku: &str, force_refresh: bool) -> EnrichResult<ProductInfo> {
        match self.calls.lock() {
            Ok(mut calls) => calls.push((sku.to_string(), force_refresh)),
            Err(poisoned) => poisoned.into_inner().push((sku.to_string(), force_refresh)),
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(EnrichError::Lookup("lookup service unavailable".to_string()));
        }

        self.products
            .get(sku)
            .cloned()
            .ok_or_else(|| EnrichError::NotFound {
                sku: sku.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_lookup_answers_and_records() {
        let lookup = StaticLookup::new().with("1", ProductInfo::named("Salt"));

        let info = lookup.lookup("1", false).await.unwrap();
        assert_eq!(info.product.as_deref(), Some("Salt"));

        let err = lookup.lookup("2", true).await.unwrap_err();
        assert!(matches!(err, EnrichError::NotFound { .. }));

        assert_eq!(
            lookup.calls(),
            vec![("1".to_string(), false), ("2".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn test_static_lookup_can_fail() {
        let lookup = StaticLookup::new().with("1", ProductInfo::named("Salt"));
        lookup.set_failing(true);
        assert!(lookup.lookup("1", false).await.unwrap_err().is_lookup_failure());
    }

    #[tokio::test]
    async fn test_no_lookup_is_empty() {
        assert!(NoLookup.lookup("1", true).await.unwrap().is_empty());
    }
}

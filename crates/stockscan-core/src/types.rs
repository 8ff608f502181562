//! # Domain Types
//!
//! Core domain types used throughout StockScan.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ScanEvent     │   │   StockEntry    │   │  CatalogEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (sequence)  │   │  sku (unique)   │   │  sku (unique)   │       │
//! │  │  sku            │   │  qty  (≥ 0)     │   │  product        │       │
//! │  │  kind           │   │  percent 0..100 │   │  brand          │       │
//! │  │  aux "pct|Δ"    │   │  mirrored meta  │   │  category       │       │
//! │  │  snapshot meta  │   │                 │   │  image, url     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │        Ledger              Projection             Catalog              │
//! │   (source of truth)    (derived, rebuildable)  (enriched async)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Ledger rows freeze product metadata at scan time, so the audit trail
//! stays readable even after the catalog entry is refreshed or removed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::stock::{Percent, StockLevel};

// =============================================================================
// Event Kind
// =============================================================================

/// The kind of a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// One whole unit received.
    Input,
    /// One unit (or the open fraction) consumed.
    Output,
    /// A unit opened / re-measured at some percentage.
    Set,
    /// Catalog removal marker. Never counted by rebuild.
    Remove,
}

impl EventKind {
    /// Lowercase storage name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventKind::Input => "input",
            EventKind::Output => "output",
            EventKind::Set => "set",
            EventKind::Remove => "remove",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "input" => Ok(EventKind::Input),
            "output" => Ok(EventKind::Output),
            "set" => Ok(EventKind::Set),
            "remove" => Ok(EventKind::Remove),
            other => Err(ValidationError::InvalidFormat {
                field: "kind".to_string(),
                reason: format!("unknown event kind '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Product Info
// =============================================================================

/// Product metadata as returned by a lookup or carried as a snapshot.
///
/// Every field is optional. Empty strings are treated the same as `None`
/// when deciding whether a catalog field still needs filling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInfo {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ProductInfo {
    /// Info with only a product name.
    pub fn named(product: impl Into<String>) -> Self {
        ProductInfo {
            product: Some(product.into()),
            ..Default::default()
        }
    }

    /// True when no field carries a non-empty value.
    pub fn is_empty(&self) -> bool {
        [
            &self.product,
            &self.brand,
            &self.category,
            &self.image,
            &self.url,
        ]
        .iter()
        .all(|field| is_blank(field))
    }

    /// Fills every blank field of `self` from `other`; non-blank fields win.
    pub fn fill_from(&mut self, other: &ProductInfo) {
        fill(&mut self.product, &other.product);
        fill(&mut self.brand, &other.brand);
        fill(&mut self.category, &other.category);
        fill(&mut self.image, &other.image);
        fill(&mut self.url, &other.url);
    }
}

/// `None` or an all-whitespace string.
pub fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn fill(target: &mut Option<String>, source: &Option<String>) {
    if is_blank(target) && !is_blank(source) {
        *target = source.clone();
    }
}

// =============================================================================
// Scan Event (Ledger Row)
// =============================================================================

/// One row of the append-only scan ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ScanEvent {
    /// Monotonic sequence number (highest = most recent).
    pub id: i64,
    pub sku: String,
    pub kind: EventKind,
    /// Kind-specific payload. `set` rows carry `"<pct>|<delta>"`.
    pub aux: Option<String>,
    pub product: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl ScanEvent {
    /// The product snapshot frozen into this row.
    pub fn snapshot(&self) -> ProductInfo {
        ProductInfo {
            product: self.product.clone(),
            brand: self.brand.clone(),
            category: self.category.clone(),
            image: self.image.clone(),
            url: self.url.clone(),
        }
    }
}

/// A ledger row that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScanEvent {
    pub sku: String,
    pub kind: EventKind,
    pub aux: Option<String>,
    pub snapshot: ProductInfo,
}

impl NewScanEvent {
    pub fn new(sku: impl Into<String>, kind: EventKind) -> Self {
        NewScanEvent {
            sku: sku.into(),
            kind,
            aux: None,
            snapshot: ProductInfo::default(),
        }
    }

    pub fn with_aux(mut self, aux: impl Into<String>) -> Self {
        self.aux = Some(aux.into());
        self
    }

    pub fn with_snapshot(mut self, snapshot: ProductInfo) -> Self {
        self.snapshot = snapshot;
        self
    }
}

// =============================================================================
// Stock Entry (Projection Row)
// =============================================================================

/// Current stock for one SKU.
///
/// ## Invariants
/// - `qty >= 0`
/// - `0 <= percent <= 100`
/// - `percent == 100` means no open fraction; `0 < percent < 100` means
///   exactly one partially used unit is outstanding on top of `qty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockEntry {
    pub sku: String,
    pub qty: i64,
    pub percent: u8,
    pub product: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl StockEntry {
    /// The `(qty, percent)` state machine value of this row.
    pub fn level(&self) -> StockLevel {
        StockLevel::new(self.qty, Percent::clamped(i64::from(self.percent)))
    }

    /// True when a partially used unit is outstanding.
    pub fn has_open_fraction(&self) -> bool {
        self.level().has_open_fraction()
    }

    /// Human readable quantity: `"3"` or `"2 + 40%"`.
    pub fn display_quantity(&self) -> String {
        self.level().to_string()
    }

    /// Mirrored product metadata.
    pub fn info(&self) -> ProductInfo {
        ProductInfo {
            product: self.product.clone(),
            brand: self.brand.clone(),
            category: self.category.clone(),
            image: self.image.clone(),
            url: self.url.clone(),
        }
    }
}

/// Sort order for projection listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockOrder {
    /// Highest quantity first (default listing).
    #[default]
    QuantityDesc,
    /// Lowest quantity first (what is running out).
    QuantityAsc,
    /// Alphabetical by SKU.
    Sku,
}

// =============================================================================
// Catalog Entry
// =============================================================================

/// Canonical product metadata for one SKU.
///
/// Fields start out empty and are filled by enrichment. They are only
/// upgraded from blank, never downgraded, unless written explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CatalogEntry {
    pub sku: String,
    pub product: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CatalogEntry {
    pub fn info(&self) -> ProductInfo {
        ProductInfo {
            product: self.product.clone(),
            brand: self.brand.clone(),
            category: self.category.clone(),
            image: self.image.clone(),
            url: self.url.clone(),
        }
    }

    /// True when the entry still lacks a product name.
    pub fn needs_enrichment(&self) -> bool {
        is_blank(&self.product)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_round_trips_through_str() {
        for kind in [
            EventKind::Input,
            EventKind::Output,
            EventKind::Set,
            EventKind::Remove,
        ] {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
        assert!("restock".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_product_info_fill_only_blanks() {
        let mut info = ProductInfo {
            product: Some("Leche Entera".to_string()),
            brand: Some("  ".to_string()),
            ..Default::default()
        };
        let lookup = ProductInfo {
            product: Some("Whole Milk".to_string()),
            brand: Some("Lala".to_string()),
            category: Some("Dairy".to_string()),
            ..Default::default()
        };

        info.fill_from(&lookup);

        assert_eq!(info.product.as_deref(), Some("Leche Entera"));
        assert_eq!(info.brand.as_deref(), Some("Lala"));
        assert_eq!(info.category.as_deref(), Some("Dairy"));
        assert!(info.image.is_none());
    }

    #[test]
    fn test_product_info_is_empty() {
        assert!(ProductInfo::default().is_empty());
        assert!(ProductInfo {
            url: Some(String::new()),
            ..Default::default()
        }
        .is_empty());
        assert!(!ProductInfo::named("Coffee").is_empty());
    }

    #[test]
    fn test_stock_entry_display_quantity() {
        let mut entry = StockEntry {
            sku: "123".to_string(),
            qty: 2,
            percent: 100,
            product: None,
            brand: None,
            category: None,
            image: None,
            url: None,
            updated_at: Utc::now(),
        };
        assert_eq!(entry.display_quantity(), "2");
        assert!(!entry.has_open_fraction());

        entry.percent = 40;
        assert_eq!(entry.display_quantity(), "2 + 40%");
        assert!(entry.has_open_fraction());
    }

    #[test]
    fn test_product_info_deserializes_partial_json() {
        let info: ProductInfo =
            serde_json::from_str(r#"{"product":"Cafe","brand":null}"#).unwrap();
        assert_eq!(info.product.as_deref(), Some("Cafe"));
        assert!(info.brand.is_none());
        assert!(info.url.is_none());
    }
}

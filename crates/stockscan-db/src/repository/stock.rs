//! # Stock Repository
//!
//! The current-stock projection. Each mutating call reads the SKU's row,
//! runs the transition from [`stockscan_core::stock`] and writes the result
//! back inside one transaction on the `stock` table.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_output("123")                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  SELECT qty, percent FROM stock WHERE sku = '123'   → (2, 40)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StockLevel::apply_output(Some(2 + 40%))            → (2, 100)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT ... ON CONFLICT(sku) DO UPDATE                                  │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  NotInStock → ROLLBACK, row untouched                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use stockscan_core::stock::replay;
use stockscan_core::{
    OutputOutcome, Percent, ProductInfo, ScanEvent, SetOutcome, StockEntry, StockLevel,
    StockOrder,
};

const SELECT_STOCK: &str = r#"
    SELECT sku, qty, percent, product, brand, category, image, url, updated_at
    FROM stock
"#;

/// Repository for the stock projection.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    pub async fn get(&self, sku: &str) -> DbResult<Option<StockEntry>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, sku).await
    }

    /// Every projection row in the requested order.
    pub async fn list_all(&self, order: StockOrder) -> DbResult<Vec<StockEntry>> {
        let order_by = match order {
            StockOrder::QuantityDesc => "qty DESC, sku ASC",
            StockOrder::QuantityAsc => "qty ASC, sku ASC",
            StockOrder::Sku => "sku ASC",
        };
        let sql = format!("{SELECT_STOCK} ORDER BY {order_by}");

        let rows = sqlx::query_as::<_, StockEntry>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Receives one whole unit of `sku`.
    ///
    /// Non-blank snapshot fields replace the mirrored metadata; blank ones
    /// keep what the row already had.
    pub async fn apply_input(&self, sku: &str, snapshot: &ProductInfo) -> DbResult<StockEntry> {
        let mut tx = self.pool.begin().await?;

        let current = fetch(&mut tx, sku).await?;
        let level = StockLevel::apply_input(current.as_ref().map(StockEntry::level));
        let info = merged_info(snapshot, current.as_ref());

        let entry = write(&mut tx, sku, level, &info).await?;
        tx.commit().await?;

        debug!(sku = %sku, stock = %level, "Stock input applied");
        Ok(entry)
    }

    /// Consumes the open fraction, else one whole unit.
    ///
    /// ## Errors
    /// [`DbError::Core`](crate::DbError::Core) wrapping `NotInStock` when
    /// there is nothing to consume. The row is left untouched.
    pub async fn apply_output(&self, sku: &str) -> DbResult<OutputOutcome> {
        let mut tx = self.pool.begin().await?;

        let current = fetch(&mut tx, sku).await?;
        let outcome = StockLevel::apply_output(current.as_ref().map(StockEntry::level), sku)?;
        let info = current.as_ref().map(StockEntry::info).unwrap_or_default();

        write(&mut tx, sku, outcome.level, &info).await?;
        tx.commit().await?;

        debug!(
            sku = %sku,
            stock = %outcome.level,
            consumed_fraction = outcome.consumed_fraction,
            "Stock output applied"
        );
        Ok(outcome)
    }

    /// Records the remaining percentage of an opened unit.
    ///
    /// The returned delta is what the ledger row's `aux` should carry.
    pub async fn apply_set(
        &self,
        sku: &str,
        pct: Percent,
        snapshot: &ProductInfo,
    ) -> DbResult<SetOutcome> {
        let mut tx = self.pool.begin().await?;

        let current = fetch(&mut tx, sku).await?;
        let outcome = StockLevel::apply_set(current.as_ref().map(StockEntry::level), pct);
        let info = merged_info(snapshot, current.as_ref());

        write(&mut tx, sku, outcome.level, &info).await?;
        tx.commit().await?;

        debug!(sku = %sku, stock = %outcome.level, delta = outcome.delta, "Stock set applied");
        Ok(outcome)
    }

    /// Replaces the whole projection with one recomputed from `events`.
    ///
    /// Runs in one transaction, so readers see either the old or the new
    /// projection. Returns the number of rows written.
    pub async fn rebuild(&self, events: &[ScanEvent]) -> DbResult<usize> {
        let rebuilt = replay(events);

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM stock").execute(&mut *tx).await?;
        for row in &rebuilt {
            write(&mut tx, &row.sku, StockLevel::whole(row.qty), &row.snapshot).await?;
        }
        tx.commit().await?;

        info!(rows = rebuilt.len(), "Stock projection rebuilt");
        Ok(rebuilt.len())
    }

    /// Empties the projection. Returns the number of rows removed.
    pub async fn clear(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM stock")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn fetch(conn: &mut SqliteConnection, sku: &str) -> DbResult<Option<StockEntry>> {
    let sql = format!("{SELECT_STOCK} WHERE sku = ?1");
    let row = sqlx::query_as::<_, StockEntry>(&sql)
        .bind(sku)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

async fn write(
    conn: &mut SqliteConnection,
    sku: &str,
    level: StockLevel,
    info: &ProductInfo,
) -> DbResult<StockEntry> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO stock (sku, qty, percent, product, brand, category, image, url, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(sku) DO UPDATE SET
            qty = excluded.qty,
            percent = excluded.percent,
            product = excluded.product,
            brand = excluded.brand,
            category = excluded.category,
            image = excluded.image,
            url = excluded.url,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(sku)
    .bind(level.qty())
    .bind(i64::from(level.percent().value()))
    .bind(&info.product)
    .bind(&info.brand)
    .bind(&info.category)
    .bind(&info.image)
    .bind(&info.url)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(StockEntry {
        sku: sku.to_string(),
        qty: level.qty(),
        percent: level.percent().value(),
        product: info.product.clone(),
        brand: info.brand.clone(),
        category: info.category.clone(),
        image: info.image.clone(),
        url: info.url.clone(),
        updated_at: now,
    })
}

fn merged_info(snapshot: &ProductInfo, current: Option<&StockEntry>) -> ProductInfo {
    let mut info = snapshot.clone();
    if let Some(entry) = current {
        info.fill_from(&entry.info());
    }
    info
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use stockscan_core::CoreError;

    async fn stock() -> StockRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().stock()
    }

    fn pct(value: i64) -> Percent {
        Percent::clamped(value)
    }

    #[tokio::test]
    async fn test_input_creates_then_increments() {
        let stock = stock().await;

        let first = stock
            .apply_input("123", &ProductInfo::named("Rice"))
            .await
            .unwrap();
        assert_eq!((first.qty, first.percent), (1, 100));

        stock.apply_input("123", &ProductInfo::default()).await.unwrap();

        let entry = stock.get("123").await.unwrap().unwrap();
        assert_eq!(entry.qty, 2);
        // blank snapshot keeps the mirrored name
        assert_eq!(entry.product.as_deref(), Some("Rice"));
    }

    #[tokio::test]
    async fn test_output_on_unknown_sku_is_not_in_stock() {
        let stock = stock().await;

        let err = stock.apply_output("999").await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::NotInStock { .. })));
        assert!(stock.get("999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_output_at_zero_leaves_row_untouched() {
        let stock = stock().await;
        stock.apply_input("1", &ProductInfo::default()).await.unwrap();
        stock.apply_output("1").await.unwrap();

        assert!(stock.apply_output("1").await.is_err());
        let entry = stock.get("1").await.unwrap().unwrap();
        assert_eq!((entry.qty, entry.percent), (0, 100));
    }

    #[tokio::test]
    async fn test_set_then_output_consumes_fraction_first() {
        let stock = stock().await;
        stock.apply_input("123", &ProductInfo::default()).await.unwrap();

        let outcome = stock
            .apply_set("123", pct(40), &ProductInfo::default())
            .await
            .unwrap();
        assert_eq!(outcome.delta, -1);
        let entry = stock.get("123").await.unwrap().unwrap();
        assert_eq!((entry.qty, entry.percent), (0, 40));
        assert_eq!(entry.display_quantity(), "0 + 40%");

        let outcome = stock.apply_output("123").await.unwrap();
        assert!(outcome.consumed_fraction);
        let entry = stock.get("123").await.unwrap().unwrap();
        assert_eq!((entry.qty, entry.percent), (0, 100));

        assert!(stock.apply_output("123").await.is_err());
    }

    #[tokio::test]
    async fn test_set_without_entry_creates_fraction() {
        let stock = stock().await;

        let outcome = stock
            .apply_set("77", pct(10), &ProductInfo::named("Soap"))
            .await
            .unwrap();
        assert_eq!(outcome.delta, 0);

        let entry = stock.get("77").await.unwrap().unwrap();
        assert_eq!((entry.qty, entry.percent), (0, 10));
        assert_eq!(entry.product.as_deref(), Some("Soap"));
    }

    #[tokio::test]
    async fn test_list_all_orders() {
        let stock = stock().await;
        for (sku, n) in [("b", 1), ("a", 3), ("c", 2)] {
            for _ in 0..n {
                stock.apply_input(sku, &ProductInfo::default()).await.unwrap();
            }
        }

        let skus = |rows: Vec<StockEntry>| rows.into_iter().map(|r| r.sku).collect::<Vec<_>>();

        assert_eq!(
            skus(stock.list_all(StockOrder::QuantityDesc).await.unwrap()),
            vec!["a", "c", "b"]
        );
        assert_eq!(
            skus(stock.list_all(StockOrder::QuantityAsc).await.unwrap()),
            vec!["b", "c", "a"]
        );
        assert_eq!(
            skus(stock.list_all(StockOrder::Sku).await.unwrap()),
            vec!["a", "b", "c"]
        );
    }

    #[tokio::test]
    async fn test_rebuild_with_empty_ledger_empties_projection() {
        let stock = stock().await;
        stock.apply_input("a", &ProductInfo::default()).await.unwrap();

        assert_eq!(stock.rebuild(&[]).await.unwrap(), 0);
        assert!(stock.list_all(StockOrder::Sku).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let stock = stock().await;
        stock.apply_input("a", &ProductInfo::default()).await.unwrap();
        stock.apply_input("b", &ProductInfo::default()).await.unwrap();

        assert_eq!(stock.clear().await.unwrap(), 2);
        assert!(stock.get("a").await.unwrap().is_none());
    }
}

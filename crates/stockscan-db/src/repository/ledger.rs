//! # Ledger Repository
//!
//! The append-only scan log. Every row carries a frozen snapshot of the
//! product metadata known at scan time.
//!
//! Rows are only removed by undo (newest row) and by `clear_all` (every
//! row). Nothing ever updates a row in place.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stockscan_core::{NewScanEvent, ScanEvent};

const SELECT_SCAN: &str = r#"
    SELECT id, sku, kind, aux, product, brand, category, image, url, created_at
    FROM scans
"#;

/// Repository for the scan ledger.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Appends one row and returns it with its assigned sequence id.
    pub async fn append(&self, event: &NewScanEvent) -> DbResult<ScanEvent> {
        let now = Utc::now();
        let info = &event.snapshot;

        let result = sqlx::query(
            r#"
            INSERT INTO scans (sku, kind, aux, product, brand, category, image, url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&event.sku)
        .bind(event.kind)
        .bind(&event.aux)
        .bind(&info.product)
        .bind(&info.brand)
        .bind(&info.category)
        .bind(&info.image)
        .bind(&info.url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, sku = %event.sku, kind = %event.kind, "Scan appended");

        Ok(ScanEvent {
            id,
            sku: event.sku.clone(),
            kind: event.kind,
            aux: event.aux.clone(),
            product: info.product.clone(),
            brand: info.brand.clone(),
            category: info.category.clone(),
            image: info.image.clone(),
            url: info.url.clone(),
            created_at: now,
        })
    }

    /// The `n` most recent rows, newest first.
    pub async fn last_n(&self, n: u32) -> DbResult<Vec<ScanEvent>> {
        let sql = format!("{SELECT_SCAN} ORDER BY id DESC LIMIT ?1");
        let rows = sqlx::query_as::<_, ScanEvent>(&sql)
            .bind(i64::from(n))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Every row, oldest first. Used by rebuild.
    pub async fn all(&self) -> DbResult<Vec<ScanEvent>> {
        let sql = format!("{SELECT_SCAN} ORDER BY id ASC");
        let rows = sqlx::query_as::<_, ScanEvent>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Removes the newest row and returns it, or `None` on an empty ledger.
    pub async fn delete_last(&self) -> DbResult<Option<ScanEvent>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("{SELECT_SCAN} ORDER BY id DESC LIMIT 1");
        let last = sqlx::query_as::<_, ScanEvent>(&sql)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(event) = &last {
            sqlx::query("DELETE FROM scans WHERE id = ?1")
                .bind(event.id)
                .execute(&mut *tx)
                .await?;
            debug!(id = event.id, sku = %event.sku, "Scan removed");
        }

        tx.commit().await?;
        Ok(last)
    }

    /// Purges the ledger. Returns the number of rows removed.
    pub async fn clear_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM scans")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scans")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

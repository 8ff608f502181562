//! # Catalog Repository
//!
//! Canonical product metadata per SKU. Rows are created empty by the first
//! scan of an unknown SKU and filled in later by the enrichment worker.
//!
//! ## Write Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ensure(sku)              INSERT OR IGNORE, all fields NULL             │
//! │                                                                         │
//! │  fill_missing(sku, info)  field = info.field  only where field is blank │
//! │                           (enrichment: never downgrades a value, never  │
//! │                           brings back a removed entry)                  │
//! │                                                                         │
//! │  upsert(sku, info)        field = info.field  where info.field is Some  │
//! │                           (explicit edit: overwrites existing values)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stockscan_core::{CatalogEntry, ProductInfo};

const SELECT_CATALOG: &str = r#"
    SELECT sku, product, brand, category, image, url, updated_at
    FROM catalog
"#;

/// Repository for the product catalog.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    pub async fn get(&self, sku: &str) -> DbResult<Option<CatalogEntry>> {
        let sql = format!("{SELECT_CATALOG} WHERE sku = ?1");
        let row = sqlx::query_as::<_, CatalogEntry>(&sql)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Inserts or updates an entry. `Some` fields overwrite, `None` fields
    /// keep the stored value.
    pub async fn upsert(&self, sku: &str, info: &ProductInfo) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO catalog (sku, product, brand, category, image, url, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(sku) DO UPDATE SET
                product = COALESCE(excluded.product, catalog.product),
                brand = COALESCE(excluded.brand, catalog.brand),
                category = COALESCE(excluded.category, catalog.category),
                image = COALESCE(excluded.image, catalog.image),
                url = COALESCE(excluded.url, catalog.url),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(sku)
        .bind(&info.product)
        .bind(&info.brand)
        .bind(&info.category)
        .bind(&info.image)
        .bind(&info.url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(sku = %sku, "Catalog entry upserted");
        Ok(())
    }

    /// Creates an empty entry if none exists. Returns true when created.
    pub async fn ensure(&self, sku: &str) -> DbResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO catalog (sku, updated_at) VALUES (?1, ?2)",
        )
        .bind(sku)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fills blank fields of an existing entry from `info`.
    ///
    /// Fields that already hold a non-blank value are left alone. Returns
    /// false when there is no entry for `sku`; nothing is created then.
    pub async fn fill_missing(&self, sku: &str, info: &ProductInfo) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE catalog SET
                product = CASE WHEN TRIM(COALESCE(product, '')) = ''
                               THEN ?2 ELSE product END,
                brand = CASE WHEN TRIM(COALESCE(brand, '')) = ''
                             THEN ?3 ELSE brand END,
                category = CASE WHEN TRIM(COALESCE(category, '')) = ''
                                THEN ?4 ELSE category END,
                image = CASE WHEN TRIM(COALESCE(image, '')) = ''
                             THEN ?5 ELSE image END,
                url = CASE WHEN TRIM(COALESCE(url, '')) = ''
                           THEN ?6 ELSE url END,
                updated_at = ?7
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .bind(non_blank(&info.product))
        .bind(non_blank(&info.brand))
        .bind(non_blank(&info.category))
        .bind(non_blank(&info.image))
        .bind(non_blank(&info.url))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let filled = result.rows_affected() > 0;
        debug!(sku = %sku, filled, "Catalog blanks filled");
        Ok(filled)
    }

    /// Deletes an entry. Returns false when there was nothing to delete.
    pub async fn remove(&self, sku: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM catalog WHERE sku = ?1")
            .bind(sku)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Case-insensitive substring search over SKU, product and brand,
    /// most recently updated first. Empty text matches everything.
    ///
    /// SQLite's `lower()` only folds ASCII, so matching happens here with
    /// Unicode case folding ("ÑOQUIS" matches "ñoquis").
    pub async fn search(&self, text: &str, limit: u32) -> DbResult<Vec<CatalogEntry>> {
        let needle = text.trim().to_lowercase();
        let sql = format!("{SELECT_CATALOG} ORDER BY updated_at DESC, sku ASC");

        let rows = sqlx::query_as::<_, CatalogEntry>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let hit = |field: Option<&str>| {
            field.is_some_and(|value| value.to_lowercase().contains(&needle))
        };

        Ok(rows
            .into_iter()
            .filter(|entry| {
                needle.is_empty()
                    || hit(Some(&entry.sku))
                    || hit(entry.product.as_deref())
                    || hit(entry.brand.as_deref())
            })
            .take(limit as usize)
            .collect())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn catalog() -> CatalogRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().catalog()
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let catalog = catalog().await;

        assert!(catalog.ensure("123").await.unwrap());
        assert!(!catalog.ensure("123").await.unwrap());

        let entry = catalog.get("123").await.unwrap().unwrap();
        assert!(entry.info().is_empty());
        assert!(entry.needs_enrichment());
    }

    #[tokio::test]
    async fn test_fill_missing_never_downgrades() {
        let catalog = catalog().await;
        catalog
            .upsert(
                "123",
                &ProductInfo {
                    product: Some("Leche".to_string()),
                    brand: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        catalog
            .fill_missing(
                "123",
                &ProductInfo {
                    product: Some("Milk".to_string()),
                    brand: Some("Lala".to_string()),
                    category: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let entry = catalog.get("123").await.unwrap().unwrap();
        assert_eq!(entry.product.as_deref(), Some("Leche"));
        assert_eq!(entry.brand.as_deref(), Some("Lala"));
        assert!(entry.category.is_none());
    }

    #[tokio::test]
    async fn test_fill_missing_fills_empty_entry() {
        let catalog = catalog().await;
        catalog.ensure("9").await.unwrap();

        assert!(catalog.fill_missing("9", &ProductInfo::named("Tea")).await.unwrap());
        assert_eq!(
            catalog.get("9").await.unwrap().unwrap().product.as_deref(),
            Some("Tea")
        );
    }

    #[tokio::test]
    async fn test_fill_missing_does_not_create_entry() {
        let catalog = catalog().await;
        catalog.ensure("9").await.unwrap();
        catalog.remove("9").await.unwrap();

        assert!(!catalog.fill_missing("9", &ProductInfo::named("Tea")).await.unwrap());
        assert!(catalog.get("9").await.unwrap().is_none());
        assert_eq!(catalog.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_only_some_fields() {
        let catalog = catalog().await;
        catalog
            .upsert(
                "1",
                &ProductInfo {
                    product: Some("Old".to_string()),
                    brand: Some("Acme".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        catalog.upsert("1", &ProductInfo::named("New")).await.unwrap();

        let entry = catalog.get("1").await.unwrap().unwrap();
        assert_eq!(entry.product.as_deref(), Some("New"));
        assert_eq!(entry.brand.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn test_remove() {
        let catalog = catalog().await;
        catalog.ensure("1").await.unwrap();

        assert!(catalog.remove("1").await.unwrap());
        assert!(!catalog.remove("1").await.unwrap());
        assert_eq!(catalog.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search() {
        let catalog = catalog().await;
        catalog.upsert("7501", &ProductInfo::named("Coca-Cola 600ml")).await.unwrap();
        catalog
            .upsert(
                "7502",
                &ProductInfo {
                    product: Some("Agua".to_string()),
                    brand: Some("Ciel (Coca-Cola)".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        catalog.upsert("8800", &ProductInfo::named("Pan")).await.unwrap();

        assert_eq!(catalog.search("coca", 10).await.unwrap().len(), 2);
        assert_eq!(catalog.search("750", 10).await.unwrap().len(), 2);
        assert_eq!(catalog.search("", 10).await.unwrap().len(), 3);
        assert_eq!(catalog.search("", 1).await.unwrap().len(), 1);
        assert!(catalog.search("nothing", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let catalog = catalog().await;
        catalog.upsert("4401", &ProductInfo::named("ÑOQUIS Ébano")).await.unwrap();
        catalog.upsert("4402", &ProductInfo::named("Noquis")).await.unwrap();

        assert_eq!(catalog.search("ñoquis", 10).await.unwrap().len(), 1);
        assert_eq!(catalog.search("ÑOQUIS", 10).await.unwrap().len(), 1);
        assert_eq!(catalog.search("ébano", 10).await.unwrap()[0].sku, "4401");
    }
}

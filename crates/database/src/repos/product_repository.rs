//! SQLite-backed product catalog.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::entities::{NewProduct, Product};
use crate::stores::CatalogStore;
use crate::types::{CatalogError, CatalogResult};

/// Repository for product database operations
#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn product_from_row(row: SqliteRow) -> CatalogResult<Product> {
        let id: i64 = row.try_get("id")?;
        let data: String = row.try_get("data")?;

        let fields: Map<String, Value> =
            serde_json::from_str(&data).map_err(|e| CatalogError::CorruptRecord {
                id,
                reason: e.to_string(),
            })?;

        Ok(Product { id, fields })
    }
}

#[async_trait]
impl CatalogStore for ProductRepository {
    async fn create(&self, fields: Value) -> CatalogResult<Product> {
        let fields = NewProduct::try_from(fields)?.into_fields();
        let data = serde_json::to_string(&fields)
            .map_err(|e| CatalogError::InvalidProduct(e.to_string()))?;
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query("INSERT INTO products (data, created_at) VALUES (?, ?)")
            .bind(&data)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        info!(product_id = id, "created product");

        Ok(Product { id, fields })
    }

    async fn delete(&self, id: i64) -> CatalogResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!(product_id = id, "deleted product");
        } else {
            info!(product_id = id, "no product to delete");
        }
        Ok(removed)
    }

    async fn find(&self, id: i64) -> CatalogResult<Option<Product>> {
        let row = sqlx::query("SELECT id, data FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::product_from_row).transpose()
    }

    async fn list(&self) -> CatalogResult<Vec<Product>> {
        let rows = sqlx::query("SELECT id, data FROM products ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::product_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::migrated_pool;
    use serde_json::json;

    #[tokio::test]
    async fn create_assigns_increasing_ids_and_keeps_fields() {
        let (pool, _dir) = migrated_pool().await;
        let repo = ProductRepository::new(pool);

        let first = repo
            .create(json!({"title": "Yerba", "price": 950, "stock": 12}))
            .await
            .unwrap();
        let second = repo.create(json!({"title": "Mate"})).await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.field("price"), Some(&json!(950)));
        assert_eq!(repo.find(first.id).await.unwrap(), Some(first.clone()));
        assert_eq!(repo.list().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn create_rejects_non_object_payloads() {
        let (pool, _dir) = migrated_pool().await;
        let repo = ProductRepository::new(pool);

        let error = repo.create(json!("just a string")).await.unwrap_err();
        assert!(matches!(error, CatalogError::InvalidProduct(_)));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_was_removed() {
        let (pool, _dir) = migrated_pool().await;
        let repo = ProductRepository::new(pool);

        let product = repo.create(json!({"title": "Termo"})).await.unwrap();

        assert!(repo.delete(product.id).await.unwrap());
        assert!(repo.find(product.id).await.unwrap().is_none());
        assert!(!repo.delete(product.id).await.unwrap());
        assert!(!repo.delete(-1).await.unwrap());
    }
}

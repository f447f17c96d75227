use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::invoice::{CatalogItem, CatalogItemRepository, InvoiceError};

#[derive(Debug, FromRow)]
struct CatalogItemRow {
  id: Uuid,
  sku: String,
  name: String,
  base_price: Decimal,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<CatalogItemRow> for CatalogItem {
  fn from(row: CatalogItemRow) -> Self {
    CatalogItem {
      id: row.id,
      sku: row.sku,
      name: row.name,
      base_price: row.base_price,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

pub struct PostgresCatalogItemRepository {
  pool: PgPool,
}

impl PostgresCatalogItemRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CatalogItemRepository for PostgresCatalogItemRepository {
  async fn find_by_name(&self, name: &str) -> Result<Option<CatalogItem>, InvoiceError> {
    let row = sqlx::query_as::<_, CatalogItemRow>(
      r#"
            SELECT id, sku, name, base_price, created_at, updated_at
            FROM catalog_items
            WHERE name = $1
            "#,
    )
    .bind(name)
    .fetch_optional(&self.pool)
    .await?;

    Ok(row.map(Into::into))
  }

  async fn get_or_create(&self, item: CatalogItem) -> Result<CatalogItem, InvoiceError> {
    if let Some(existing) = self.find_by_name(&item.name).await? {
      return Ok(existing);
    }

    let result = sqlx::query_as::<_, CatalogItemRow>(
      r#"
            INSERT INTO catalog_items (id, sku, name, base_price, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, sku, name, base_price, created_at, updated_at
            "#,
    )
    .bind(item.id)
    .bind(&item.sku)
    .bind(&item.name)
    .bind(item.base_price)
    .bind(item.created_at)
    .bind(item.updated_at)
    .fetch_one(&self.pool)
    .await;

    match result {
      Ok(row) => Ok(row.into()),
      // A concurrent insert won the unique race on name or sku; re-read it
      Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => self
        .find_by_name(&item.name)
        .await?
        .ok_or_else(|| InvoiceError::Internal(format!("Catalog item '{}' vanished", item.name))),
      Err(e) => Err(e.into()),
    }
  }
}

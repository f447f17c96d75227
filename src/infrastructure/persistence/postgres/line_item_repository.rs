use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::invoice::{
  Amount, InvoiceError, InvoiceLineItem, InvoiceStatus, InvoiceTotals, LineDescription,
  LineItemRepository, LineTotals, Quantity, TaxRate,
};

#[derive(Debug, FromRow)]
pub(crate) struct LineItemRow {
  id: Uuid,
  invoice_id: Uuid,
  item_id: Option<Uuid>,
  description: String,
  quantity: i32,
  unit_price: Decimal,
  discount_amount: Decimal,
  tax_rate: Decimal,
  line_subtotal: Decimal,
  line_tax_total: Decimal,
  line_discount_total: Decimal,
  total_after_discount: Decimal,
}

impl TryFrom<LineItemRow> for InvoiceLineItem {
  type Error = InvoiceError;

  fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
    let quantity = u32::try_from(row.quantity)
      .map_err(|_| InvoiceError::Internal(format!("Negative quantity stored: {}", row.quantity)))?;

    Ok(InvoiceLineItem {
      id: row.id,
      invoice_id: row.invoice_id,
      item_id: row.item_id,
      description: LineDescription::new(row.description)?,
      quantity: Quantity::new(quantity)?,
      unit_price: Amount::new(row.unit_price)?,
      discount_amount: Amount::new(row.discount_amount)?,
      tax_rate: TaxRate::new(row.tax_rate)?,
      totals: LineTotals {
        line_subtotal: row.line_subtotal,
        line_tax_total: row.line_tax_total,
        line_discount_total: row.line_discount_total,
        total_after_discount: row.total_after_discount,
      },
    })
  }
}

const LINE_ITEM_COLUMNS: &str = "id, invoice_id, item_id, description, quantity, unit_price, \
                                 discount_amount, tax_rate, line_subtotal, line_tax_total, \
                                 line_discount_total, total_after_discount";

/// Locks the parent invoice row for the remainder of the transaction and
/// returns its number and status.
pub(crate) async fn lock_invoice(
  tx: &mut Transaction<'_, Postgres>,
  invoice_id: Uuid,
) -> Result<(String, InvoiceStatus), InvoiceError> {
  let row = sqlx::query_as::<_, (String, String)>(
    r#"
        SELECT invoice_number, status
        FROM invoices
        WHERE id = $1
        FOR UPDATE
        "#,
  )
  .bind(invoice_id)
  .fetch_optional(&mut **tx)
  .await?
  .ok_or(InvoiceError::InvoiceNotFound(invoice_id))?;

  let status = InvoiceStatus::from_str(&row.1)?;
  Ok((row.0, status))
}

/// Recomputes the invoice aggregates from its stored lines and persists them.
/// Must run inside a transaction that already holds the invoice row lock.
pub(crate) async fn recalculate_invoice(
  tx: &mut Transaction<'_, Postgres>,
  invoice_id: Uuid,
) -> Result<InvoiceTotals, InvoiceError> {
  let rows = sqlx::query_as::<_, LineItemRow>(&format!(
    r#"
        SELECT {LINE_ITEM_COLUMNS}
        FROM invoice_line_items
        WHERE invoice_id = $1
        "#
  ))
  .bind(invoice_id)
  .fetch_all(&mut **tx)
  .await?;

  let lines = rows
    .into_iter()
    .map(InvoiceLineItem::try_from)
    .collect::<Result<Vec<_>, _>>()?;
  let totals = InvoiceTotals::from_lines(&lines);

  sqlx::query(
    r#"
        UPDATE invoices
        SET subtotal = $2, discount_total = $3, tax_total = $4, total_due = $5,
            updated_at = NOW()
        WHERE id = $1
        "#,
  )
  .bind(invoice_id)
  .bind(totals.subtotal)
  .bind(totals.discount_total)
  .bind(totals.tax_total)
  .bind(totals.total_due)
  .execute(&mut **tx)
  .await?;

  Ok(totals)
}

pub(crate) async fn insert_line(
  tx: &mut Transaction<'_, Postgres>,
  line: &InvoiceLineItem,
) -> Result<(), InvoiceError> {
  sqlx::query(
    r#"
        INSERT INTO invoice_line_items (
            id, invoice_id, item_id, description, quantity, unit_price,
            discount_amount, tax_rate, line_subtotal, line_tax_total,
            line_discount_total, total_after_discount
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (id) DO UPDATE
        SET item_id = EXCLUDED.item_id, description = EXCLUDED.description,
            quantity = EXCLUDED.quantity, unit_price = EXCLUDED.unit_price,
            discount_amount = EXCLUDED.discount_amount, tax_rate = EXCLUDED.tax_rate,
            line_subtotal = EXCLUDED.line_subtotal, line_tax_total = EXCLUDED.line_tax_total,
            line_discount_total = EXCLUDED.line_discount_total,
            total_after_discount = EXCLUDED.total_after_discount
        "#,
  )
  .bind(line.id)
  .bind(line.invoice_id)
  .bind(line.item_id)
  .bind(line.description.value())
  .bind(line.quantity.value() as i32)
  .bind(line.unit_price.value())
  .bind(line.discount_amount.value())
  .bind(line.tax_rate.value())
  .bind(line.totals.line_subtotal)
  .bind(line.totals.line_tax_total)
  .bind(line.totals.line_discount_total)
  .bind(line.totals.total_after_discount)
  .execute(&mut **tx)
  .await?;

  Ok(())
}

fn ensure_draft(invoice_number: String, status: InvoiceStatus) -> Result<(), InvoiceError> {
  if !status.is_editable() {
    return Err(InvoiceError::Locked {
      invoice_number,
      status,
    });
  }
  Ok(())
}

pub struct PostgresLineItemRepository {
  pool: PgPool,
}

impl PostgresLineItemRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl LineItemRepository for PostgresLineItemRepository {
  async fn save_and_recalculate(
    &self,
    line: &InvoiceLineItem,
  ) -> Result<InvoiceTotals, InvoiceError> {
    let mut tx = self.pool.begin().await?;

    let (invoice_number, status) = lock_invoice(&mut tx, line.invoice_id).await?;
    ensure_draft(invoice_number, status)?;

    insert_line(&mut tx, line).await?;
    let totals = recalculate_invoice(&mut tx, line.invoice_id).await?;

    tx.commit().await?;
    Ok(totals)
  }

  async fn delete_and_recalculate(&self, line_id: Uuid) -> Result<InvoiceTotals, InvoiceError> {
    let mut tx = self.pool.begin().await?;

    let invoice_id = sqlx::query_scalar::<_, Uuid>(
      r#"
            SELECT invoice_id
            FROM invoice_line_items
            WHERE id = $1
            "#,
    )
    .bind(line_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(InvoiceError::LineItemNotFound(line_id))?;

    let (invoice_number, status) = lock_invoice(&mut tx, invoice_id).await?;
    ensure_draft(invoice_number, status)?;

    sqlx::query("DELETE FROM invoice_line_items WHERE id = $1")
      .bind(line_id)
      .execute(&mut *tx)
      .await?;
    let totals = recalculate_invoice(&mut tx, invoice_id).await?;

    tx.commit().await?;
    Ok(totals)
  }

  async fn replace_for_invoice(
    &self,
    invoice_id: Uuid,
    lines: Vec<InvoiceLineItem>,
  ) -> Result<InvoiceTotals, InvoiceError> {
    let mut tx = self.pool.begin().await?;

    // No draft check: ingestion replaces line sets regardless of status
    // because the upstream service is the source of record
    lock_invoice(&mut tx, invoice_id).await?;

    sqlx::query("DELETE FROM invoice_line_items WHERE invoice_id = $1")
      .bind(invoice_id)
      .execute(&mut *tx)
      .await?;
    for line in &lines {
      insert_line(&mut tx, line).await?;
    }
    let totals = recalculate_invoice(&mut tx, invoice_id).await?;

    tx.commit().await?;
    Ok(totals)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceLineItem>, InvoiceError> {
    let row = sqlx::query_as::<_, LineItemRow>(&format!(
      r#"
            SELECT {LINE_ITEM_COLUMNS}
            FROM invoice_line_items
            WHERE id = $1
            "#
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn find_by_invoice_id(
    &self,
    invoice_id: Uuid,
  ) -> Result<Vec<InvoiceLineItem>, InvoiceError> {
    let rows = sqlx::query_as::<_, LineItemRow>(&format!(
      r#"
            SELECT {LINE_ITEM_COLUMNS}
            FROM invoice_line_items
            WHERE invoice_id = $1
            ORDER BY description ASC
            "#
    ))
    .bind(invoice_id)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn count_by_invoice_id(&self, invoice_id: Uuid) -> Result<u64, InvoiceError> {
    let count = sqlx::query_scalar::<_, i64>(
      r#"
            SELECT COUNT(*)
            FROM invoice_line_items
            WHERE invoice_id = $1
            "#,
    )
    .bind(invoice_id)
    .fetch_one(&self.pool)
    .await?;

    Ok(count as u64)
  }
}

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::invoice::{
  Invoice, InvoiceError, InvoiceFilter, InvoiceLineItem, InvoiceNumber, InvoiceRepository,
  InvoiceStatus, InvoiceTotals, PaymentMethod,
};

use super::line_item_repository::{insert_line, lock_invoice, recalculate_invoice};

#[derive(Debug, FromRow)]
struct InvoiceRow {
  id: Uuid,
  invoice_number: String,
  customer_id: Option<Uuid>,
  status: String,
  issue_date: NaiveDate,
  due_date: Option<NaiveDate>,
  payment_method: Option<String>,
  subtotal: Decimal,
  discount_total: Decimal,
  tax_total: Decimal,
  total_due: Decimal,
  currency_name: String,
  notes: String,
  seller_name: Option<String>,
  seller_tax_number: Option<String>,
  qr_base64: Option<String>,
  qr_image: Option<Vec<u8>>,
  xml: Option<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
  type Error = InvoiceError;

  fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
    let invoice_number = InvoiceNumber::new(row.invoice_number)?;
    let status = InvoiceStatus::from_str(&row.status)?;
    let payment_method = row
      .payment_method
      .as_deref()
      .map(PaymentMethod::from_str)
      .transpose()?;

    Ok(Invoice {
      id: row.id,
      invoice_number,
      customer_id: row.customer_id,
      status,
      issue_date: row.issue_date,
      due_date: row.due_date,
      payment_method,
      subtotal: row.subtotal,
      discount_total: row.discount_total,
      tax_total: row.tax_total,
      total_due: row.total_due,
      currency_name: row.currency_name,
      notes: row.notes,
      seller_name: row.seller_name,
      seller_tax_number: row.seller_tax_number,
      qr_base64: row.qr_base64,
      qr_image: row.qr_image,
      xml: row.xml,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

const INVOICE_COLUMNS: &str = "id, invoice_number, customer_id, status, issue_date, due_date, \
                               payment_method, subtotal, discount_total, tax_total, total_due, \
                               currency_name, notes, seller_name, seller_tax_number, qr_base64, \
                               qr_image, xml, created_at, updated_at";

pub struct PostgresInvoiceRepository {
  pool: PgPool,
}

impl PostgresInvoiceRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
  async fn create(
    &self,
    invoice: Invoice,
    lines: Vec<InvoiceLineItem>,
  ) -> Result<Invoice, InvoiceError> {
    let invoice_number_value = invoice.invoice_number.value().to_string();
    let mut tx = self.pool.begin().await?;

    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            INSERT INTO invoices (
                id, invoice_number, customer_id, status, issue_date, due_date,
                payment_method, subtotal, discount_total, tax_total, total_due,
                currency_name, notes, seller_name, seller_tax_number,
                qr_base64, qr_image, xml, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING {INVOICE_COLUMNS}
            "#
    ))
    .bind(invoice.id)
    .bind(invoice.invoice_number.value())
    .bind(invoice.customer_id)
    .bind(invoice.status.as_str())
    .bind(invoice.issue_date)
    .bind(invoice.due_date)
    .bind(invoice.payment_method.map(|m| m.as_str()))
    .bind(invoice.subtotal)
    .bind(invoice.discount_total)
    .bind(invoice.tax_total)
    .bind(invoice.total_due)
    .bind(&invoice.currency_name)
    .bind(&invoice.notes)
    .bind(&invoice.seller_name)
    .bind(&invoice.seller_tax_number)
    .bind(&invoice.qr_base64)
    .bind(&invoice.qr_image)
    .bind(&invoice.xml)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
      if let sqlx::Error::Database(db_err) = &e {
        // PostgreSQL unique violation on the invoice number
        if db_err.code().as_deref() == Some("23505")
          && db_err.constraint() == Some("invoices_invoice_number_key")
        {
          return InvoiceError::InvoiceNumberAlreadyExists(invoice_number_value.clone());
        }
      }
      InvoiceError::Database(e)
    })?;

    for line in &lines {
      insert_line(&mut tx, line).await?;
    }

    tx.commit().await?;
    row.try_into()
  }

  async fn update_header(&self, invoice: &Invoice) -> Result<(), InvoiceError> {
    let result = sqlx::query(
      r#"
            UPDATE invoices
            SET invoice_number = $2, customer_id = $3, issue_date = $4,
                due_date = $5, payment_method = $6, currency_name = $7,
                notes = $8, seller_name = $9, seller_tax_number = $10,
                qr_base64 = $11, qr_image = $12, xml = $13, updated_at = $14
            WHERE id = $1
            "#,
    )
    .bind(invoice.id)
    .bind(invoice.invoice_number.value())
    .bind(invoice.customer_id)
    .bind(invoice.issue_date)
    .bind(invoice.due_date)
    .bind(invoice.payment_method.map(|m| m.as_str()))
    .bind(&invoice.currency_name)
    .bind(&invoice.notes)
    .bind(&invoice.seller_name)
    .bind(&invoice.seller_tax_number)
    .bind(&invoice.qr_base64)
    .bind(&invoice.qr_image)
    .bind(&invoice.xml)
    .bind(Utc::now())
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      return Err(InvoiceError::InvoiceNotFound(invoice.id));
    }
    Ok(())
  }

  async fn update_status(&self, invoice: &Invoice) -> Result<(), InvoiceError> {
    let result = sqlx::query(
      r#"
            UPDATE invoices
            SET status = $2, payment_method = $3, updated_at = $4
            WHERE id = $1
            "#,
    )
    .bind(invoice.id)
    .bind(invoice.status.as_str())
    .bind(invoice.payment_method.map(|m| m.as_str()))
    .bind(Utc::now())
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      return Err(InvoiceError::InvoiceNotFound(invoice.id));
    }
    Ok(())
  }

  async fn recalculate(&self, invoice_id: Uuid) -> Result<InvoiceTotals, InvoiceError> {
    let mut tx = self.pool.begin().await?;

    lock_invoice(&mut tx, invoice_id).await?;
    let totals = recalculate_invoice(&mut tx, invoice_id).await?;

    tx.commit().await?;
    Ok(totals)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE id = $1
            "#
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn list(&self, filter: InvoiceFilter) -> Result<Vec<Invoice>, InvoiceError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
            ORDER BY issue_date DESC, invoice_number DESC
            "#
    ))
    .bind(filter.status.map(|s| s.as_str()))
    .bind(filter.customer_id)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn max_sequence_suffix(&self) -> Result<Option<u64>, InvoiceError> {
    let max = sqlx::query_scalar::<_, Option<i64>>(
      r#"
            SELECT MAX(SUBSTRING(invoice_number FROM 4)::bigint)
            FROM invoices
            WHERE invoice_number ~ '^EIN[0-9]+$'
            "#,
    )
    .fetch_one(&self.pool)
    .await?;

    Ok(max.map(|n| n as u64))
  }

  async fn count_for_customer(&self, customer_id: Uuid) -> Result<u64, InvoiceError> {
    let count = sqlx::query_scalar::<_, i64>(
      r#"
            SELECT COUNT(*)
            FROM invoices
            WHERE customer_id = $1
            "#,
    )
    .bind(customer_id)
    .fetch_one(&self.pool)
    .await?;

    Ok(count as u64)
  }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{InvoiceError, InvoiceField, InvoiceService};

#[derive(Debug, Serialize)]
pub struct InvoiceLineItemDto {
  pub line_id: Uuid,
  pub item_id: Option<Uuid>,
  pub description: String,
  pub quantity: u32,
  pub unit_price: Decimal,
  pub discount_amount: Decimal,
  pub tax_rate: Decimal,
  pub line_subtotal: Decimal,
  pub line_tax_total: Decimal,
  pub total_after_discount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct InvoiceDetailsResponse {
  pub invoice_id: Uuid,
  pub invoice_number: String,
  pub customer_id: Option<Uuid>,
  pub status: String,
  pub status_label: String,
  pub is_locked: bool,
  pub line_items_editable: bool,
  pub issue_date: NaiveDate,
  pub due_date: Option<NaiveDate>,
  pub payment_method: Option<String>,
  pub currency_name: String,
  pub subtotal: Decimal,
  pub discount_total: Decimal,
  pub tax_total: Decimal,
  pub total_due: Decimal,
  pub notes: String,
  pub has_qr_image: bool,
  pub line_items: Vec<InvoiceLineItemDto>,
}

pub struct GetInvoiceDetailsUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetInvoiceDetailsUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self, invoice_id: Uuid) -> Result<InvoiceDetailsResponse, InvoiceError> {
    let (invoice, lines) = self.invoice_service.get_invoice_details(invoice_id).await?;

    let line_items = lines
      .into_iter()
      .map(|line| InvoiceLineItemDto {
        line_id: line.id,
        item_id: line.item_id,
        description: line.description.into_inner(),
        quantity: line.quantity.value(),
        unit_price: line.unit_price.value(),
        discount_amount: line.discount_amount.value(),
        tax_rate: line.tax_rate.value(),
        line_subtotal: line.totals.line_subtotal,
        line_tax_total: line.totals.line_tax_total,
        total_after_discount: line.totals.total_after_discount,
      })
      .collect();

    Ok(InvoiceDetailsResponse {
      invoice_id: invoice.id,
      invoice_number: invoice.invoice_number.value().to_string(),
      customer_id: invoice.customer_id,
      status: invoice.status.as_str().to_string(),
      status_label: invoice.status.display_label().to_string(),
      is_locked: invoice.is_locked(),
      line_items_editable: invoice.is_field_editable(InvoiceField::LineItems),
      issue_date: invoice.issue_date,
      due_date: invoice.due_date,
      payment_method: invoice.payment_method.map(|m| m.as_str().to_string()),
      currency_name: invoice.currency_name,
      subtotal: invoice.subtotal,
      discount_total: invoice.discount_total,
      tax_total: invoice.tax_total,
      total_due: invoice.total_due,
      notes: invoice.notes,
      has_qr_image: invoice.qr_image.is_some(),
      line_items,
    })
  }
}

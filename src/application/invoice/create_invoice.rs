use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{
  Amount, InvoiceError, InvoiceNumber, InvoiceService, LineDescription, NewInvoice, NewLineItem,
  PaymentMethod, Quantity, TaxRate,
};

#[derive(Debug, Deserialize)]
pub struct CreateLineItemDto {
  pub item_id: Option<Uuid>,
  pub description: String,
  pub quantity: u32,
  pub unit_price: Decimal,
  #[serde(default)]
  pub discount_amount: Decimal,
  #[serde(default)]
  pub tax_rate: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceCommand {
  pub customer_id: Option<Uuid>,
  /// Omitted numbers are assigned from the EIN sequence.
  pub invoice_number: Option<String>,
  pub issue_date: NaiveDate,
  pub due_date: Option<NaiveDate>,
  pub payment_method: Option<String>,
  #[serde(default)]
  pub notes: String,
  pub line_items: Vec<CreateLineItemDto>,
}

#[derive(Debug, Serialize)]
pub struct CreateInvoiceResponse {
  pub invoice_id: Uuid,
  pub invoice_number: String,
  pub subtotal: Decimal,
  pub discount_total: Decimal,
  pub tax_total: Decimal,
  pub total_due: Decimal,
}

pub struct CreateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl CreateInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: CreateInvoiceCommand,
  ) -> Result<CreateInvoiceResponse, InvoiceError> {
    let invoice_number = command
      .invoice_number
      .map(InvoiceNumber::new)
      .transpose()?;
    let payment_method = command
      .payment_method
      .as_deref()
      .map(PaymentMethod::from_str)
      .transpose()?;

    let lines = command
      .line_items
      .into_iter()
      .map(|line| {
        Ok(NewLineItem {
          item_id: line.item_id,
          description: LineDescription::new(line.description)?,
          quantity: Quantity::new(line.quantity)?,
          unit_price: Amount::new(line.unit_price)?,
          discount_amount: Amount::new(line.discount_amount)?,
          tax_rate: TaxRate::new(line.tax_rate)?,
        })
      })
      .collect::<Result<Vec<_>, InvoiceError>>()?;

    let (invoice, _lines) = self
      .invoice_service
      .create_invoice(NewInvoice {
        customer_id: command.customer_id,
        invoice_number,
        issue_date: command.issue_date,
        due_date: command.due_date,
        payment_method,
        notes: command.notes,
        lines,
      })
      .await?;

    Ok(CreateInvoiceResponse {
      invoice_id: invoice.id,
      invoice_number: invoice.invoice_number.into_inner(),
      subtotal: invoice.subtotal,
      discount_total: invoice.discount_total,
      tax_total: invoice.tax_total,
      total_due: invoice.total_due,
    })
  }
}

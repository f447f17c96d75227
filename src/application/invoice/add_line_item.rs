use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{
  Amount, InvoiceError, InvoiceService, LineDescription, NewLineItem, Quantity, TaxRate,
};

#[derive(Debug, Deserialize)]
pub struct AddLineItemCommand {
  pub invoice_id: Uuid,
  pub item_id: Option<Uuid>,
  pub description: String,
  pub quantity: u32,
  pub unit_price: Decimal,
  #[serde(default)]
  pub discount_amount: Decimal,
  #[serde(default)]
  pub tax_rate: Decimal,
}

#[derive(Debug, Serialize)]
pub struct LineItemTotalsDto {
  pub line_id: Uuid,
  pub line_subtotal: Decimal,
  pub line_tax_total: Decimal,
  pub line_discount_total: Decimal,
  pub total_after_discount: Decimal,
  pub invoice_total_due: Decimal,
}

pub struct AddLineItemUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl AddLineItemUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: AddLineItemCommand,
  ) -> Result<LineItemTotalsDto, InvoiceError> {
    let (line, totals) = self
      .invoice_service
      .add_line_item(
        command.invoice_id,
        NewLineItem {
          item_id: command.item_id,
          description: LineDescription::new(command.description)?,
          quantity: Quantity::new(command.quantity)?,
          unit_price: Amount::new(command.unit_price)?,
          discount_amount: Amount::new(command.discount_amount)?,
          tax_rate: TaxRate::new(command.tax_rate)?,
        },
      )
      .await?;

    Ok(LineItemTotalsDto {
      line_id: line.id,
      line_subtotal: line.totals.line_subtotal,
      line_tax_total: line.totals.line_tax_total,
      line_discount_total: line.totals.line_discount_total,
      total_after_discount: line.totals.total_after_discount,
      invoice_total_due: totals.total_due,
    })
  }
}

use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{
  Amount, InvoiceError, InvoiceService, LineDescription, NewLineItem, Quantity, TaxRate,
};

use super::add_line_item::LineItemTotalsDto;

#[derive(Debug, Deserialize)]
pub struct UpdateLineItemCommand {
  pub line_id: Uuid,
  pub item_id: Option<Uuid>,
  pub description: String,
  pub quantity: u32,
  pub unit_price: Decimal,
  #[serde(default)]
  pub discount_amount: Decimal,
  #[serde(default)]
  pub tax_rate: Decimal,
}

pub struct UpdateLineItemUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl UpdateLineItemUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: UpdateLineItemCommand,
  ) -> Result<LineItemTotalsDto, InvoiceError> {
    let (line, totals) = self
      .invoice_service
      .update_line_item(
        command.line_id,
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

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{InvoiceError, InvoiceService};

#[derive(Debug, Deserialize)]
pub struct RemoveLineItemCommand {
  pub line_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct RemoveLineItemResponse {
  pub subtotal: Decimal,
  pub discount_total: Decimal,
  pub tax_total: Decimal,
  pub total_due: Decimal,
}

pub struct RemoveLineItemUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl RemoveLineItemUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: RemoveLineItemCommand,
  ) -> Result<RemoveLineItemResponse, InvoiceError> {
    let totals = self
      .invoice_service
      .remove_line_item(command.line_id)
      .await?;

    Ok(RemoveLineItemResponse {
      subtotal: totals.subtotal,
      discount_total: totals.discount_total,
      tax_total: totals.tax_total,
      total_due: totals.total_due,
    })
  }
}

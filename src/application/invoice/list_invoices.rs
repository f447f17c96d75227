use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{InvoiceError, InvoiceFilter, InvoiceService, InvoiceStatus};

#[derive(Debug, Default, Deserialize)]
pub struct ListInvoicesCommand {
  pub status: Option<String>,
  pub customer_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceListItemDto {
  pub invoice_id: Uuid,
  pub invoice_number: String,
  pub customer_id: Option<Uuid>,
  pub status: String,
  pub issue_date: NaiveDate,
  pub total_due: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ListInvoicesResponse {
  pub invoices: Vec<InvoiceListItemDto>,
}

pub struct ListInvoicesUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ListInvoicesUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: ListInvoicesCommand,
  ) -> Result<ListInvoicesResponse, InvoiceError> {
    let status = command
      .status
      .as_deref()
      .map(InvoiceStatus::from_str)
      .transpose()?;

    let invoices = self
      .invoice_service
      .list_invoices(InvoiceFilter {
        status,
        customer_id: command.customer_id,
      })
      .await?;

    let invoices = invoices
      .into_iter()
      .map(|invoice| InvoiceListItemDto {
        invoice_id: invoice.id,
        invoice_number: invoice.invoice_number.into_inner(),
        customer_id: invoice.customer_id,
        status: invoice.status.as_str().to_string(),
        issue_date: invoice.issue_date,
        total_due: invoice.total_due,
      })
      .collect();

    Ok(ListInvoicesResponse { invoices })
  }
}

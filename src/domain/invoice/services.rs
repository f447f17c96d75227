use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::customer::services::CustomerService;

use super::entities::{Invoice, InvoiceLineItem, InvoiceTotals};
use super::errors::InvoiceError;
use super::ports::{InvoiceFilter, InvoiceRepository, LineItemRepository};
use super::value_objects::{
  Amount, InvoiceNumber, InvoiceStatus, LineDescription, PaymentMethod, Quantity, TaxRate,
};

/// Bounded retries when a concurrently created invoice claims the same
/// sequence number first.
const MAX_NUMBERING_ATTEMPTS: u32 = 3;

/// Invoice creation data. Line items attached here bypass the lock check:
/// the invoice has not been persisted yet, so it cannot be issued.
pub struct NewInvoice {
  pub customer_id: Option<Uuid>,
  /// Explicit number; `None` assigns the next EIN sequence number.
  pub invoice_number: Option<InvoiceNumber>,
  pub issue_date: NaiveDate,
  pub due_date: Option<NaiveDate>,
  pub payment_method: Option<PaymentMethod>,
  pub notes: String,
  pub lines: Vec<NewLineItem>,
}

pub struct NewLineItem {
  pub item_id: Option<Uuid>,
  pub description: LineDescription,
  pub quantity: Quantity,
  pub unit_price: Amount,
  pub discount_amount: Amount,
  pub tax_rate: TaxRate,
}

pub struct InvoiceService {
  invoice_repo: Arc<dyn InvoiceRepository>,
  line_repo: Arc<dyn LineItemRepository>,
  customer_service: Arc<CustomerService>,
}

impl InvoiceService {
  pub fn new(
    invoice_repo: Arc<dyn InvoiceRepository>,
    line_repo: Arc<dyn LineItemRepository>,
    customer_service: Arc<CustomerService>,
  ) -> Self {
    Self {
      invoice_repo,
      line_repo,
      customer_service,
    }
  }

  pub async fn create_invoice(
    &self,
    data: NewInvoice,
  ) -> Result<(Invoice, Vec<InvoiceLineItem>), InvoiceError> {
    if let Some(customer_id) = data.customer_id {
      self.verify_customer_exists(customer_id).await?;
    }

    let explicit_number = data.invoice_number.is_some();
    let number = match data.invoice_number {
      Some(number) => number,
      None => self.next_sequence_number().await?,
    };

    let mut invoice = Invoice::new(number, data.customer_id, data.issue_date, data.due_date)?;
    invoice.payment_method = data.payment_method;
    invoice.notes = data.notes;

    let lines: Vec<InvoiceLineItem> = data
      .lines
      .into_iter()
      .map(|line| {
        InvoiceLineItem::new(
          invoice.id,
          line.item_id,
          line.description,
          line.quantity,
          line.unit_price,
          line.discount_amount,
          line.tax_rate,
        )
      })
      .collect::<Result<Vec<_>, InvoiceError>>()?;

    invoice.apply_totals(InvoiceTotals::from_lines(&lines));
    invoice.validate()?;

    let mut attempt = 1;
    let created = loop {
      match self.invoice_repo.create(invoice.clone(), lines.clone()).await {
        Ok(created) => break created,
        Err(InvoiceError::InvoiceNumberAlreadyExists(_))
          if !explicit_number && attempt < MAX_NUMBERING_ATTEMPTS =>
        {
          // Another creation won the race for this sequence number
          attempt += 1;
          invoice.invoice_number = self.next_sequence_number().await?;
        }
        Err(InvoiceError::InvoiceNumberAlreadyExists(_)) if !explicit_number => {
          return Err(InvoiceError::NumberingConflict {
            attempts: MAX_NUMBERING_ATTEMPTS,
          });
        }
        Err(e) => return Err(e),
      }
    };

    tracing::info!(
      invoice_number = %created.invoice_number,
      total_due = %created.total_due,
      "invoice created"
    );
    self.refresh_customer_loyalty(&created).await?;
    Ok((created, lines))
  }

  pub async fn add_line_item(
    &self,
    invoice_id: Uuid,
    data: NewLineItem,
  ) -> Result<(InvoiceLineItem, InvoiceTotals), InvoiceError> {
    let invoice = self.get_invoice(invoice_id).await?;
    Self::ensure_unlocked(&invoice)?;

    let line = InvoiceLineItem::new(
      invoice_id,
      data.item_id,
      data.description,
      data.quantity,
      data.unit_price,
      data.discount_amount,
      data.tax_rate,
    )?;

    let totals = self.line_repo.save_and_recalculate(&line).await?;
    self.refresh_customer_loyalty(&invoice).await?;
    Ok((line, totals))
  }

  pub async fn update_line_item(
    &self,
    line_id: Uuid,
    data: NewLineItem,
  ) -> Result<(InvoiceLineItem, InvoiceTotals), InvoiceError> {
    let mut line = self
      .line_repo
      .find_by_id(line_id)
      .await?
      .ok_or(InvoiceError::LineItemNotFound(line_id))?;
    let invoice = self.get_invoice(line.invoice_id).await?;
    Self::ensure_unlocked(&invoice)?;

    line.item_id = data.item_id;
    line.update(
      data.description,
      data.quantity,
      data.unit_price,
      data.discount_amount,
      data.tax_rate,
    )?;

    let totals = self.line_repo.save_and_recalculate(&line).await?;
    self.refresh_customer_loyalty(&invoice).await?;
    Ok((line, totals))
  }

  pub async fn remove_line_item(&self, line_id: Uuid) -> Result<InvoiceTotals, InvoiceError> {
    let line = self
      .line_repo
      .find_by_id(line_id)
      .await?
      .ok_or(InvoiceError::LineItemNotFound(line_id))?;
    let invoice = self.get_invoice(line.invoice_id).await?;
    Self::ensure_unlocked(&invoice)?;

    let totals = self.line_repo.delete_and_recalculate(line_id).await?;
    self.refresh_customer_loyalty(&invoice).await?;
    Ok(totals)
  }

  /// Controlled status transition: the only write allowed on a locked
  /// invoice. A payment method supplied here is recorded before the
  /// transition guards run.
  pub async fn change_status(
    &self,
    invoice_id: Uuid,
    new_status: InvoiceStatus,
    payment_method: Option<PaymentMethod>,
  ) -> Result<Invoice, InvoiceError> {
    let mut invoice = self.get_invoice(invoice_id).await?;

    if let Some(method) = payment_method {
      invoice.payment_method = Some(method);
    }

    if new_status == InvoiceStatus::Issued {
      let line_count = self.line_repo.count_by_invoice_id(invoice_id).await?;
      if line_count == 0 {
        return Err(InvoiceError::NoLineItems);
      }
    }

    invoice.change_status(new_status)?;
    invoice.validate()?;
    self.invoice_repo.update_status(&invoice).await?;

    tracing::info!(
      invoice_number = %invoice.invoice_number,
      status = %invoice.status,
      "invoice status changed"
    );
    self.refresh_customer_loyalty(&invoice).await?;
    Ok(invoice)
  }

  /// Explicit aggregate recomputation from the stored line set.
  pub async fn recalculate(&self, invoice_id: Uuid) -> Result<InvoiceTotals, InvoiceError> {
    let invoice = self.get_invoice(invoice_id).await?;
    let totals = self.invoice_repo.recalculate(invoice_id).await?;
    self.refresh_customer_loyalty(&invoice).await?;
    Ok(totals)
  }

  pub async fn get_invoice(&self, invoice_id: Uuid) -> Result<Invoice, InvoiceError> {
    self
      .invoice_repo
      .find_by_id(invoice_id)
      .await?
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))
  }

  pub async fn get_invoice_details(
    &self,
    invoice_id: Uuid,
  ) -> Result<(Invoice, Vec<InvoiceLineItem>), InvoiceError> {
    let invoice = self.get_invoice(invoice_id).await?;
    let lines = self.line_repo.find_by_invoice_id(invoice_id).await?;
    Ok((invoice, lines))
  }

  pub async fn list_invoices(&self, filter: InvoiceFilter) -> Result<Vec<Invoice>, InvoiceError> {
    self.invoice_repo.list(filter).await
  }

  async fn next_sequence_number(&self) -> Result<InvoiceNumber, InvoiceError> {
    let suffix = self.invoice_repo.max_sequence_suffix().await?;
    Ok(InvoiceNumber::next_in_sequence(suffix))
  }

  fn ensure_unlocked(invoice: &Invoice) -> Result<(), InvoiceError> {
    if invoice.is_locked() {
      return Err(InvoiceError::Locked {
        invoice_number: invoice.invoice_number.value().to_string(),
        status: invoice.status,
      });
    }
    Ok(())
  }

  async fn verify_customer_exists(&self, customer_id: Uuid) -> Result<(), InvoiceError> {
    self
      .customer_service
      .get_customer(customer_id)
      .await
      .map_err(|_| InvoiceError::CustomerNotFound(customer_id))?;
    Ok(())
  }

  /// Runs only after the aggregate write has committed, in the same request.
  /// The tier is derived from already-persisted invoices, so a refresh never
  /// observes a partially applied change; it is not atomic with that write,
  /// and a manually locked tier is left untouched.
  async fn refresh_customer_loyalty(&self, invoice: &Invoice) -> Result<(), InvoiceError> {
    if let Some(customer_id) = invoice.customer_id {
      self
        .customer_service
        .refresh_loyalty(customer_id)
        .await
        .map_err(|e| InvoiceError::Internal(format!("Failed to refresh loyalty: {}", e)))?;
    }
    Ok(())
  }
}

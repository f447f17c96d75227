use async_trait::async_trait;
use uuid::Uuid;

use super::entities::{CatalogItem, Invoice, InvoiceLineItem, InvoiceTotals};
use super::errors::InvoiceError;
use super::value_objects::InvoiceStatus;

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
  /// Persists a new invoice together with its initial line collection and
  /// the aggregates computed from it, in one transaction. A duplicate
  /// invoice number fails with `InvoiceNumberAlreadyExists` so the caller
  /// can retry sequence assignment.
  async fn create(
    &self,
    invoice: Invoice,
    lines: Vec<InvoiceLineItem>,
  ) -> Result<Invoice, InvoiceError>;

  /// Full header update. Aggregate columns are excluded; they only move
  /// through the recalculating operations.
  async fn update_header(&self, invoice: &Invoice) -> Result<(), InvoiceError>;

  /// Partial update of status and payment method.
  async fn update_status(&self, invoice: &Invoice) -> Result<(), InvoiceError>;

  /// Recomputes aggregates from the stored line set under a row lock on the
  /// invoice and persists them, in one transaction.
  async fn recalculate(&self, invoice_id: Uuid) -> Result<InvoiceTotals, InvoiceError>;

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError>;
  async fn list(&self, filter: InvoiceFilter) -> Result<Vec<Invoice>, InvoiceError>;

  /// Highest numeric suffix among sequence-assigned (`EIN`-prefixed)
  /// invoice numbers.
  async fn max_sequence_suffix(&self) -> Result<Option<u64>, InvoiceError>;

  async fn count_for_customer(&self, customer_id: Uuid) -> Result<u64, InvoiceError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceFilter {
  pub status: Option<InvoiceStatus>,
  pub customer_id: Option<Uuid>,
}

#[async_trait]
pub trait LineItemRepository: Send + Sync {
  /// Inserts or updates a line and recomputes the parent invoice's
  /// aggregates in the same transaction, holding a row lock on the invoice.
  /// Fails with `Locked` when the invoice is no longer a draft.
  async fn save_and_recalculate(
    &self,
    line: &InvoiceLineItem,
  ) -> Result<InvoiceTotals, InvoiceError>;

  /// Deletes a line and recomputes the parent invoice's aggregates in the
  /// same transaction.
  async fn delete_and_recalculate(&self, line_id: Uuid) -> Result<InvoiceTotals, InvoiceError>;

  /// Replaces the full line collection of an invoice and recomputes its
  /// aggregates, in one transaction. Used by ingestion, which owns the
  /// authoritative line set for synced invoices.
  async fn replace_for_invoice(
    &self,
    invoice_id: Uuid,
    lines: Vec<InvoiceLineItem>,
  ) -> Result<InvoiceTotals, InvoiceError>;

  async fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceLineItem>, InvoiceError>;
  async fn find_by_invoice_id(
    &self,
    invoice_id: Uuid,
  ) -> Result<Vec<InvoiceLineItem>, InvoiceError>;
  async fn count_by_invoice_id(&self, invoice_id: Uuid) -> Result<u64, InvoiceError>;
}

#[async_trait]
pub trait CatalogItemRepository: Send + Sync {
  async fn find_by_name(&self, name: &str) -> Result<Option<CatalogItem>, InvoiceError>;

  /// Returns the existing item with this name or creates one. Ingestion
  /// uses it to map free-text product descriptions onto the catalog.
  async fn get_or_create(&self, item: CatalogItem) -> Result<CatalogItem, InvoiceError>;
}

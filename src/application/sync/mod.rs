pub mod ingest_invoice;
pub mod sync_invoices;

use thiserror::Error;

use crate::domain::customer::CustomerError;
use crate::domain::invoice::InvoiceError;
use crate::domain::sync::GatewayError;

pub use ingest_invoice::{IngestInvoiceResponse, IngestInvoiceUseCase};
pub use sync_invoices::{SyncInvoicesUseCase, SyncSummary};

#[derive(Debug, Error)]
pub enum SyncError {
  #[error(transparent)]
  Gateway(#[from] GatewayError),

  #[error(transparent)]
  Invoice(#[from] InvoiceError),

  #[error(transparent)]
  Customer(#[from] CustomerError),

  #[error("Unparseable issue date '{0}', expected %d-%m-%Y")]
  InvalidIssueDate(String),

  #[error("Malformed invoice payload: {0}")]
  InvalidPayload(String),
}

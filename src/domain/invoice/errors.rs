use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::value_objects::{InvoiceStatus, ValueObjectError};

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Invoice not found: {0}")]
  InvoiceNotFound(Uuid),

  #[error("Line item not found: {0}")]
  LineItemNotFound(Uuid),

  #[error("Customer not found: {0}")]
  CustomerNotFound(Uuid),

  #[error("Invoice number '{0}' already exists")]
  InvoiceNumberAlreadyExists(String),

  #[error("Could not assign a unique invoice number after {attempts} attempts")]
  NumberingConflict { attempts: u32 },

  #[error("Cannot change status from {from} to {to}")]
  InvalidStatusTransition {
    from: InvoiceStatus,
    to: InvoiceStatus,
  },

  #[error("Invoice {invoice_number} is {status} and locked against edits")]
  Locked {
    invoice_number: String,
    status: InvoiceStatus,
  },

  #[error("Payment method is required when marking an invoice as {to}")]
  PaymentMethodRequired { to: InvoiceStatus },

  #[error("Paid invoices must have a positive total, got {total_due}")]
  NonPositiveTotal { total_due: Decimal },

  #[error("Invoice must contain at least one line item")]
  NoLineItems,

  #[error("Due date {due_date} cannot be earlier than the issue date {issue_date}")]
  DueDateBeforeIssueDate {
    due_date: NaiveDate,
    issue_date: NaiveDate,
  },

  #[error("Discount {discount} cannot exceed subtotal {subtotal}")]
  DiscountExceedsSubtotal { discount: Decimal, subtotal: Decimal },

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Internal error: {0}")]
  Internal(String),
}

use thiserror::Error;
use uuid::Uuid;

use crate::domain::invoice::errors::InvoiceError;

#[derive(Debug, Error)]
pub enum CustomerError {
  #[error("Customer not found: {0}")]
  CustomerNotFound(Uuid),

  #[error("Either first and last name or a display name must be provided")]
  MissingName,

  #[error("Email is required when preferred contact method is email")]
  EmailRequired,

  #[error("Phone number is required when preferred contact method is {0}")]
  PhoneRequired(String),

  #[error("Unknown contact method: {0}")]
  UnknownContactMethod(String),

  #[error("Unknown loyalty tier: {0}")]
  UnknownLoyaltyTier(String),

  #[error(
    "Loyalty thresholds must be strictly ascending, got silver={silver}, gold={gold}, platinum={platinum}"
  )]
  ThresholdsNotAscending {
    silver: u64,
    gold: u64,
    platinum: u64,
  },

  #[error("Invoice lookup failed: {0}")]
  Invoice(#[from] InvoiceError),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Internal error: {0}")]
  Internal(String),
}

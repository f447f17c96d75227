use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid invoice number: {0}")]
  InvalidInvoiceNumber(String),
  #[error("Invalid quantity: {0}")]
  InvalidQuantity(String),
  #[error("Invalid amount: {0}")]
  InvalidAmount(String),
  #[error("Invalid tax rate: {0}")]
  InvalidTaxRate(String),
  #[error("Invalid line description: {0}")]
  InvalidDescription(String),
  #[error("Invalid invoice status: {0}")]
  InvalidStatus(String),
  #[error("Invalid payment method: {0}")]
  InvalidPaymentMethod(String),
}

/// Rounds a monetary figure to the currency's minor-unit precision.
pub fn quantize(amount: Decimal) -> Decimal {
  amount.round_dp(2)
}

// Invoice Number - unique, human readable, EIN-prefixed when auto-assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
  pub const SEQUENCE_PREFIX: &'static str = "EIN";

  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 100 {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot exceed 100 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  /// Next number in the `EIN00001, EIN00002, ...` sequence given the highest
  /// numeric suffix already assigned.
  pub fn next_in_sequence(max_assigned_suffix: Option<u64>) -> Self {
    let next = max_assigned_suffix.map_or(1, |n| n + 1);
    Self(format!("{}{:05}", Self::SEQUENCE_PREFIX, next))
  }

  /// Numeric suffix of a sequence-assigned number. `None` for manually
  /// entered numbers that do not follow the EIN format.
  pub fn sequence_suffix(&self) -> Option<u64> {
    self
      .0
      .strip_prefix(Self::SEQUENCE_PREFIX)
      .and_then(|digits| digits.parse::<u64>().ok())
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for InvoiceNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Invoice Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
  Draft,
  Issued,
  Paid,
  Cancelled,
  Refunded,
}

impl InvoiceStatus {
  pub fn can_transition_to(&self, new_status: InvoiceStatus) -> bool {
    match (self, new_status) {
      (InvoiceStatus::Draft, InvoiceStatus::Issued) => true,
      (InvoiceStatus::Draft, InvoiceStatus::Cancelled) => true,
      (InvoiceStatus::Issued, InvoiceStatus::Paid) => true,
      (InvoiceStatus::Issued, InvoiceStatus::Cancelled) => true,
      (InvoiceStatus::Paid, InvoiceStatus::Refunded) => true,
      // Cancelled and Refunded are terminal
      _ => false,
    }
  }

  /// Drafts are the only freely editable state. Issuing locks the invoice;
  /// later states keep it locked.
  pub fn is_editable(&self) -> bool {
    matches!(self, InvoiceStatus::Draft)
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, InvoiceStatus::Cancelled | InvoiceStatus::Refunded)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      InvoiceStatus::Draft => "draft",
      InvoiceStatus::Issued => "issued",
      InvoiceStatus::Paid => "paid",
      InvoiceStatus::Cancelled => "cancelled",
      InvoiceStatus::Refunded => "refunded",
    }
  }

  pub fn display_label(&self) -> &'static str {
    match self {
      InvoiceStatus::Draft => "Draft",
      InvoiceStatus::Issued => "Issued",
      InvoiceStatus::Paid => "Paid",
      InvoiceStatus::Cancelled => "Cancelled",
      InvoiceStatus::Refunded => "Refunded",
    }
  }
}

impl FromStr for InvoiceStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "draft" => Ok(InvoiceStatus::Draft),
      "issued" => Ok(InvoiceStatus::Issued),
      "paid" => Ok(InvoiceStatus::Paid),
      "cancelled" => Ok(InvoiceStatus::Cancelled),
      "refunded" => Ok(InvoiceStatus::Refunded),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown status: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for InvoiceStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.display_label())
  }
}

// Payment Method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
  Cash,
  Card,
  Mobile,
  GiftCard,
  Account,
}

impl PaymentMethod {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentMethod::Cash => "cash",
      PaymentMethod::Card => "card",
      PaymentMethod::Mobile => "mobile",
      PaymentMethod::GiftCard => "gift_card",
      PaymentMethod::Account => "account",
    }
  }
}

impl FromStr for PaymentMethod {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "cash" => Ok(PaymentMethod::Cash),
      "card" => Ok(PaymentMethod::Card),
      "mobile" => Ok(PaymentMethod::Mobile),
      "gift_card" | "giftcard" => Ok(PaymentMethod::GiftCard),
      "account" => Ok(PaymentMethod::Account),
      _ => Err(ValueObjectError::InvalidPaymentMethod(format!(
        "Unknown payment method: {}",
        s
      ))),
    }
  }
}

// Quantity - positive whole units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
  pub fn new(value: u32) -> Result<Self, ValueObjectError> {
    if value == 0 {
      return Err(ValueObjectError::InvalidQuantity(
        "Quantity must be positive".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> u32 {
    self.0
  }

  pub fn as_decimal(&self) -> Decimal {
    Decimal::from(self.0)
  }
}

// Amount - non-negative money value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
  pub const ZERO: Amount = Amount(Decimal::ZERO);

  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value.is_sign_negative() {
      return Err(ValueObjectError::InvalidAmount(
        "Amount cannot be negative".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

// Tax Rate - percentage applied to the line subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(Decimal);

impl TaxRate {
  pub const ZERO: TaxRate = TaxRate(Decimal::ZERO);

  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value < Decimal::ZERO || value > Decimal::from(100) {
      return Err(ValueObjectError::InvalidTaxRate(
        "Tax rate must be between 0 and 100".to_string(),
      ));
    }
    if value.scale() > 2 {
      return Err(ValueObjectError::InvalidTaxRate(
        "Tax rate cannot have more than 2 decimal places".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }

  pub fn as_multiplier(&self) -> Decimal {
    self.0 / Decimal::from(100)
  }
}

// Line Description - snapshot of the catalog item name at sale time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDescription(String);

impl LineDescription {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidDescription(
        "Description cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 100 {
      return Err(ValueObjectError::InvalidDescription(
        "Description cannot exceed 100 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

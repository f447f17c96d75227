use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::InvoiceError;
use super::value_objects::{
  Amount, InvoiceNumber, InvoiceStatus, LineDescription, PaymentMethod, Quantity, TaxRate,
  quantize,
};

// Catalog Item - priced product the store sells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
  pub id: Uuid,
  pub sku: String,
  pub name: String,
  pub base_price: Decimal,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
  pub fn new(sku: String, name: String, base_price: Decimal) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      sku,
      name,
      base_price,
      created_at: now,
      updated_at: now,
    }
  }
}

/// Derived figures for a single line, quantized to the currency's
/// two-decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTotals {
  pub line_subtotal: Decimal,
  pub line_tax_total: Decimal,
  pub line_discount_total: Decimal,
  pub total_after_discount: Decimal,
}

impl LineTotals {
  /// Values the line. Quantity and price non-negativity are enforced by the
  /// value objects; the only remaining failure is a discount larger than the
  /// line subtotal.
  pub fn compute(
    quantity: Quantity,
    unit_price: Amount,
    discount_amount: Amount,
    tax_rate: TaxRate,
  ) -> Result<Self, InvoiceError> {
    let line_subtotal = quantize(quantity.as_decimal() * unit_price.value());
    if discount_amount.value() > line_subtotal {
      return Err(InvoiceError::DiscountExceedsSubtotal {
        discount: discount_amount.value(),
        subtotal: line_subtotal,
      });
    }
    let line_tax_total = quantize(line_subtotal * tax_rate.as_multiplier());
    let line_discount_total = quantize(discount_amount.value());
    let total_after_discount = line_subtotal + line_tax_total - line_discount_total;

    Ok(Self {
      line_subtotal,
      line_tax_total,
      line_discount_total,
      total_after_discount,
    })
  }
}

// Invoice Line Item
//
// Carries a description snapshot alongside the optional catalog reference so
// history stays intact when items are renamed or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
  pub id: Uuid,
  pub invoice_id: Uuid,
  pub item_id: Option<Uuid>,
  pub description: LineDescription,
  pub quantity: Quantity,
  pub unit_price: Amount,
  pub discount_amount: Amount,
  pub tax_rate: TaxRate,
  pub totals: LineTotals,
}

impl InvoiceLineItem {
  pub fn new(
    invoice_id: Uuid,
    item_id: Option<Uuid>,
    description: LineDescription,
    quantity: Quantity,
    unit_price: Amount,
    discount_amount: Amount,
    tax_rate: TaxRate,
  ) -> Result<Self, InvoiceError> {
    let totals = LineTotals::compute(quantity, unit_price, discount_amount, tax_rate)?;
    Ok(Self {
      id: Uuid::new_v4(),
      invoice_id,
      item_id,
      description,
      quantity,
      unit_price,
      discount_amount,
      tax_rate,
      totals,
    })
  }

  pub fn update(
    &mut self,
    description: LineDescription,
    quantity: Quantity,
    unit_price: Amount,
    discount_amount: Amount,
    tax_rate: TaxRate,
  ) -> Result<(), InvoiceError> {
    let totals = LineTotals::compute(quantity, unit_price, discount_amount, tax_rate)?;
    self.description = description;
    self.quantity = quantity;
    self.unit_price = unit_price;
    self.discount_amount = discount_amount;
    self.tax_rate = tax_rate;
    self.totals = totals;
    Ok(())
  }
}

/// Invoice-level aggregates derived from the full line collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
  pub subtotal: Decimal,
  pub discount_total: Decimal,
  pub tax_total: Decimal,
  pub total_due: Decimal,
}

impl InvoiceTotals {
  pub const ZERO: InvoiceTotals = InvoiceTotals {
    subtotal: Decimal::ZERO,
    discount_total: Decimal::ZERO,
    tax_total: Decimal::ZERO,
    total_due: Decimal::ZERO,
  };

  /// Recomputes aggregates from the current line set. An empty collection
  /// resets everything to zero.
  pub fn from_lines(lines: &[InvoiceLineItem]) -> Self {
    let mut subtotal = Decimal::ZERO;
    let mut discount_total = Decimal::ZERO;
    let mut tax_total = Decimal::ZERO;
    for line in lines {
      subtotal += line.totals.line_subtotal;
      discount_total += line.totals.line_discount_total;
      tax_total += line.totals.line_tax_total;
    }
    let subtotal = quantize(subtotal);
    let discount_total = quantize(discount_total);
    let tax_total = quantize(tax_total);

    Self {
      subtotal,
      discount_total,
      tax_total,
      total_due: subtotal + tax_total - discount_total,
    }
  }
}

/// Header fields a presentation layer may offer for editing. Everything but
/// the status freezes once the invoice leaves Draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceField {
  Customer,
  IssueDate,
  DueDate,
  PaymentMethod,
  Notes,
  LineItems,
  Status,
}

// Invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
  pub id: Uuid,
  pub invoice_number: InvoiceNumber,
  pub customer_id: Option<Uuid>,
  pub status: InvoiceStatus,
  pub issue_date: NaiveDate,
  pub due_date: Option<NaiveDate>,
  pub payment_method: Option<PaymentMethod>,
  pub subtotal: Decimal,
  pub discount_total: Decimal,
  pub tax_total: Decimal,
  pub total_due: Decimal,
  pub currency_name: String,
  pub notes: String,
  pub seller_name: Option<String>,
  pub seller_tax_number: Option<String>,
  pub qr_base64: Option<String>,
  pub qr_image: Option<Vec<u8>>,
  pub xml: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

pub const DEFAULT_CURRENCY: &str = "JOD";

impl Invoice {
  pub fn new(
    invoice_number: InvoiceNumber,
    customer_id: Option<Uuid>,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
  ) -> Result<Self, InvoiceError> {
    if let Some(due) = due_date {
      if due < issue_date {
        return Err(InvoiceError::DueDateBeforeIssueDate {
          due_date: due,
          issue_date,
        });
      }
    }
    let now = Utc::now();
    Ok(Self {
      id: Uuid::new_v4(),
      invoice_number,
      customer_id,
      status: InvoiceStatus::Draft,
      issue_date,
      due_date,
      payment_method: None,
      subtotal: Decimal::ZERO,
      discount_total: Decimal::ZERO,
      tax_total: Decimal::ZERO,
      total_due: Decimal::ZERO,
      currency_name: DEFAULT_CURRENCY.to_string(),
      notes: String::new(),
      seller_name: None,
      seller_tax_number: None,
      qr_base64: None,
      qr_image: None,
      xml: None,
      created_at: now,
      updated_at: now,
    })
  }

  /// Record-level invariants checked before any persistence.
  pub fn validate(&self) -> Result<(), InvoiceError> {
    if let Some(due) = self.due_date {
      if due < self.issue_date {
        return Err(InvoiceError::DueDateBeforeIssueDate {
          due_date: due,
          issue_date: self.issue_date,
        });
      }
    }
    if self.discount_total > self.subtotal {
      return Err(InvoiceError::DiscountExceedsSubtotal {
        discount: self.discount_total,
        subtotal: self.subtotal,
      });
    }
    Ok(())
  }

  pub fn apply_totals(&mut self, totals: InvoiceTotals) {
    self.subtotal = totals.subtotal;
    self.discount_total = totals.discount_total;
    self.tax_total = totals.tax_total;
    self.total_due = totals.total_due;
    self.updated_at = Utc::now();
  }

  /// Issued and later statuses reject writes to the invoice and its lines.
  pub fn is_locked(&self) -> bool {
    !self.status.is_editable()
  }

  pub fn is_field_editable(&self, field: InvoiceField) -> bool {
    if !self.is_locked() {
      return true;
    }
    // Locked invoices only move through controlled status transitions
    matches!(field, InvoiceField::Status) && !self.status.is_terminal()
  }

  /// Validates and applies a status transition. Field-presence rules that
  /// depend on the line collection (issuing requires at least one line) are
  /// enforced by the service, which owns the line repository.
  pub fn change_status(&mut self, new_status: InvoiceStatus) -> Result<(), InvoiceError> {
    if !self.status.can_transition_to(new_status) {
      return Err(InvoiceError::InvalidStatusTransition {
        from: self.status,
        to: new_status,
      });
    }
    match new_status {
      InvoiceStatus::Issued => {
        if self.payment_method.is_none() {
          return Err(InvoiceError::PaymentMethodRequired { to: new_status });
        }
      }
      InvoiceStatus::Paid => {
        if self.payment_method.is_none() {
          return Err(InvoiceError::PaymentMethodRequired { to: new_status });
        }
        if self.total_due <= Decimal::ZERO {
          return Err(InvoiceError::NonPositiveTotal {
            total_due: self.total_due,
          });
        }
      }
      _ => {}
    }
    self.status = new_status;
    self.updated_at = Utc::now();
    Ok(())
  }
}

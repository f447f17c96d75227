use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::customer::CustomerService;
use crate::domain::invoice::{
  Amount, CatalogItem, CatalogItemRepository, Invoice, InvoiceLineItem, InvoiceNumber,
  InvoiceRepository, InvoiceTotals, LineDescription, LineItemRepository, Quantity, TaxRate,
};
use crate::domain::sync::{InvoiceItemDto, InvoicePayload};

use super::SyncError;

/// Descriptions longer than the catalog limit are truncated, not rejected;
/// the upstream service is the source of record and must always ingest.
const MAX_DESCRIPTION_CHARS: usize = 100;

#[derive(Debug, Serialize)]
pub struct IngestInvoiceResponse {
  pub invoice_id: Uuid,
  pub invoice_number: String,
  pub created: bool,
  pub line_count: usize,
  pub total_due: Decimal,
}

/// Maps one upstream invoice payload onto the local schema. Re-ingesting the
/// same identifier overwrites the header and replaces the line collection,
/// so repeated syncs converge instead of duplicating.
pub struct IngestInvoiceUseCase {
  invoice_repo: Arc<dyn InvoiceRepository>,
  line_repo: Arc<dyn LineItemRepository>,
  item_repo: Arc<dyn CatalogItemRepository>,
  customer_service: Arc<CustomerService>,
}

impl IngestInvoiceUseCase {
  pub fn new(
    invoice_repo: Arc<dyn InvoiceRepository>,
    line_repo: Arc<dyn LineItemRepository>,
    item_repo: Arc<dyn CatalogItemRepository>,
    customer_service: Arc<CustomerService>,
  ) -> Self {
    Self {
      invoice_repo,
      line_repo,
      item_repo,
      customer_service,
    }
  }

  pub async fn execute(
    &self,
    payload: InvoicePayload,
  ) -> Result<IngestInvoiceResponse, SyncError> {
    let invoice_number = InvoiceNumber::new(payload.invoice_number.clone())
      .map_err(|e| SyncError::InvalidPayload(e.to_string()))?;

    let issue_date = match payload.issue_date.as_deref() {
      Some(raw) => NaiveDate::parse_from_str(raw, "%d-%m-%Y")
        .map_err(|_| SyncError::InvalidIssueDate(raw.to_string()))?,
      None => Utc::now().date_naive(),
    };

    let customer_id = match payload
      .customer_dto
      .as_ref()
      .and_then(|c| c.customer_name.as_deref())
      .map(str::trim)
      .filter(|name| !name.is_empty())
    {
      Some(name) => Some(self.customer_service.get_or_create_by_name(name).await?.id),
      None => None,
    };

    let invoice_id = payload.invoice_unique_identifier;
    let lines = self
      .build_lines(invoice_id, invoice_number.value(), &payload.invoice_item_dto_list)
      .await?;

    let (qr_base64, qr_image) = decode_qr(payload.qr_code_image.clone());

    let existing = self.invoice_repo.find_by_id(invoice_id).await?;
    let (invoice, totals, created) = match existing {
      None => {
        let mut invoice = Invoice::new(invoice_number, customer_id, issue_date, None)?;
        invoice.id = invoice_id;
        apply_payload_header(&mut invoice, &payload, qr_base64, qr_image);
        invoice.apply_totals(InvoiceTotals::from_lines(&lines));
        let created = self.invoice_repo.create(invoice, lines.clone()).await?;
        let totals = InvoiceTotals {
          subtotal: created.subtotal,
          discount_total: created.discount_total,
          tax_total: created.tax_total,
          total_due: created.total_due,
        };
        (created, totals, true)
      }
      Some(mut invoice) => {
        invoice.invoice_number = invoice_number;
        invoice.customer_id = customer_id;
        invoice.issue_date = issue_date;
        apply_payload_header(&mut invoice, &payload, qr_base64, qr_image);
        self.invoice_repo.update_header(&invoice).await?;
        let totals = self.line_repo.replace_for_invoice(invoice_id, lines.clone()).await?;
        (invoice, totals, false)
      }
    };

    if let Some(customer_id) = customer_id {
      self.customer_service.refresh_loyalty(customer_id).await?;
    }

    tracing::info!(
      invoice_number = %invoice.invoice_number,
      created,
      line_count = lines.len(),
      total_due = %totals.total_due,
      "invoice ingested"
    );

    Ok(IngestInvoiceResponse {
      invoice_id: invoice.id,
      invoice_number: invoice.invoice_number.into_inner(),
      created,
      line_count: lines.len(),
      total_due: totals.total_due,
    })
  }

  /// Upstream line items are sparse; absent figures fall back to a quantity
  /// of one and zero amounts. Each description is registered in the catalog
  /// under a sync-derived SKU so repeated ingests reuse the same item.
  async fn build_lines(
    &self,
    invoice_id: Uuid,
    invoice_number: &str,
    items: &[InvoiceItemDto],
  ) -> Result<Vec<InvoiceLineItem>, SyncError> {
    let mut lines = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
      let description: String = item
        .product_description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("Imported item")
        .chars()
        .take(MAX_DESCRIPTION_CHARS)
        .collect();
      let quantity = item.quantity.unwrap_or(1).max(1);
      let unit_price = item.unit_price.unwrap_or(Decimal::ZERO);
      let discount = item.discount.unwrap_or(Decimal::ZERO);

      let line_ref = item
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| (index + 1).to_string());
      let catalog_item = self
        .item_repo
        .get_or_create(CatalogItem::new(
          format!("SKU-{}-{}", invoice_number, line_ref),
          description.clone(),
          unit_price,
        ))
        .await?;

      lines.push(InvoiceLineItem::new(
        invoice_id,
        Some(catalog_item.id),
        LineDescription::new(description).map_err(|e| SyncError::InvalidPayload(e.to_string()))?,
        Quantity::new(quantity).map_err(|e| SyncError::InvalidPayload(e.to_string()))?,
        Amount::new(unit_price).map_err(|e| SyncError::InvalidPayload(e.to_string()))?,
        Amount::new(discount).map_err(|e| SyncError::InvalidPayload(e.to_string()))?,
        TaxRate::ZERO,
      )?);
    }
    Ok(lines)
  }
}

fn apply_payload_header(
  invoice: &mut Invoice,
  payload: &InvoicePayload,
  qr_base64: Option<String>,
  qr_image: Option<Vec<u8>>,
) {
  if let Some(currency) = payload
    .currency_enum
    .as_deref()
    .map(str::trim)
    .filter(|c| !c.is_empty())
  {
    invoice.currency_name = currency.to_string();
  }
  if let Some(seller) = payload.seller_dto.as_ref() {
    invoice.seller_name = seller.name.clone();
    invoice.seller_tax_number = seller.tax_number.clone();
  }
  invoice.qr_base64 = qr_base64;
  invoice.qr_image = qr_image;
  invoice.xml = payload.xml.clone();
}

/// Decodes the QR image, tolerating an optional `data:image/...;base64,`
/// prefix. A malformed image keeps the raw string and drops the bytes.
fn decode_qr(raw: Option<String>) -> (Option<String>, Option<Vec<u8>>) {
  let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
    return (None, None);
  };
  let encoded = raw
    .split_once(";base64,")
    .map(|(_, rest)| rest)
    .unwrap_or(raw.as_str());
  match BASE64.decode(encoded.trim()) {
    Ok(bytes) => (Some(raw), Some(bytes)),
    Err(e) => {
      tracing::warn!(error = %e, "discarding undecodable QR image");
      (Some(raw), None)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decode_qr_strips_data_url_prefix() {
    let raw = format!("data:image/png;base64,{}", BASE64.encode(b"qr-bytes"));
    let (kept, bytes) = decode_qr(Some(raw.clone()));
    assert_eq!(kept, Some(raw));
    assert_eq!(bytes.as_deref(), Some(b"qr-bytes".as_slice()));
  }

  #[test]
  fn test_decode_qr_accepts_bare_base64() {
    let (_, bytes) = decode_qr(Some(BASE64.encode(b"plain")));
    assert_eq!(bytes.as_deref(), Some(b"plain".as_slice()));
  }

  #[test]
  fn test_decode_qr_keeps_raw_string_on_garbage() {
    let (kept, bytes) = decode_qr(Some("not base64!!".to_string()));
    assert_eq!(kept.as_deref(), Some("not base64!!"));
    assert!(bytes.is_none());
  }

  #[test]
  fn test_decode_qr_empty_is_none() {
    assert_eq!(decode_qr(Some("  ".to_string())), (None, None));
    assert_eq!(decode_qr(None), (None, None));
  }
}

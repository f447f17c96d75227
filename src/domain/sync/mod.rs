//! Port and wire types for the JoFotara e-invoicing service, which is the
//! upstream source of record for issued invoices.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("Missing JoFotara credentials")]
  MissingCredentials,

  #[error("JoFotara login failed: {0}")]
  LoginFailed(String),

  #[error("JoFotara request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Malformed JoFotara payload: {0}")]
  InvalidPayload(String),
}

/// One row of the paginated invoice list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
  pub uuid: Uuid,
  pub invoice_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerDto {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub tax_number: Option<String>,
  #[serde(default)]
  pub mobile_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
  #[serde(default)]
  pub customer_name: Option<String>,
  #[serde(default)]
  pub additional_customer_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItemDto {
  #[serde(default)]
  pub id: Option<i64>,
  #[serde(default)]
  pub product_description: Option<String>,
  #[serde(default)]
  pub quantity: Option<u32>,
  #[serde(default)]
  pub unit_price: Option<Decimal>,
  #[serde(default)]
  pub discount: Option<Decimal>,
  #[serde(default)]
  pub subtotal_amount: Option<Decimal>,
}

/// Full invoice detail payload. Optional fields are tolerated and defaulted
/// during ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
  pub invoice_unique_identifier: Uuid,
  pub invoice_number: String,
  /// Formatted `%d-%m-%Y` by the upstream service.
  #[serde(default)]
  pub issue_date: Option<String>,
  #[serde(default)]
  pub currency_enum: Option<String>,
  #[serde(default)]
  pub total_payable_amount: Option<Decimal>,
  #[serde(default, rename = "sellerDTO")]
  pub seller_dto: Option<SellerDto>,
  #[serde(default, rename = "customerDTO")]
  pub customer_dto: Option<CustomerDto>,
  #[serde(default, rename = "invoiceItemDTOList")]
  pub invoice_item_dto_list: Vec<InvoiceItemDto>,
  #[serde(default)]
  pub qr_code_image: Option<String>,
  #[serde(default)]
  pub xml: Option<String>,
}

/// Session-based client for the JoFotara portal.
#[async_trait]
pub trait JofotaraGateway: Send + Sync {
  /// Establishes the portal session. Must be called before fetches; a
  /// failure aborts the whole sync batch.
  async fn login(&self) -> Result<(), GatewayError>;

  /// Fetches one page of the invoice list. An empty page marks the end.
  async fn fetch_invoice_page(&self, page: u32) -> Result<Vec<InvoiceSummary>, GatewayError>;

  async fn fetch_invoice(
    &self,
    uuid: Uuid,
    invoice_number: &str,
  ) -> Result<InvoicePayload, GatewayError>;
}

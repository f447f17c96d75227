use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::sync::{GatewayError, InvoicePayload, InvoiceSummary, JofotaraGateway};
use crate::infrastructure::config::JofotaraConfig;

/// Session-cookie client for the JoFotara portal. The portal has no API
/// tokens; it authenticates through the regular login form and keeps the
/// session in a cookie, so the client carries a cookie store.
pub struct JofotaraClient {
  http: Client,
  config: JofotaraConfig,
  page_size: u32,
}

impl JofotaraClient {
  pub fn new(config: JofotaraConfig, page_size: u32) -> Result<Self, GatewayError> {
    let http = Client::builder()
      .cookie_store(true)
      .timeout(Duration::from_secs(config.request_timeout_seconds))
      .build()?;

    Ok(Self {
      http,
      config,
      page_size,
    })
  }
}

#[async_trait]
impl JofotaraGateway for JofotaraClient {
  async fn login(&self) -> Result<(), GatewayError> {
    let (Some(username), Some(password)) = (
      self.config.username.as_deref(),
      self.config.password.as_deref(),
    ) else {
      return Err(GatewayError::MissingCredentials);
    };

    // Prime the session cookie before posting the credentials form
    self
      .http
      .get(&self.config.login_page_url)
      .send()
      .await?
      .error_for_status()?;

    let response = self
      .http
      .post(&self.config.login_post_url)
      .form(&[("username", username), ("password", password)])
      .send()
      .await?;

    if !response.status().is_success() {
      return Err(GatewayError::LoginFailed(format!(
        "login rejected with status {}",
        response.status()
      )));
    }

    tracing::debug!("JoFotara session established");
    Ok(())
  }

  async fn fetch_invoice_page(&self, page: u32) -> Result<Vec<InvoiceSummary>, GatewayError> {
    let url = format!(
      "{}/list?page={}&pageSize={}",
      self.config.invoice_base_url, page, self.page_size
    );
    let summaries = self
      .http
      .get(&url)
      .send()
      .await?
      .error_for_status()?
      .json::<Vec<InvoiceSummary>>()
      .await?;

    tracing::debug!(page, count = summaries.len(), "fetched invoice page");
    Ok(summaries)
  }

  async fn fetch_invoice(
    &self,
    uuid: Uuid,
    invoice_number: &str,
  ) -> Result<InvoicePayload, GatewayError> {
    let url = format!("{}/{}/{}", self.config.invoice_base_url, uuid, invoice_number);
    let payload = self
      .http
      .get(&url)
      .send()
      .await?
      .error_for_status()?
      .json::<InvoicePayload>()
      .await?;

    if payload.invoice_unique_identifier != uuid {
      return Err(GatewayError::InvalidPayload(format!(
        "detail payload identifier {} does not match requested {}",
        payload.invoice_unique_identifier, uuid
      )));
    }
    Ok(payload)
  }
}

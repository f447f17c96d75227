use serde::Serialize;
use std::sync::Arc;

use crate::domain::sync::JofotaraGateway;

use super::ingest_invoice::IngestInvoiceUseCase;
use super::SyncError;

#[derive(Debug, Default, Serialize)]
pub struct SyncSummary {
  pub pages_fetched: u32,
  pub invoices_seen: u32,
  pub invoices_created: u32,
  pub invoices_updated: u32,
  pub invoices_failed: u32,
}

/// Pulls the full invoice list from the JoFotara portal and ingests every
/// entry. A login failure aborts the batch; a single bad invoice is logged
/// and skipped so the rest of the batch still lands.
pub struct SyncInvoicesUseCase {
  gateway: Arc<dyn JofotaraGateway>,
  ingest: Arc<IngestInvoiceUseCase>,
}

impl SyncInvoicesUseCase {
  pub fn new(gateway: Arc<dyn JofotaraGateway>, ingest: Arc<IngestInvoiceUseCase>) -> Self {
    Self { gateway, ingest }
  }

  pub async fn execute(&self) -> Result<SyncSummary, SyncError> {
    self.gateway.login().await?;

    let mut summary = SyncSummary::default();
    let mut page = 1;
    loop {
      let summaries = self.gateway.fetch_invoice_page(page).await?;
      if summaries.is_empty() {
        break;
      }
      summary.pages_fetched += 1;

      for entry in summaries {
        summary.invoices_seen += 1;
        match self.ingest_one(entry.uuid, &entry.invoice_number).await {
          Ok(created) => {
            if created {
              summary.invoices_created += 1;
            } else {
              summary.invoices_updated += 1;
            }
          }
          Err(e) => {
            summary.invoices_failed += 1;
            tracing::warn!(
              invoice_number = %entry.invoice_number,
              uuid = %entry.uuid,
              error = %e,
              "skipping invoice"
            );
          }
        }
      }
      page += 1;
    }

    tracing::info!(
      pages = summary.pages_fetched,
      seen = summary.invoices_seen,
      created = summary.invoices_created,
      updated = summary.invoices_updated,
      failed = summary.invoices_failed,
      "sync finished"
    );
    Ok(summary)
  }

  async fn ingest_one(
    &self,
    uuid: uuid::Uuid,
    invoice_number: &str,
  ) -> Result<bool, SyncError> {
    let payload = self.gateway.fetch_invoice(uuid, invoice_number).await?;
    let response = self.ingest.execute(payload).await?;
    Ok(response.created)
  }
}

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use billcore::{
  application::sync::{IngestInvoiceUseCase, SyncInvoicesUseCase},
  domain::customer::CustomerService,
  infrastructure::{
    config::Config,
    jofotara::JofotaraClient,
    persistence::postgres::{
      PostgresCatalogItemRepository, PostgresCustomerRepository, PostgresInvoiceRepository,
      PostgresLineItemRepository, PostgresLoyaltySettingsRepository,
    },
  },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  // Initialize tracing subscriber for logging
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "billcore=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting billcore sync");

  // Load configuration
  let config = Config::load().context("Failed to load configuration")?;
  tracing::info!("Configuration loaded successfully");

  // Set up database connection pool with timeout
  tracing::info!("Connecting to database: {}", config.database.url);

  let db_pool = tokio::time::timeout(
    Duration::from_secs(config.database.connect_timeout_seconds),
    PgPoolOptions::new()
      .max_connections(config.database.max_connections)
      .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_seconds))
      .connect(&config.database.url),
  )
  .await
  .with_context(|| {
    format!(
      "Database connection timed out after {} seconds. Is PostgreSQL running?",
      config.database.connect_timeout_seconds
    )
  })?
  .context("Failed to connect to database")?;

  tracing::info!("Database connection pool created");

  // Run database migrations
  tracing::info!("Running database migrations");
  sqlx::migrate!("./migrations")
    .run(&db_pool)
    .await
    .context("Failed to run database migrations")?;
  tracing::info!("Database migrations completed");

  // Repositories
  let invoice_repo = Arc::new(PostgresInvoiceRepository::new(db_pool.clone()));
  let line_repo = Arc::new(PostgresLineItemRepository::new(db_pool.clone()));
  let item_repo = Arc::new(PostgresCatalogItemRepository::new(db_pool.clone()));
  let customer_repo = Arc::new(PostgresCustomerRepository::new(db_pool.clone()));
  let settings_repo = Arc::new(PostgresLoyaltySettingsRepository::new(db_pool.clone()));

  // Services and use cases
  let customer_service = Arc::new(CustomerService::new(
    customer_repo,
    settings_repo,
    invoice_repo.clone(),
  ));
  let ingest = Arc::new(IngestInvoiceUseCase::new(
    invoice_repo,
    line_repo,
    item_repo,
    customer_service,
  ));

  let gateway = Arc::new(
    JofotaraClient::new(config.jofotara.clone(), config.sync.page_size)
      .context("Failed to build JoFotara client")?,
  );
  let sync = SyncInvoicesUseCase::new(gateway, ingest);

  let summary = sync.execute().await.context("Invoice sync failed")?;
  tracing::info!(
    created = summary.invoices_created,
    updated = summary.invoices_updated,
    failed = summary.invoices_failed,
    "Sync complete"
  );

  Ok(())
}

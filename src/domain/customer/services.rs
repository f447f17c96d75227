use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::ports::InvoiceRepository;

use super::entities::Customer;
use super::errors::CustomerError;
use super::loyalty::LoyaltyTier;
use super::ports::{CustomerRepository, LoyaltySettingsRepository};
use super::value_objects::{ContactMethod, CustomerName};

pub struct CustomerService {
  customer_repo: Arc<dyn CustomerRepository>,
  settings_repo: Arc<dyn LoyaltySettingsRepository>,
  invoice_repo: Arc<dyn InvoiceRepository>,
}

impl CustomerService {
  pub fn new(
    customer_repo: Arc<dyn CustomerRepository>,
    settings_repo: Arc<dyn LoyaltySettingsRepository>,
    invoice_repo: Arc<dyn InvoiceRepository>,
  ) -> Self {
    Self {
      customer_repo,
      settings_repo,
      invoice_repo,
    }
  }

  pub async fn create_customer(
    &self,
    name: CustomerName,
    email: Option<String>,
    phone_number: Option<String>,
    preferred_contact_method: ContactMethod,
  ) -> Result<Customer, CustomerError> {
    let customer = Customer::new(name, email, phone_number, preferred_contact_method)?;
    self.customer_repo.create(customer).await
  }

  pub async fn update_customer(
    &self,
    customer_id: Uuid,
    name: CustomerName,
    email: Option<String>,
    phone_number: Option<String>,
    preferred_contact_method: ContactMethod,
  ) -> Result<Customer, CustomerError> {
    let mut customer = self
      .customer_repo
      .find_by_id(customer_id)
      .await?
      .ok_or(CustomerError::CustomerNotFound(customer_id))?;

    customer.update_contact(name, email, phone_number, preferred_contact_method)?;
    self.customer_repo.update(customer).await
  }

  pub async fn get_customer(&self, customer_id: Uuid) -> Result<Customer, CustomerError> {
    self
      .customer_repo
      .find_by_id(customer_id)
      .await?
      .ok_or(CustomerError::CustomerNotFound(customer_id))
  }

  pub async fn list_customers(&self) -> Result<Vec<Customer>, CustomerError> {
    self.customer_repo.list().await
  }

  /// Finds a customer by their rendered full name or registers a bare
  /// profile. Ingested payloads only carry a display name.
  pub async fn get_or_create_by_name(&self, full_name: &str) -> Result<Customer, CustomerError> {
    if let Some(existing) = self.customer_repo.find_by_full_name(full_name).await? {
      return Ok(existing);
    }
    let name = CustomerName::from_display(full_name.to_string())?;
    let customer = Customer::new(name, None, None, ContactMethod::None)?;
    self.customer_repo.create(customer).await
  }

  pub async fn set_loyalty_locked(
    &self,
    customer_id: Uuid,
    locked: bool,
  ) -> Result<Customer, CustomerError> {
    let mut customer = self.get_customer(customer_id).await?;
    customer.set_loyalty_locked(locked);
    self.customer_repo.update(customer).await
  }

  /// Re-derives the loyalty tier from the customer's invoice count. No-op
  /// when the tier is manually locked; persists only when the tier changed.
  pub async fn refresh_loyalty(&self, customer_id: Uuid) -> Result<LoyaltyTier, CustomerError> {
    let customer = self.get_customer(customer_id).await?;
    if customer.loyalty_locked {
      return Ok(customer.loyalty_tier);
    }

    let thresholds = self.settings_repo.load().await?;
    let invoice_count = self.invoice_repo.count_for_customer(customer_id).await?;
    let tier = thresholds.classify(invoice_count);

    if tier != customer.loyalty_tier {
      tracing::debug!(
        customer_id = %customer_id,
        from = %customer.loyalty_tier,
        to = %tier,
        invoice_count,
        "loyalty tier changed"
      );
      self
        .customer_repo
        .update_loyalty_tier(customer_id, tier)
        .await?;
    }
    Ok(tier)
  }
}

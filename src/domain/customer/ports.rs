use async_trait::async_trait;
use uuid::Uuid;

use super::entities::Customer;
use super::errors::CustomerError;
use super::loyalty::{LoyaltyThresholds, LoyaltyTier};

#[async_trait]
pub trait CustomerRepository: Send + Sync {
  async fn create(&self, customer: Customer) -> Result<Customer, CustomerError>;
  async fn update(&self, customer: Customer) -> Result<Customer, CustomerError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, CustomerError>;
  async fn find_by_full_name(&self, full_name: &str) -> Result<Option<Customer>, CustomerError>;
  async fn list(&self) -> Result<Vec<Customer>, CustomerError>;

  /// Partial update of the loyalty tier and timestamp only, so concurrent
  /// edits to contact fields are not clobbered.
  async fn update_loyalty_tier(&self, id: Uuid, tier: LoyaltyTier) -> Result<(), CustomerError>;
}

#[async_trait]
pub trait LoyaltySettingsRepository: Send + Sync {
  /// Loads the singleton thresholds record, falling back to the defaults
  /// when none has been stored yet.
  async fn load(&self) -> Result<LoyaltyThresholds, CustomerError>;
  async fn save(&self, thresholds: LoyaltyThresholds) -> Result<(), CustomerError>;
}

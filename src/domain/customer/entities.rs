use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::CustomerError;
use super::loyalty::LoyaltyTier;
use super::value_objects::{ContactMethod, CustomerName};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
  pub id: Uuid,
  pub name: CustomerName,
  pub email: Option<String>,
  pub phone_number: Option<String>,
  pub preferred_contact_method: ContactMethod,
  pub loyalty_tier: LoyaltyTier,
  /// Suppresses automatic tier recomputation when set by an operator.
  pub loyalty_locked: bool,
  pub date_of_birth: Option<NaiveDate>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Customer {
  pub fn new(
    name: CustomerName,
    email: Option<String>,
    phone_number: Option<String>,
    preferred_contact_method: ContactMethod,
  ) -> Result<Self, CustomerError> {
    let now = Utc::now();
    let customer = Self {
      id: Uuid::new_v4(),
      name,
      email,
      phone_number,
      preferred_contact_method,
      loyalty_tier: LoyaltyTier::None,
      loyalty_locked: false,
      date_of_birth: None,
      created_at: now,
      updated_at: now,
    };
    customer.validate()?;
    Ok(customer)
  }

  pub fn validate(&self) -> Result<(), CustomerError> {
    if self.preferred_contact_method.requires_email() && self.email.is_none() {
      return Err(CustomerError::EmailRequired);
    }
    if self.preferred_contact_method.requires_phone() && self.phone_number.is_none() {
      return Err(CustomerError::PhoneRequired(
        self.preferred_contact_method.to_string(),
      ));
    }
    Ok(())
  }

  pub fn update_contact(
    &mut self,
    name: CustomerName,
    email: Option<String>,
    phone_number: Option<String>,
    preferred_contact_method: ContactMethod,
  ) -> Result<(), CustomerError> {
    let previous = (
      self.name.clone(),
      self.email.clone(),
      self.phone_number.clone(),
      self.preferred_contact_method,
    );
    self.name = name;
    self.email = email;
    self.phone_number = phone_number;
    self.preferred_contact_method = preferred_contact_method;
    if let Err(e) = self.validate() {
      (
        self.name,
        self.email,
        self.phone_number,
        self.preferred_contact_method,
      ) = previous;
      return Err(e);
    }
    self.updated_at = Utc::now();
    Ok(())
  }

  pub fn set_loyalty_locked(&mut self, locked: bool) {
    self.loyalty_locked = locked;
    self.updated_at = Utc::now();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn name() -> CustomerName {
    CustomerName::from_parts("Omar".to_string(), "Nasser".to_string()).unwrap()
  }

  #[test]
  fn test_email_contact_requires_email() {
    let result = Customer::new(name(), None, None, ContactMethod::Email);
    assert!(matches!(result, Err(CustomerError::EmailRequired)));

    let customer = Customer::new(
      name(),
      Some("omar@example.com".to_string()),
      None,
      ContactMethod::Email,
    );
    assert!(customer.is_ok());
  }

  #[test]
  fn test_sms_and_phone_contact_require_phone() {
    for method in [ContactMethod::Sms, ContactMethod::Phone] {
      let result = Customer::new(name(), None, None, method);
      assert!(matches!(result, Err(CustomerError::PhoneRequired(_))));
    }

    let customer = Customer::new(name(), None, Some("0790000000".to_string()), ContactMethod::Sms);
    assert!(customer.is_ok());
  }

  #[test]
  fn test_update_contact_rolls_back_on_invalid_change() {
    let mut customer = Customer::new(
      name(),
      Some("omar@example.com".to_string()),
      None,
      ContactMethod::Email,
    )
    .unwrap();

    let result = customer.update_contact(name(), None, None, ContactMethod::Email);
    assert!(result.is_err());
    assert_eq!(customer.email.as_deref(), Some("omar@example.com"));
  }

  #[test]
  fn test_new_customer_starts_untiered_and_unlocked() {
    let customer = Customer::new(name(), None, None, ContactMethod::None).unwrap();
    assert_eq!(customer.loyalty_tier, LoyaltyTier::None);
    assert!(!customer.loyalty_locked);
  }
}

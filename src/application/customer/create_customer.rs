use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::customer::{ContactMethod, CustomerError, CustomerName, CustomerService};

#[derive(Debug, Deserialize)]
pub struct CreateCustomerCommand {
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub display_name: Option<String>,
  pub email: Option<String>,
  pub phone_number: Option<String>,
  pub preferred_contact_method: String,
}

#[derive(Debug, Serialize)]
pub struct CreateCustomerResponse {
  pub customer_id: Uuid,
  pub full_name: String,
  pub loyalty_tier: String,
}

pub struct CreateCustomerUseCase {
  customer_service: Arc<CustomerService>,
}

impl CreateCustomerUseCase {
  pub fn new(customer_service: Arc<CustomerService>) -> Self {
    Self { customer_service }
  }

  pub async fn execute(
    &self,
    command: CreateCustomerCommand,
  ) -> Result<CreateCustomerResponse, CustomerError> {
    let name = match (command.first_name, command.last_name, command.display_name) {
      (Some(first), Some(last), _) => CustomerName::from_parts(first, last)?,
      (_, _, Some(display)) => CustomerName::from_display(display)?,
      _ => return Err(CustomerError::MissingName),
    };
    let contact_method = ContactMethod::from_str(&command.preferred_contact_method)?;

    let customer = self
      .customer_service
      .create_customer(name, command.email, command.phone_number, contact_method)
      .await?;

    Ok(CreateCustomerResponse {
      customer_id: customer.id,
      full_name: customer.name.full_name(),
      loyalty_tier: customer.loyalty_tier.as_str().to_string(),
    })
  }
}

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::customer::{CustomerError, CustomerService};

#[derive(Debug, Serialize)]
pub struct CustomerDto {
  pub customer_id: Uuid,
  pub full_name: String,
  pub email: Option<String>,
  pub phone_number: Option<String>,
  pub preferred_contact_method: String,
  pub loyalty_tier: String,
  pub loyalty_locked: bool,
}

#[derive(Debug, Serialize)]
pub struct ListCustomersResponse {
  pub customers: Vec<CustomerDto>,
}

pub struct ListCustomersUseCase {
  customer_service: Arc<CustomerService>,
}

impl ListCustomersUseCase {
  pub fn new(customer_service: Arc<CustomerService>) -> Self {
    Self { customer_service }
  }

  pub async fn execute(&self) -> Result<ListCustomersResponse, CustomerError> {
    let customers = self.customer_service.list_customers().await?;

    let customers = customers
      .into_iter()
      .map(|customer| CustomerDto {
        customer_id: customer.id,
        full_name: customer.name.full_name(),
        email: customer.email,
        phone_number: customer.phone_number,
        preferred_contact_method: customer.preferred_contact_method.as_str().to_string(),
        loyalty_tier: customer.loyalty_tier.as_str().to_string(),
        loyalty_locked: customer.loyalty_locked,
      })
      .collect();

    Ok(ListCustomersResponse { customers })
  }
}

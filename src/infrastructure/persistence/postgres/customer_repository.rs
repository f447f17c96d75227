use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::customer::{
  ContactMethod, Customer, CustomerError, CustomerName, CustomerRepository, LoyaltyTier,
};

#[derive(Debug, FromRow)]
struct CustomerRow {
  id: Uuid,
  first_name: Option<String>,
  last_name: Option<String>,
  display_name: Option<String>,
  email: Option<String>,
  phone_number: Option<String>,
  preferred_contact_method: String,
  loyalty_tier: String,
  loyalty_locked: bool,
  date_of_birth: Option<NaiveDate>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
  type Error = CustomerError;

  fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
    let preferred_contact_method = ContactMethod::from_str(&row.preferred_contact_method)?;
    let loyalty_tier = LoyaltyTier::from_str(&row.loyalty_tier)?;

    Ok(Customer {
      id: row.id,
      name: CustomerName {
        first_name: row.first_name,
        last_name: row.last_name,
        display_name: row.display_name,
      },
      email: row.email,
      phone_number: row.phone_number,
      preferred_contact_method,
      loyalty_tier,
      loyalty_locked: row.loyalty_locked,
      date_of_birth: row.date_of_birth,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, display_name, email, phone_number, \
                                preferred_contact_method, loyalty_tier, loyalty_locked, \
                                date_of_birth, created_at, updated_at";

pub struct PostgresCustomerRepository {
  pool: PgPool,
}

impl PostgresCustomerRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepository {
  async fn create(&self, customer: Customer) -> Result<Customer, CustomerError> {
    let row = sqlx::query_as::<_, CustomerRow>(&format!(
      r#"
            INSERT INTO customers (
                id, first_name, last_name, display_name, email, phone_number,
                preferred_contact_method, loyalty_tier, loyalty_locked,
                date_of_birth, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {CUSTOMER_COLUMNS}
            "#
    ))
    .bind(customer.id)
    .bind(customer.name.first_name)
    .bind(customer.name.last_name)
    .bind(customer.name.display_name)
    .bind(customer.email)
    .bind(customer.phone_number)
    .bind(customer.preferred_contact_method.as_str())
    .bind(customer.loyalty_tier.as_str())
    .bind(customer.loyalty_locked)
    .bind(customer.date_of_birth)
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn update(&self, customer: Customer) -> Result<Customer, CustomerError> {
    let row = sqlx::query_as::<_, CustomerRow>(&format!(
      r#"
            UPDATE customers
            SET first_name = $2, last_name = $3, display_name = $4, email = $5,
                phone_number = $6, preferred_contact_method = $7,
                loyalty_tier = $8, loyalty_locked = $9, date_of_birth = $10,
                updated_at = $11
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "#
    ))
    .bind(customer.id)
    .bind(customer.name.first_name)
    .bind(customer.name.last_name)
    .bind(customer.name.display_name)
    .bind(customer.email)
    .bind(customer.phone_number)
    .bind(customer.preferred_contact_method.as_str())
    .bind(customer.loyalty_tier.as_str())
    .bind(customer.loyalty_locked)
    .bind(customer.date_of_birth)
    .bind(customer.updated_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, CustomerError> {
    let row = sqlx::query_as::<_, CustomerRow>(&format!(
      r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE id = $1
            "#
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn find_by_full_name(&self, full_name: &str) -> Result<Option<Customer>, CustomerError> {
    // Matches either the stored display name or the rendered first/last pair,
    // mirroring CustomerName::full_name
    let row = sqlx::query_as::<_, CustomerRow>(&format!(
      r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE display_name = $1
               OR TRIM(CONCAT(COALESCE(first_name, ''), ' ', COALESCE(last_name, ''))) = $1
            ORDER BY created_at ASC
            LIMIT 1
            "#
    ))
    .bind(full_name)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn list(&self) -> Result<Vec<Customer>, CustomerError> {
    let rows = sqlx::query_as::<_, CustomerRow>(&format!(
      r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            ORDER BY COALESCE(display_name, CONCAT(first_name, ' ', last_name)) ASC
            "#
    ))
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn update_loyalty_tier(&self, id: Uuid, tier: LoyaltyTier) -> Result<(), CustomerError> {
    let result = sqlx::query(
      r#"
            UPDATE customers
            SET loyalty_tier = $2, updated_at = $3
            WHERE id = $1
            "#,
    )
    .bind(id)
    .bind(tier.as_str())
    .bind(Utc::now())
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      return Err(CustomerError::CustomerNotFound(id));
    }
    Ok(())
  }
}

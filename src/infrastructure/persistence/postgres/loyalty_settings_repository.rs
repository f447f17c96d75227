use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, PgPool};

use crate::domain::customer::{CustomerError, LoyaltySettingsRepository, LoyaltyThresholds};

#[derive(Debug, FromRow)]
struct LoyaltySettingsRow {
  silver: i64,
  gold: i64,
  platinum: i64,
}

impl TryFrom<LoyaltySettingsRow> for LoyaltyThresholds {
  type Error = CustomerError;

  fn try_from(row: LoyaltySettingsRow) -> Result<Self, Self::Error> {
    LoyaltyThresholds::new(row.silver as u64, row.gold as u64, row.platinum as u64)
  }
}

/// Singleton row keyed by a fixed id. Missing row means the defaults are in
/// effect and nothing has been customised yet.
pub struct PostgresLoyaltySettingsRepository {
  pool: PgPool,
}

impl PostgresLoyaltySettingsRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl LoyaltySettingsRepository for PostgresLoyaltySettingsRepository {
  async fn load(&self) -> Result<LoyaltyThresholds, CustomerError> {
    let row = sqlx::query_as::<_, LoyaltySettingsRow>(
      r#"
            SELECT silver, gold, platinum
            FROM loyalty_settings
            WHERE id = 1
            "#,
    )
    .fetch_optional(&self.pool)
    .await?;

    match row {
      Some(row) => row.try_into(),
      None => Ok(LoyaltyThresholds::default()),
    }
  }

  async fn save(&self, thresholds: LoyaltyThresholds) -> Result<(), CustomerError> {
    sqlx::query(
      r#"
            INSERT INTO loyalty_settings (id, silver, gold, platinum, updated_at)
            VALUES (1, $1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET silver = EXCLUDED.silver, gold = EXCLUDED.gold,
                platinum = EXCLUDED.platinum, updated_at = EXCLUDED.updated_at
            "#,
    )
    .bind(thresholds.silver() as i64)
    .bind(thresholds.gold() as i64)
    .bind(thresholds.platinum() as i64)
    .bind(Utc::now())
    .execute(&self.pool)
    .await?;

    Ok(())
  }
}

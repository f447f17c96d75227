use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::CustomerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoyaltyTier {
  None,
  Silver,
  Gold,
  Platinum,
}

impl LoyaltyTier {
  pub fn as_str(&self) -> &'static str {
    match self {
      LoyaltyTier::None => "none",
      LoyaltyTier::Silver => "silver",
      LoyaltyTier::Gold => "gold",
      LoyaltyTier::Platinum => "platinum",
    }
  }
}

impl FromStr for LoyaltyTier {
  type Err = CustomerError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "none" => Ok(LoyaltyTier::None),
      "silver" => Ok(LoyaltyTier::Silver),
      "gold" => Ok(LoyaltyTier::Gold),
      "platinum" => Ok(LoyaltyTier::Platinum),
      _ => Err(CustomerError::UnknownLoyaltyTier(s.to_string())),
    }
  }
}

impl fmt::Display for LoyaltyTier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Singleton configuration record: invoice-count thresholds for each tier.
/// Thresholds must be strictly ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyThresholds {
  silver: u64,
  gold: u64,
  platinum: u64,
}

impl LoyaltyThresholds {
  pub fn new(silver: u64, gold: u64, platinum: u64) -> Result<Self, CustomerError> {
    if !(silver < gold && gold < platinum) {
      return Err(CustomerError::ThresholdsNotAscending {
        silver,
        gold,
        platinum,
      });
    }
    Ok(Self {
      silver,
      gold,
      platinum,
    })
  }

  pub fn silver(&self) -> u64 {
    self.silver
  }

  pub fn gold(&self) -> u64 {
    self.gold
  }

  pub fn platinum(&self) -> u64 {
    self.platinum
  }

  /// Boundary values are inclusive of the upper tier.
  pub fn classify(&self, invoice_count: u64) -> LoyaltyTier {
    if invoice_count >= self.platinum {
      LoyaltyTier::Platinum
    } else if invoice_count >= self.gold {
      LoyaltyTier::Gold
    } else if invoice_count >= self.silver {
      LoyaltyTier::Silver
    } else {
      LoyaltyTier::None
    }
  }
}

impl Default for LoyaltyThresholds {
  fn default() -> Self {
    Self {
      silver: 50,
      gold: 250,
      platinum: 500,
    }
  }
}

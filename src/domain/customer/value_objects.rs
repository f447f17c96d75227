use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::CustomerError;

// Preferred Contact Method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
  #[default]
  None,
  Email,
  Sms,
  Phone,
}

impl ContactMethod {
  pub fn as_str(&self) -> &'static str {
    match self {
      ContactMethod::None => "none",
      ContactMethod::Email => "email",
      ContactMethod::Sms => "sms",
      ContactMethod::Phone => "phone",
    }
  }

  pub fn requires_email(&self) -> bool {
    matches!(self, ContactMethod::Email)
  }

  pub fn requires_phone(&self) -> bool {
    matches!(self, ContactMethod::Sms | ContactMethod::Phone)
  }
}

impl FromStr for ContactMethod {
  type Err = CustomerError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "none" => Ok(ContactMethod::None),
      "email" => Ok(ContactMethod::Email),
      "sms" => Ok(ContactMethod::Sms),
      "phone" => Ok(ContactMethod::Phone),
      _ => Err(CustomerError::UnknownContactMethod(s.to_string())),
    }
  }
}

impl fmt::Display for ContactMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Either a first/last name pair or a single display name. Ingested
/// customers usually arrive with only a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerName {
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub display_name: Option<String>,
}

impl CustomerName {
  pub fn from_parts(first_name: String, last_name: String) -> Result<Self, CustomerError> {
    let first_name = first_name.trim().to_string();
    let last_name = last_name.trim().to_string();
    if first_name.is_empty() || last_name.is_empty() {
      return Err(CustomerError::MissingName);
    }
    Ok(Self {
      first_name: Some(first_name),
      last_name: Some(last_name),
      display_name: None,
    })
  }

  pub fn from_display(display_name: String) -> Result<Self, CustomerError> {
    let display_name = display_name.trim().to_string();
    if display_name.is_empty() {
      return Err(CustomerError::MissingName);
    }
    Ok(Self {
      first_name: None,
      last_name: None,
      display_name: Some(display_name),
    })
  }

  pub fn full_name(&self) -> String {
    if let Some(display) = &self.display_name {
      return display.clone();
    }
    format!(
      "{} {}",
      self.first_name.as_deref().unwrap_or(""),
      self.last_name.as_deref().unwrap_or("")
    )
    .trim()
    .to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_contact_method_requirements() {
    assert!(ContactMethod::Email.requires_email());
    assert!(!ContactMethod::Email.requires_phone());
    assert!(ContactMethod::Sms.requires_phone());
    assert!(ContactMethod::Phone.requires_phone());
    assert!(!ContactMethod::None.requires_email());
  }

  #[test]
  fn test_customer_name_forms() {
    let parts = CustomerName::from_parts("Lina".to_string(), "Haddad".to_string()).unwrap();
    assert_eq!(parts.full_name(), "Lina Haddad");

    let display = CustomerName::from_display("Petra Trading Co".to_string()).unwrap();
    assert_eq!(display.full_name(), "Petra Trading Co");

    assert!(CustomerName::from_parts(" ".to_string(), "Haddad".to_string()).is_err());
    assert!(CustomerName::from_display("".to_string()).is_err());
  }
}

pub mod entities;
pub mod errors;
pub mod loyalty;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::Customer;
pub use errors::CustomerError;
pub use loyalty::{LoyaltyThresholds, LoyaltyTier};
pub use ports::{CustomerRepository, LoyaltySettingsRepository};
pub use services::CustomerService;
pub use value_objects::{ContactMethod, CustomerName};

//! Invoicing and customer management core for a small retail business.
//!
//! The crate follows a hexagonal layout: `domain` holds the business rules
//! (line valuation, invoice aggregation, status lifecycle, loyalty tiers),
//! `application` exposes them as use cases, and `infrastructure` provides the
//! Postgres and JoFotara portal adapters.

pub mod application;
pub mod domain;
pub mod infrastructure;

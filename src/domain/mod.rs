//! Domain layer
//!
//! Entities, value objects, domain services and repository ports. All
//! business rules (valuation, aggregation, lifecycle, loyalty) live here;
//! infrastructure adapters only move data in and out.

pub mod customer;
pub mod invoice;
pub mod sync;

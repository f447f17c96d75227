//! Application layer
//!
//! Use cases that orchestrate domain logic into application workflows. Each
//! use case coordinates domain services and repository ports behind a small
//! command/response surface.

pub mod customer;
pub mod invoice;
pub mod sync;

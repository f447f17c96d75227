//! Infrastructure layer
//!
//! Adapters that implement the domain ports against the outside world:
//! Postgres persistence, the JoFotara portal client, and configuration.

pub mod config;
pub mod jofotara;
pub mod persistence;

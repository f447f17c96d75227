pub mod client;

pub use client::JofotaraClient;

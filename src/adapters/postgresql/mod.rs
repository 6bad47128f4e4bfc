//! PostgreSQL record store
//!
//! Reads customers and tickets from the help-desk database and stores
//! imported settings.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;

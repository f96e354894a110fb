//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay private
//! to this module; adapters translate them into domain types.

mod diesel_usage_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_usage_store::DieselUsageStore;
pub use migrations::{MigrationError, apply_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

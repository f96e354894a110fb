//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL usage store via Diesel.
//! - **memory**: process-local usage store.
//! - **email**: Resend-backed usage notices.
//!
//! Adapters translate between domain and infrastructure types and hold no
//! business rules.

pub mod email;
pub mod memory;
pub mod persistence;

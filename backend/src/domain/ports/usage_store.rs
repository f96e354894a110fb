//! Driven port for persisted coupon usage.
//!
//! One record per coupon that has been redeemed at least once. Records are
//! created on first redemption and overwritten afterwards; nothing is deleted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CouponId, UsageRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by usage store adapters.
    pub enum UsageStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "usage store connection failed: {message}",
        /// A read or write failed while executing.
        Query { message: String } =>
            "usage store query failed: {message}",
    }
}

/// Counter values written for one coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageUpsert {
    /// Coupon being written.
    pub coupon_id: CouponId,
    /// New redemption count.
    pub used_count: u32,
    /// Whether the coupon is now fully used.
    pub fully_used: bool,
    /// Mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<UsageUpsert> for UsageRecord {
    fn from(value: UsageUpsert) -> Self {
        Self {
            coupon_id: value.coupon_id,
            used_count: value.used_count,
            fully_used: value.fully_used,
            updated_at: value.updated_at,
        }
    }
}

/// Port for reading and writing usage records.
///
/// Writes are last-writer-wins; adapters do not check versions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Read every stored record.
    async fn read_all(&self) -> Result<Vec<UsageRecord>, UsageStoreError>;

    /// Insert or overwrite the record for `upsert.coupon_id`.
    async fn upsert(&self, upsert: &UsageUpsert) -> Result<(), UsageStoreError>;
}

/// Fixture store that holds nothing and accepts every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUsageStore;

#[async_trait]
impl UsageStore for FixtureUsageStore {
    async fn read_all(&self) -> Result<Vec<UsageRecord>, UsageStoreError> {
        Ok(Vec::new())
    }

    async fn upsert(&self, _upsert: &UsageUpsert) -> Result<(), UsageStoreError> {
        Ok(())
    }
}

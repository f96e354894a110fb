//! Process-local `UsageStore` used when no database is configured.
//!
//! Contents are lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{UsageStore, UsageStoreError, UsageUpsert};
use crate::domain::{CouponId, UsageRecord};

/// In-memory usage store keyed by coupon.
#[derive(Debug, Default)]
pub struct InMemoryUsageStore {
    records: RwLock<BTreeMap<CouponId, UsageRecord>>,
}

impl InMemoryUsageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records, last one per coupon wins.
    pub fn with_records(records: impl IntoIterator<Item = UsageRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.coupon_id, record))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn read_all(&self) -> Result<Vec<UsageRecord>, UsageStoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn upsert(&self, upsert: &UsageUpsert) -> Result<(), UsageStoreError> {
        self.records
            .write()
            .await
            .insert(upsert.coupon_id, UsageRecord::from(upsert.clone()));
        Ok(())
    }
}

//! PostgreSQL-backed `UsageStore` implementation using Diesel ORM.
//!
//! Writes use a single `INSERT … ON CONFLICT (coupon_id) DO UPDATE`, so the
//! first redemption creates the row and later ones overwrite it. The last
//! writer wins.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UsageStore, UsageStoreError, UsageUpsert};
use crate::domain::{CouponId, UsageRecord};

use super::models::{CouponUsageRow, CouponUsageUpdate, NewCouponUsageRow};
use super::pool::{DbPool, PoolError};
use super::schema::coupon_usage;

/// Diesel-backed usage store.
#[derive(Clone)]
pub struct DieselUsageStore {
    pool: DbPool,
}

impl DieselUsageStore {
    /// Create a store that checks connections out of `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UsageStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UsageStoreError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UsageStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UsageStoreError::connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
            UsageStoreError::query("usage row violates a table constraint")
        }
        _ => UsageStoreError::query("database error"),
    }
}

fn row_to_record(row: CouponUsageRow) -> Result<UsageRecord, UsageStoreError> {
    let raw_id = u32::try_from(row.coupon_id)
        .map_err(|_| UsageStoreError::query(format!("negative coupon id {}", row.coupon_id)))?;
    let coupon_id =
        CouponId::new(raw_id).map_err(|err| UsageStoreError::query(err.to_string()))?;
    let used_count = u32::try_from(row.used_count).map_err(|_| {
        UsageStoreError::query(format!(
            "negative used_count {} for coupon {coupon_id}",
            row.used_count
        ))
    })?;

    Ok(UsageRecord {
        coupon_id,
        used_count,
        fully_used: row.fully_used,
        updated_at: row.updated_at,
    })
}

fn to_column(value: u32, field: &str) -> Result<i32, UsageStoreError> {
    i32::try_from(value)
        .map_err(|_| UsageStoreError::query(format!("{field} {value} exceeds column range")))
}

#[async_trait]
impl UsageStore for DieselUsageStore {
    async fn read_all(&self) -> Result<Vec<UsageRecord>, UsageStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CouponUsageRow> = coupon_usage::table
            .order(coupon_usage::coupon_id.asc())
            .select(CouponUsageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn upsert(&self, upsert: &UsageUpsert) -> Result<(), UsageStoreError> {
        let coupon_id = to_column(upsert.coupon_id.get(), "coupon_id")?;
        let used_count = to_column(upsert.used_count, "used_count")?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewCouponUsageRow {
            coupon_id,
            used_count,
            fully_used: upsert.fully_used,
            updated_at: upsert.updated_at,
        };
        let update = CouponUsageUpdate {
            used_count,
            fully_used: upsert.fully_used,
            updated_at: upsert.updated_at,
        };

        diesel::insert_into(coupon_usage::table)
            .values(&new_row)
            .on_conflict(coupon_usage::coupon_id)
            .do_update()
            .set(&update)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn valid_row() -> CouponUsageRow {
        CouponUsageRow {
            coupon_id: 3,
            used_count: 2,
            fully_used: false,
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(err, UsageStoreError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, UsageStoreError::Query { .. }));
    }

    #[rstest]
    fn valid_row_converts(valid_row: CouponUsageRow) {
        let record = row_to_record(valid_row).expect("valid row");

        assert_eq!(record.coupon_id.get(), 3);
        assert_eq!(record.used_count, 2);
        assert!(!record.fully_used);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(-1, 1)]
    #[case(2, -4)]
    fn invalid_rows_are_query_errors(
        mut valid_row: CouponUsageRow,
        #[case] coupon_id: i32,
        #[case] used_count: i32,
    ) {
        valid_row.coupon_id = coupon_id;
        valid_row.used_count = used_count;

        let err = row_to_record(valid_row).expect_err("invalid row");
        assert!(matches!(err, UsageStoreError::Query { .. }));
    }

    #[rstest]
    fn oversized_counts_are_rejected_before_writing() {
        let err = to_column(u32::MAX, "used_count").expect_err("out of range");
        assert!(err.to_string().contains("used_count"));
    }
}

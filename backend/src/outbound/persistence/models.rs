//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::coupon_usage;

/// Row struct for reading from the coupon_usage table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = coupon_usage)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CouponUsageRow {
    pub coupon_id: i32,
    pub used_count: i32,
    pub fully_used: bool,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for the first redemption of a coupon.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = coupon_usage)]
pub(crate) struct NewCouponUsageRow {
    pub coupon_id: i32,
    pub used_count: i32,
    pub fully_used: bool,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied when the coupon already has a row.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = coupon_usage)]
pub(crate) struct CouponUsageUpdate {
    pub used_count: i32,
    pub fully_used: bool,
    pub updated_at: DateTime<Utc>,
}

//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Redemption counters.
    ///
    /// One row per coupon redeemed at least once. Rows are created on the
    /// first redemption and overwritten on later ones.
    coupon_usage (coupon_id) {
        /// Catalog identifier; always positive.
        coupon_id -> Int4,
        /// Number of redemptions; never negative.
        used_count -> Int4,
        /// Whether the coupon reached its effective limit.
        fully_used -> Bool,
        /// Time of the last redemption.
        updated_at -> Timestamptz,
    }
}

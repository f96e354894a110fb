//! Usage tracking: projection of persisted usage records onto the catalog.
//!
//! Everything here is pure. Eligibility of a locked coupon is derived from the
//! projection on demand and never stored.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Coupon, CouponCatalog, CouponId};

/// Persisted redemption counter for one coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    /// Coupon the counter belongs to.
    pub coupon_id: CouponId,
    /// Number of redemptions so far.
    pub used_count: u32,
    /// Whether the count has reached the coupon's effective limit.
    pub fully_used: bool,
    /// Time of the last mutation.
    pub updated_at: DateTime<Utc>,
}

/// Counter values produced by one redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageIncrement {
    /// Count after the redemption.
    pub used_count: u32,
    /// Whether the coupon is fully used after the redemption.
    pub fully_used: bool,
}

/// Compute the counter values for redeeming `coupon` once more.
///
/// # Examples
/// ```
/// use std::num::NonZeroU32;
/// use coupon_board::domain::{Coupon, CouponId, next_usage};
///
/// let coupon = Coupon::new(CouponId::new(3).expect("id"), "Yes day", "Say yes", "🙏")
///     .expect("coupon")
///     .with_usage_limit(NonZeroU32::new(5).expect("limit"));
/// assert!(!next_usage(&coupon, 3).fully_used);
/// assert!(next_usage(&coupon, 4).fully_used);
/// ```
#[must_use]
pub fn next_usage(coupon: &Coupon, current_count: u32) -> UsageIncrement {
    let used_count = current_count.saturating_add(1);
    UsageIncrement {
        used_count,
        fully_used: used_count >= coupon.effective_limit(),
    }
}

/// Display state of one coupon on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CouponStatus {
    /// Redeemable and never used.
    Available,
    /// Limited coupon with some redemptions left.
    InProgress {
        /// Redemptions so far.
        used: u32,
        /// Configured limit.
        limit: u32,
    },
    /// Fully used.
    Used,
    /// Locked until every other coupon is fully used.
    Locked,
}

/// The two views the board needs: fully used coupons and per-coupon counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageState {
    used_ids: BTreeSet<CouponId>,
    usage_counts: BTreeMap<CouponId, u32>,
}

/// Project persisted records onto the catalog.
///
/// Missing records mean a count of zero. Records for coupons the catalog does
/// not define are ignored.
#[must_use]
pub fn compute_usage_state(catalog: &CouponCatalog, records: &[UsageRecord]) -> UsageState {
    let mut state = UsageState::default();
    for record in records
        .iter()
        .filter(|record| catalog.contains(record.coupon_id))
    {
        state
            .usage_counts
            .insert(record.coupon_id, record.used_count);
        if record.fully_used {
            state.used_ids.insert(record.coupon_id);
        }
    }
    state
}

impl UsageState {
    /// Coupons recorded as fully used.
    #[must_use]
    pub fn used_ids(&self) -> &BTreeSet<CouponId> {
        &self.used_ids
    }

    /// Redemption counts keyed by coupon.
    #[must_use]
    pub fn usage_counts(&self) -> &BTreeMap<CouponId, u32> {
        &self.usage_counts
    }

    /// Redemptions recorded for `id`, zero when absent.
    #[must_use]
    pub fn used_count(&self, id: CouponId) -> u32 {
        self.usage_counts.get(&id).copied().unwrap_or_default()
    }

    /// Whether `coupon` has reached its limit.
    ///
    /// Limited coupons compare the count against the limit; single-use coupons
    /// consult the used set.
    #[must_use]
    pub fn is_fully_used(&self, coupon: &Coupon) -> bool {
        match coupon.usage_limit() {
            Some(limit) => self.used_count(coupon.id()) >= limit.get(),
            None => self.used_ids.contains(&coupon.id()),
        }
    }

    /// Whether every non-locked coupon in the catalog is fully used.
    #[must_use]
    pub fn all_unlocked_fully_used(&self, catalog: &CouponCatalog) -> bool {
        catalog.unlocked().all(|coupon| self.is_fully_used(coupon))
    }

    /// Whether `coupon` may be redeemed now.
    ///
    /// A locked coupon opens once every non-locked coupon is fully used; any
    /// coupon stops being eligible once it is fully used itself.
    #[must_use]
    pub fn is_eligible(&self, catalog: &CouponCatalog, coupon: &Coupon) -> bool {
        if self.is_fully_used(coupon) {
            return false;
        }
        !coupon.is_locked() || self.all_unlocked_fully_used(catalog)
    }

    /// Display status for `coupon`.
    #[must_use]
    pub fn status(&self, catalog: &CouponCatalog, coupon: &Coupon) -> CouponStatus {
        if self.is_fully_used(coupon) {
            return CouponStatus::Used;
        }
        if coupon.is_locked() && !self.all_unlocked_fully_used(catalog) {
            return CouponStatus::Locked;
        }
        let used = self.used_count(coupon.id());
        match coupon.usage_limit() {
            Some(limit) if used > 0 => CouponStatus::InProgress {
                used,
                limit: limit.get(),
            },
            _ => CouponStatus::Available,
        }
    }

    /// Apply a committed redemption. Counts never move backwards.
    pub fn record_increment(&mut self, id: CouponId, increment: UsageIncrement) {
        let count = self.usage_counts.entry(id).or_default();
        *count = (*count).max(increment.used_count);
        if increment.fully_used {
            self.used_ids.insert(id);
        }
    }

    /// Fold `older` into `self`, keeping the higher count per coupon.
    ///
    /// A reload that raced a commit may read the store before the write
    /// landed; absorbing the previous projection keeps the commit visible.
    pub fn absorb(&mut self, older: &UsageState) {
        for (&id, &used_count) in &older.usage_counts {
            self.record_increment(
                id,
                UsageIncrement {
                    used_count,
                    fully_used: older.used_ids.contains(&id),
                },
            );
        }
    }
}

//! Driving port for the select, confirm, and cancel steps of a redemption.

use async_trait::async_trait;

use crate::domain::{CouponId, Error, RedemptionState};

/// Delivery result of the usage notice sent after a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// The provider accepted the notice.
    Sent,
    /// The notice could not be delivered; the redemption still stands.
    Failed {
        /// Human-readable warning for the user.
        message: String,
    },
}

/// Outcome of a committed redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionReceipt {
    /// Redeemed coupon.
    pub coupon_id: CouponId,
    /// Persisted count after the redemption.
    pub used_count: u32,
    /// Whether the coupon is now fully used.
    pub fully_used: bool,
    /// Result of the follow-up notice.
    pub notification: NotificationOutcome,
}

/// Driving port for redemption steps.
///
/// Errors map as follows: unknown coupons are `not_found`; used or locked
/// coupons and confirms racing an in-flight submission are `conflict`; a
/// confirm with nothing selected is `invalid_request`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponRedemptionCommand: Send + Sync {
    /// Select `coupon_id` and enter the confirmation step.
    async fn select(&self, coupon_id: CouponId) -> Result<RedemptionState, Error>;

    /// Leave the confirmation step without redeeming.
    async fn cancel(&self) -> Result<RedemptionState, Error>;

    /// Persist one redemption of the selected coupon, then send the notice.
    async fn confirm(&self) -> Result<RedemptionReceipt, Error>;
}

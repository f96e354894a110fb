//! Driving port for reading the coupon board.
//!
//! Inbound adapters call this on page load. Every call re-reads the usage
//! store so the board reflects writes made elsewhere.

use async_trait::async_trait;

use crate::domain::{Coupon, CouponStatus, Error, RedemptionState};

/// One coupon as the board shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponView {
    /// Catalog entry.
    pub coupon: Coupon,
    /// Redemptions recorded so far.
    pub used_count: u32,
    /// Derived display state.
    pub status: CouponStatus,
    /// Whether the coupon may be selected now.
    pub eligible: bool,
}

/// Full board: every catalog coupon in catalog order plus the flow position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub coupons: Vec<CouponView>,
    pub flow: RedemptionState,
}

/// Driving port for board reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponBoardQuery: Send + Sync {
    /// Reload usage from the store and return the projected board.
    ///
    /// Fails with `service_unavailable` when the store cannot be reached.
    async fn load_board(&self) -> Result<BoardSnapshot, Error>;
}

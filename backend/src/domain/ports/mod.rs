//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`CouponBoardQuery`, `CouponRedemptionCommand`) are called by
//! inbound adapters. Driven ports (`UsageStore`, `UsageNotifier`) are
//! implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod coupon_board_query;
mod coupon_redemption_command;
mod usage_notifier;
mod usage_store;

#[cfg(test)]
pub use coupon_board_query::MockCouponBoardQuery;
pub use coupon_board_query::{BoardSnapshot, CouponBoardQuery, CouponView};
#[cfg(test)]
pub use coupon_redemption_command::MockCouponRedemptionCommand;
pub use coupon_redemption_command::{
    CouponRedemptionCommand, NotificationOutcome, RedemptionReceipt,
};
#[cfg(test)]
pub use usage_notifier::MockUsageNotifier;
pub use usage_notifier::{FixtureUsageNotifier, NotificationError, UsageNotice, UsageNotifier};
#[cfg(test)]
pub use usage_store::MockUsageStore;
pub use usage_store::{FixtureUsageStore, UsageStore, UsageStoreError, UsageUpsert};

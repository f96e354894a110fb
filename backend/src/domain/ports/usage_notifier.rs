//! Driven port for redemption notices (transactional email).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::Coupon;

use super::define_port_error;

define_port_error! {
    /// Errors raised while sending a usage notice.
    pub enum NotificationError {
        /// The request never produced a response.
        Transport { message: String } =>
            "notification transport failed: {message}",
        /// The provider did not answer in time.
        Timeout { message: String } =>
            "notification timed out: {message}",
        /// The provider answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "notification rejected with status {status}: {message}",
        /// No provider credentials are configured.
        NotConfigured =>
            "notification service is not configured",
    }
}

/// Details of one redemption, rendered into the notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageNotice {
    /// Redeemed coupon.
    pub coupon: Coupon,
    /// Redemption count after this redemption.
    pub used_count: u32,
    /// When the redemption was committed.
    pub redeemed_at: DateTime<Utc>,
}

/// Port for announcing that a coupon was used.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageNotifier: Send + Sync {
    /// Send one notice to the fixed recipient.
    async fn send_usage_notice(&self, notice: &UsageNotice) -> Result<(), NotificationError>;
}

/// Fixture notifier that reports every notice as sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUsageNotifier;

#[async_trait]
impl UsageNotifier for FixtureUsageNotifier {
    async fn send_usage_notice(&self, _notice: &UsageNotice) -> Result<(), NotificationError> {
        Ok(())
    }
}

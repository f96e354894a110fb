//! Email adapters for the `UsageNotifier` port.

mod resend;
mod template;

use async_trait::async_trait;

use crate::domain::ports::{NotificationError, UsageNotice, UsageNotifier};

pub use resend::{ResendConfig, ResendNotifier};
pub use template::{EmailContent, escape_html, format_thai_timestamp, render_usage_email};

/// Notifier used when no provider key is configured; every send fails.
///
/// Redemptions still commit and surface the failure as a receipt warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

#[async_trait]
impl UsageNotifier for DisabledNotifier {
    async fn send_usage_notice(&self, notice: &UsageNotice) -> Result<(), NotificationError> {
        tracing::debug!(coupon_id = %notice.coupon.id(), "email disabled; notice dropped");
        Err(NotificationError::not_configured())
    }
}

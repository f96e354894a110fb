//! Reqwest-backed Resend adapter for usage notices.
//!
//! Owns transport only: payload serialisation, bearer auth, timeout, and
//! status mapping.

use std::time::Duration;

use async_trait::async_trait;
use chrono::FixedOffset;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::debug;

use super::template::render_usage_email;
use crate::domain::ports::{NotificationError, UsageNotice, UsageNotifier};

/// Settings for [`ResendNotifier`].
#[derive(Debug, Clone)]
pub struct ResendConfig {
    /// Full URL of the `/emails` endpoint.
    pub endpoint: Url,
    /// Sent as a bearer token.
    pub api_key: String,
    /// Sender, e.g. `Anniversary Gift <onboarding@resend.dev>`.
    pub from: String,
    /// Fixed recipient.
    pub to: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Offset used for the timestamp in the email body.
    pub utc_offset: FixedOffset,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Notifier that posts each notice to the Resend email API.
pub struct ResendNotifier {
    client: Client,
    endpoint: Url,
    api_key: String,
    from: String,
    to: String,
    utc_offset: FixedOffset,
}

impl ResendNotifier {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: ResendConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key,
            from: config.from,
            to: config.to,
            utc_offset: config.utc_offset,
        })
    }
}

#[async_trait]
impl UsageNotifier for ResendNotifier {
    async fn send_usage_notice(&self, notice: &UsageNotice) -> Result<(), NotificationError> {
        let content = render_usage_email(notice, self.utc_offset);
        let payload = SendEmailRequest {
            from: &self.from,
            to: [&self.to],
            subject: &content.subject,
            html: &content.html,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        debug!(coupon_id = %notice.coupon.id(), %status, "resend accepted usage notice");
        Ok(())
    }
}

fn map_transport_error(error: reqwest::Error) -> NotificationError {
    if error.is_timeout() {
        NotificationError::timeout(error.to_string())
    } else {
        NotificationError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> NotificationError {
    let preview = body_preview(body);
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            NotificationError::timeout(format!("status {}: {preview}", status.as_u16()))
        }
        _ => NotificationError::rejected(status.as_u16(), preview),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
        format!("{preview}...")
    } else {
        compact
    }
}

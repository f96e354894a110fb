//! Application settings loaded via OrthoConfig.
//!
//! Every field may come from CLI flags, `COUPONS_*` environment variables, or
//! a configuration file. Accessors supply defaults for anything left unset.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::FixedOffset;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const DEFAULT_MAIL_FROM: &str = "Anniversary Gift <onboarding@resend.dev>";
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;
/// Bangkok time.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 7 * 60;

/// Settings values that could not be turned into typed configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address `{value}`: {message}")]
    BindAddr { value: String, message: String },
    #[error("invalid Resend endpoint `{value}`: {message}")]
    Endpoint { value: String, message: String },
    #[error("UTC offset of {minutes} minutes is out of range")]
    UtcOffset { minutes: i32 },
}

/// Runtime configuration for the coupon board server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COUPONS")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; usage is kept in memory when absent.
    pub database_url: Option<String>,
    /// Resend API key; notices are disabled when absent.
    pub resend_api_key: Option<String>,
    /// Override for the Resend `/emails` endpoint.
    pub resend_endpoint: Option<String>,
    /// Sender shown on usage notices.
    pub mail_from: Option<String>,
    /// Recipient of usage notices; notices are disabled when absent.
    pub mail_to: Option<String>,
    /// Whole-request timeout for the email provider.
    pub notify_timeout_secs: Option<u64>,
    /// Offset applied to timestamps in notices.
    pub utc_offset_minutes: Option<i32>,
}

impl AppSettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`SettingsError::BindAddr`] when the value is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_deref())
    }

    pub fn resend_api_key(&self) -> Option<&str> {
        non_blank(self.resend_api_key.as_deref())
    }

    pub fn mail_to(&self) -> Option<&str> {
        non_blank(self.mail_to.as_deref())
    }

    pub fn mail_from(&self) -> &str {
        non_blank(self.mail_from.as_deref()).unwrap_or(DEFAULT_MAIL_FROM)
    }

    /// Parsed Resend endpoint.
    ///
    /// # Errors
    /// Returns [`SettingsError::Endpoint`] when the override is not a URL.
    pub fn resend_endpoint(&self) -> Result<Url, SettingsError> {
        let value = non_blank(self.resend_endpoint.as_deref()).unwrap_or(DEFAULT_RESEND_ENDPOINT);
        Url::parse(value).map_err(|err| SettingsError::Endpoint {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(
            self.notify_timeout_secs
                .unwrap_or(DEFAULT_NOTIFY_TIMEOUT_SECS),
        )
    }

    /// Offset used when rendering notice timestamps.
    ///
    /// # Errors
    /// Returns [`SettingsError::UtcOffset`] outside ±24 hours.
    pub fn utc_offset(&self) -> Result<FixedOffset, SettingsError> {
        let minutes = self
            .utc_offset_minutes
            .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES);
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(SettingsError::UtcOffset { minutes })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

//! Coupon board entry-point: loads settings, prepares adapters, and serves
//! the REST API.

mod server;

use std::ffi::OsString;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use coupon_board::inbound::http::health::HealthState;
use coupon_board::outbound::email::ResendConfig;
use coupon_board::outbound::persistence::{DbPool, PoolConfig, apply_migrations};
use coupon_board::settings::AppSettings;
use server::{ServerConfig, create_server};

fn invalid_config(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
}

/// Resend settings, present only when both a key and a recipient are set.
fn resend_config(settings: &AppSettings) -> std::io::Result<Option<ResendConfig>> {
    let (Some(api_key), Some(to)) = (settings.resend_api_key(), settings.mail_to()) else {
        return Ok(None);
    };
    Ok(Some(ResendConfig {
        endpoint: settings.resend_endpoint().map_err(invalid_config)?,
        api_key: api_key.to_owned(),
        from: settings.mail_from().to_owned(),
        to: to.to_owned(),
        timeout: settings.notify_timeout(),
        utc_offset: settings.utc_offset().map_err(invalid_config)?,
    }))
}

async fn build_server_config(settings: &AppSettings) -> std::io::Result<ServerConfig> {
    let mut config = ServerConfig::new(settings.bind_addr().map_err(invalid_config)?);

    if let Some(database_url) = settings.database_url() {
        apply_migrations(database_url)
            .await
            .map_err(|err| std::io::Error::other(format!("database migration failed: {err}")))?;
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|err| std::io::Error::other(err.to_string()))?;
        config = config.with_db_pool(pool);
    }

    if let Some(resend) = resend_config(settings)? {
        config = config.with_resend(resend);
    }
    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args: Vec<OsString> = std::env::args_os().collect();
    let settings = AppSettings::load_from_iter(args).map_err(invalid_config)?;
    let config = build_server_config(&settings).await?;
    info!(bind_addr = %config.bind_addr, "starting coupon board");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}

//! Builders for the board service and its driven adapters.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use coupon_board::domain::ports::{UsageNotifier, UsageStore};
use coupon_board::domain::{CouponBoardService, CouponCatalog};
use coupon_board::inbound::http::state::HttpState;
use coupon_board::outbound::email::{DisabledNotifier, ResendNotifier};
use coupon_board::outbound::memory::InMemoryUsageStore;
use coupon_board::outbound::persistence::DieselUsageStore;

use super::ServerConfig;

fn build_store(config: &ServerConfig) -> Arc<dyn UsageStore> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselUsageStore::new(pool.clone())),
        None => {
            warn!("no database configured; coupon usage is kept in memory");
            Arc::new(InMemoryUsageStore::new())
        }
    }
}

fn build_notifier(config: &ServerConfig) -> std::io::Result<Arc<dyn UsageNotifier>> {
    match &config.resend {
        Some(resend) => {
            let notifier = ResendNotifier::new(resend.clone()).map_err(|err| {
                std::io::Error::other(format!("failed to build Resend client: {err}"))
            })?;
            info!(endpoint = %resend.endpoint, "usage notices enabled");
            Ok(Arc::new(notifier))
        }
        None => {
            warn!("Resend is not configured; usage notices are disabled");
            Ok(Arc::new(DisabledNotifier))
        }
    }
}

/// Build HTTP state over a board service wired to the configured adapters.
///
/// # Errors
/// Returns [`std::io::Error`] when the catalog is invalid or the HTTP client
/// for notices cannot be built.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let catalog = CouponCatalog::anniversary()
        .map_err(|err| std::io::Error::other(format!("invalid coupon catalog: {err}")))?;
    let service = CouponBoardService::new(
        Arc::new(catalog),
        build_store(config),
        build_notifier(config)?,
        Arc::new(DefaultClock),
    );
    Ok(HttpState::from_service(Arc::new(service)))
}

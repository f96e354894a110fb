//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use coupon_board::outbound::email::ResendConfig;
use coupon_board::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) resend: Option<ResendConfig>,
}

impl ServerConfig {
    /// Configuration with in-memory usage and notices disabled.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            resend: None,
        }
    }

    /// Persist usage in PostgreSQL through this pool.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Send usage notices through Resend.
    #[must_use]
    pub fn with_resend(mut self, resend: ResendConfig) -> Self {
        self.resend = Some(resend);
        self
    }
}

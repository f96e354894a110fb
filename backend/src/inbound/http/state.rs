//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and only see driving ports, so they
//! can be tested against mocks without I/O.

use std::sync::Arc;

use crate::domain::ports::{CouponBoardQuery, CouponRedemptionCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub board: Arc<dyn CouponBoardQuery>,
    pub redemption: Arc<dyn CouponRedemptionCommand>,
}

impl HttpState {
    pub fn new(
        board: Arc<dyn CouponBoardQuery>,
        redemption: Arc<dyn CouponRedemptionCommand>,
    ) -> Self {
        Self { board, redemption }
    }

    /// Build state from one service implementing both ports.
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use coupon_board::domain::ports::{FixtureUsageNotifier, FixtureUsageStore};
    /// use coupon_board::domain::{CouponBoardService, CouponCatalog};
    /// use coupon_board::inbound::http::state::HttpState;
    ///
    /// let service = CouponBoardService::new(
    ///     Arc::new(CouponCatalog::anniversary().expect("catalog")),
    ///     Arc::new(FixtureUsageStore),
    ///     Arc::new(FixtureUsageNotifier),
    ///     Arc::new(mockable::DefaultClock),
    /// );
    /// let _state = HttpState::from_service(Arc::new(service));
    /// ```
    pub fn from_service<T>(service: Arc<T>) -> Self
    where
        T: CouponBoardQuery + CouponRedemptionCommand + 'static,
    {
        Self {
            board: Arc::clone(&service) as Arc<dyn CouponBoardQuery>,
            redemption: service,
        }
    }
}

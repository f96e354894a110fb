//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::UsageNotifier;
use crate::domain::{CouponBoardService, CouponCatalog, CouponId, UsageRecord};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryUsageStore;

/// Clock pinned to 2026-02-14 12:00 UTC.
pub struct FixedClock;

impl Clock for FixedClock {
    fn local(&self) -> DateTime<chrono::Local> {
        self.utc().with_timezone(&chrono::Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 14, 12, 0, 0)
            .single()
            .expect("valid fixed timestamp")
    }
}

/// Usage record for `coupon_id` stamped with the fixed clock.
pub fn usage_record(coupon_id: u32, used_count: u32, fully_used: bool) -> UsageRecord {
    UsageRecord {
        coupon_id: CouponId::new(coupon_id).expect("coupon id"),
        used_count,
        fully_used,
        updated_at: FixedClock.utc(),
    }
}

/// HTTP state over a real board service with an in-memory store.
pub fn board_state<N>(
    records: Vec<UsageRecord>,
    notifier: N,
) -> (HttpState, Arc<InMemoryUsageStore>)
where
    N: UsageNotifier + 'static,
{
    let store = Arc::new(InMemoryUsageStore::with_records(records));
    let service = CouponBoardService::new(
        Arc::new(CouponCatalog::anniversary().expect("catalog")),
        Arc::clone(&store),
        Arc::new(notifier),
        Arc::new(FixedClock),
    );
    (HttpState::from_service(Arc::new(service)), store)
}

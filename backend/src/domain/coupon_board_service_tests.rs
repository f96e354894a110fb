//! Tests for the coupon board service.

use std::sync::Mutex as StdMutex;

use chrono::{DateTime, Local, TimeZone, Utc};
use rstest::{fixture, rstest};
use tokio::sync::Notify;

use super::*;
use crate::domain::ports::{
    FixtureUsageNotifier, FixtureUsageStore, MockUsageNotifier, MockUsageStore,
    NotificationError,
};
use crate::domain::{CouponStatus, ErrorCode, UsageRecord};

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 14, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

fn id(raw: u32) -> CouponId {
    CouponId::new(raw).expect("positive id")
}

fn record(raw: u32, used_count: u32, fully_used: bool) -> UsageRecord {
    UsageRecord {
        coupon_id: id(raw),
        used_count,
        fully_used,
        updated_at: fixture_timestamp(),
    }
}

#[fixture]
fn catalog() -> Arc<CouponCatalog> {
    Arc::new(CouponCatalog::anniversary().expect("built-in catalog"))
}

fn service<S, N>(catalog: Arc<CouponCatalog>, store: S, notifier: N) -> CouponBoardService<S, N> {
    CouponBoardService::new(catalog, Arc::new(store), Arc::new(notifier), fixture_clock())
}

fn view(snapshot: &BoardSnapshot, raw: u32) -> &CouponView {
    snapshot
        .coupons
        .iter()
        .find(|view| view.coupon.id() == id(raw))
        .expect("coupon in snapshot")
}

#[rstest]
#[tokio::test]
async fn load_board_projects_store_records(catalog: Arc<CouponCatalog>) {
    let mut store = MockUsageStore::new();
    store
        .expect_read_all()
        .times(1)
        .return_once(|| Ok(vec![record(1, 1, true), record(3, 2, false)]));
    let service = service(catalog, store, FixtureUsageNotifier);

    let snapshot = service.load_board().await.expect("board loads");

    assert_eq!(snapshot.coupons.len(), 4);
    assert_eq!(view(&snapshot, 1).status, CouponStatus::Used);
    assert_eq!(
        view(&snapshot, 3).status,
        CouponStatus::InProgress { used: 2, limit: 5 }
    );
    assert_eq!(view(&snapshot, 4).status, CouponStatus::Locked);
    assert!(!view(&snapshot, 4).eligible);
    assert_eq!(snapshot.flow, RedemptionState::Idle);
}

#[rstest]
#[case(UsageStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UsageStoreError::query("relation missing"), ErrorCode::InternalError)]
#[tokio::test]
async fn load_board_maps_store_errors(
    catalog: Arc<CouponCatalog>,
    #[case] failure: UsageStoreError,
    #[case] expected: ErrorCode,
) {
    let mut store = MockUsageStore::new();
    store.expect_read_all().return_once(move || Err(failure));
    let service = service(catalog, store, FixtureUsageNotifier);

    let err = service.load_board().await.expect_err("store failure");

    assert_eq!(err.code(), expected);
}

#[rstest]
#[case(42, ErrorCode::NotFound)]
#[case(4, ErrorCode::Conflict)]
#[tokio::test]
async fn select_rejects_unselectable_coupons(
    catalog: Arc<CouponCatalog>,
    #[case] raw: u32,
    #[case] expected: ErrorCode,
) {
    let service = service(catalog, FixtureUsageStore, FixtureUsageNotifier);

    let err = service.select(id(raw)).await.expect_err("not selectable");

    assert_eq!(err.code(), expected);
    assert_eq!(service.state().flow, RedemptionState::Idle);
}

#[rstest]
#[tokio::test]
async fn confirm_without_selection_is_invalid(catalog: Arc<CouponCatalog>) {
    let service = service(catalog, FixtureUsageStore, FixtureUsageNotifier);

    let err = service.confirm().await.expect_err("nothing selected");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn cancel_returns_to_idle(catalog: Arc<CouponCatalog>) {
    let service = service(catalog, FixtureUsageStore, FixtureUsageNotifier);

    let flow = service.select(id(2)).await.expect("select");
    assert_eq!(flow, RedemptionState::Confirming { coupon_id: id(2) });

    let flow = service.cancel().await.expect("cancel");
    assert_eq!(flow, RedemptionState::Idle);
}

#[rstest]
#[tokio::test]
async fn confirm_persists_then_notifies(catalog: Arc<CouponCatalog>) {
    let mut store = MockUsageStore::new();
    store
        .expect_read_all()
        .times(1)
        .return_once(|| Ok(Vec::new()));
    store
        .expect_upsert()
        .withf(|upsert| {
            upsert.coupon_id == id(1)
                && upsert.used_count == 1
                && upsert.fully_used
                && upsert.updated_at == fixture_timestamp()
        })
        .times(1)
        .return_once(|_| Ok(()));
    let mut notifier = MockUsageNotifier::new();
    notifier
        .expect_send_usage_notice()
        .withf(|notice| notice.coupon.id() == id(1) && notice.used_count == 1)
        .times(1)
        .return_once(|_| Ok(()));
    let service = service(catalog, store, notifier);

    service.select(id(1)).await.expect("select");
    let receipt = service.confirm().await.expect("confirm");

    assert_eq!(
        receipt,
        RedemptionReceipt {
            coupon_id: id(1),
            used_count: 1,
            fully_used: true,
            notification: NotificationOutcome::Sent,
        }
    );
    let state = service.state();
    assert_eq!(state.flow, RedemptionState::Idle);
    assert!(state.usage.used_ids().contains(&id(1)));
}

#[rstest]
#[tokio::test]
async fn notifier_failure_keeps_the_redemption(catalog: Arc<CouponCatalog>) {
    let mut store = MockUsageStore::new();
    store
        .expect_read_all()
        .times(1)
        .return_once(|| Ok(Vec::new()));
    store.expect_upsert().times(1).return_once(|_| Ok(()));
    let mut notifier = MockUsageNotifier::new();
    notifier
        .expect_send_usage_notice()
        .times(1)
        .return_once(|_| Err(NotificationError::timeout("no answer after 10s")));
    let service = service(catalog, store, notifier);

    service.select(id(1)).await.expect("select");
    let receipt = service.confirm().await.expect("confirm still succeeds");

    assert_eq!(receipt.used_count, 1);
    assert!(receipt.fully_used);
    assert_eq!(
        receipt.notification,
        NotificationOutcome::Failed {
            message: NOTIFICATION_FAILED_MESSAGE.to_owned(),
        }
    );
    assert_eq!(service.state().usage.used_count(id(1)), 1);
}

#[rstest]
#[tokio::test]
async fn store_failure_aborts_without_notifying(catalog: Arc<CouponCatalog>) {
    let mut store = MockUsageStore::new();
    store
        .expect_read_all()
        .times(1)
        .return_once(|| Ok(Vec::new()));
    store
        .expect_upsert()
        .times(1)
        .return_once(|_| Err(UsageStoreError::query("constraint violated")));
    let mut notifier = MockUsageNotifier::new();
    notifier.expect_send_usage_notice().times(0);
    let service = service(catalog, store, notifier);

    service.select(id(3)).await.expect("select");
    let err = service.confirm().await.expect_err("write fails");

    assert_eq!(err.code(), ErrorCode::InternalError);
    let state = service.state();
    assert_eq!(state.flow, RedemptionState::Idle);
    assert_eq!(state.usage, crate::domain::UsageState::default());
}

#[rstest]
#[tokio::test]
async fn limited_coupon_is_used_after_five_redemptions(catalog: Arc<CouponCatalog>) {
    let service = service(catalog, FixtureUsageStore, FixtureUsageNotifier);

    let mut receipts = Vec::new();
    for _ in 0..5 {
        service.select(id(3)).await.expect("select");
        receipts.push(service.confirm().await.expect("confirm"));
    }

    let counts: Vec<_> = receipts.iter().map(|r| (r.used_count, r.fully_used)).collect();
    assert_eq!(
        counts,
        vec![(1, false), (2, false), (3, false), (4, false), (5, true)]
    );
    let err = service.select(id(3)).await.expect_err("used up");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

/// Store whose write blocks until the test releases it.
#[derive(Default)]
struct GatedStore {
    started: Notify,
    release: Notify,
    writes: StdMutex<Vec<UsageUpsert>>,
}

#[async_trait]
impl UsageStore for GatedStore {
    async fn read_all(&self) -> Result<Vec<UsageRecord>, UsageStoreError> {
        Ok(Vec::new())
    }

    async fn upsert(&self, upsert: &UsageUpsert) -> Result<(), UsageStoreError> {
        self.writes
            .lock()
            .expect("writes lock")
            .push(upsert.clone());
        self.started.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

#[rstest]
#[tokio::test]
async fn duplicate_confirm_during_submission_persists_once(catalog: Arc<CouponCatalog>) {
    let store = Arc::new(GatedStore::default());
    let service = CouponBoardService::new(
        catalog,
        Arc::clone(&store),
        Arc::new(FixtureUsageNotifier),
        fixture_clock(),
    );
    service.select(id(2)).await.expect("select");

    let (first, second) = tokio::join!(service.confirm(), async {
        store.started.notified().await;
        let duplicate = service.confirm().await;
        store.release.notify_one();
        duplicate
    });

    let receipt = first.expect("first confirm commits");
    assert_eq!(receipt.used_count, 1);
    let err = second.expect_err("duplicate confirm is refused");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(store.writes.lock().expect("writes lock").len(), 1);
    assert_eq!(service.state().flow, RedemptionState::Idle);
}

#[rstest]
#[tokio::test]
async fn first_selection_counts_from_persisted_usage(catalog: Arc<CouponCatalog>) {
    let mut store = MockUsageStore::new();
    store
        .expect_read_all()
        .times(1)
        .return_once(|| Ok(vec![record(1, 1, true), record(3, 3, false)]));
    store
        .expect_upsert()
        .withf(|upsert| upsert.coupon_id == id(3) && upsert.used_count == 4 && !upsert.fully_used)
        .times(1)
        .return_once(|_| Ok(()));
    let service = service(catalog, store, FixtureUsageNotifier);

    let err = service.select(id(1)).await.expect_err("coupon 1 already used");
    assert_eq!(err.code(), ErrorCode::Conflict);

    service.select(id(3)).await.expect("select");
    let receipt = service.confirm().await.expect("confirm");

    assert_eq!(receipt.used_count, 4);
    assert_eq!(service.state().usage.used_count(id(3)), 4);
}

#[rstest]
#[tokio::test]
async fn selection_fails_while_usage_cannot_be_read(catalog: Arc<CouponCatalog>) {
    let mut store = MockUsageStore::new();
    let mut calls = 0;
    store.expect_read_all().times(2).returning(move || {
        calls += 1;
        if calls == 1 {
            Err(UsageStoreError::connection("refused"))
        } else {
            Ok(Vec::new())
        }
    });
    let service = service(catalog, store, FixtureUsageNotifier);

    let err = service.select(id(2)).await.expect_err("store down");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(service.state().flow, RedemptionState::Idle);

    let flow = service.select(id(2)).await.expect("store back");
    assert_eq!(flow, RedemptionState::Confirming { coupon_id: id(2) });
}

/// Notifier whose send blocks until the test releases it.
#[derive(Default)]
struct GatedNotifier {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl UsageNotifier for GatedNotifier {
    async fn send_usage_notice(&self, _notice: &UsageNotice) -> Result<(), NotificationError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

#[rstest]
#[tokio::test]
async fn flow_stays_submitting_until_the_notice_settles(catalog: Arc<CouponCatalog>) {
    let notifier = Arc::new(GatedNotifier::default());
    let service = CouponBoardService::new(
        catalog,
        Arc::new(FixtureUsageStore),
        Arc::clone(&notifier),
        fixture_clock(),
    );
    service.select(id(1)).await.expect("select");

    let (receipt, (flow_during_send, select_during_send)) = tokio::join!(service.confirm(), async {
        notifier.started.notified().await;
        let flow = service.state().flow;
        let selected = service.select(id(2)).await;
        notifier.release.notify_one();
        (flow, selected)
    });

    assert_eq!(flow_during_send, RedemptionState::Submitting { coupon_id: id(1) });
    let err = select_during_send.expect_err("selection refused while sending");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(receipt.expect("confirm").notification, NotificationOutcome::Sent);
    let state = service.state();
    assert_eq!(state.flow, RedemptionState::Idle);
    assert_eq!(state.usage.used_count(id(1)), 1);
}

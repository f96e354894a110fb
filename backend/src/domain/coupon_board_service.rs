//! Coupon board domain service.
//!
//! Owns the board state and drives it exclusively through [`reduce`]. Port
//! calls happen outside the state lock, so a second confirm that arrives while
//! a write or its notice is in flight sees `Submitting` and is refused without
//! side effects.
//!
//! The projection is read from the store before the first selection or
//! confirmation, so a fresh process never counts from zero.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    BoardSnapshot, CouponBoardQuery, CouponRedemptionCommand, CouponView, NotificationOutcome,
    RedemptionReceipt, UsageNotice, UsageNotifier, UsageStore, UsageStoreError, UsageUpsert,
};
use crate::domain::{
    BoardCommand, BoardEvent, BoardState, CouponCatalog, CouponId, Error, RedemptionState,
    Rejection, Transition, compute_usage_state, reduce,
};

/// Warning surfaced when the usage notice could not be delivered.
pub const NOTIFICATION_FAILED_MESSAGE: &str =
    "เกิดข้อผิดพลาดในการส่งอีเมลแจ้งเตือน แต่คูปองถูกใช้งานเรียบร้อยแล้ว";

fn map_store_error(error: UsageStoreError) -> Error {
    match error {
        UsageStoreError::Connection { message } => {
            Error::service_unavailable(format!("usage store unavailable: {message}"))
        }
        UsageStoreError::Query { message } => {
            Error::internal(format!("usage store error: {message}"))
        }
    }
}

fn map_rejection(rejection: Rejection) -> Error {
    match rejection {
        Rejection::UnknownCoupon(_) => Error::not_found(rejection.to_string()),
        Rejection::AlreadyUsed(_)
        | Rejection::StillLocked(_)
        | Rejection::SubmissionInFlight => Error::conflict(rejection.to_string()),
        Rejection::NothingSelected => Error::invalid_request(rejection.to_string()),
    }
}

/// Board service implementing both coupon driving ports.
///
/// `S` and `N` may be trait objects, so the server can pick adapters at startup.
pub struct CouponBoardService<S: ?Sized, N: ?Sized> {
    catalog: Arc<CouponCatalog>,
    store: Arc<S>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    state: Mutex<BoardState>,
    hydrated: AtomicBool,
}

impl<S: ?Sized, N: ?Sized> CouponBoardService<S, N> {
    /// Create a service with an empty projection in the `Idle` state.
    pub fn new(
        catalog: Arc<CouponCatalog>,
        store: Arc<S>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            store,
            notifier,
            clock,
            state: Mutex::new(BoardState::default()),
            hydrated: AtomicBool::new(false),
        }
    }

    /// Copy of the current board state.
    pub fn state(&self) -> BoardState {
        self.lock_state().clone()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BoardState> {
        // Writes are whole-state swaps, so a poisoned guard still holds a valid state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(&self, event: BoardEvent) -> Transition {
        let mut guard = self.lock_state();
        let current = std::mem::take(&mut *guard);
        let transition = reduce(&self.catalog, current, event);
        *guard = transition.state.clone();
        transition
    }

    fn snapshot(&self, state: &BoardState) -> BoardSnapshot {
        let coupons = self
            .catalog
            .iter()
            .map(|coupon| CouponView {
                coupon: coupon.clone(),
                used_count: state.usage.used_count(coupon.id()),
                status: state.usage.status(&self.catalog, coupon),
                eligible: state.usage.is_eligible(&self.catalog, coupon),
            })
            .collect();
        BoardSnapshot {
            coupons,
            flow: state.flow,
        }
    }
}

impl<S, N> CouponBoardService<S, N>
where
    S: UsageStore + ?Sized,
    N: UsageNotifier + ?Sized,
{
    async fn reload(&self) -> Result<BoardState, Error> {
        let records = self.store.read_all().await.map_err(map_store_error)?;
        let usage = compute_usage_state(&self.catalog, &records);
        let transition = self.apply(BoardEvent::Loaded(usage));
        self.hydrated.store(true, Ordering::Release);
        Ok(transition.state)
    }

    async fn ensure_loaded(&self) -> Result<(), Error> {
        if !self.hydrated.load(Ordering::Acquire) {
            self.reload().await?;
        }
        Ok(())
    }

    async fn notify(&self, notice: UsageNotice) -> NotificationOutcome {
        let coupon_id = notice.coupon.id();
        match self.notifier.send_usage_notice(&notice).await {
            Ok(()) => {
                info!(%coupon_id, "usage notice sent");
                NotificationOutcome::Sent
            }
            Err(error) => {
                warn!(%coupon_id, %error, "usage notice failed; redemption kept");
                NotificationOutcome::Failed {
                    message: NOTIFICATION_FAILED_MESSAGE.to_owned(),
                }
            }
        }
    }
}

#[async_trait]
impl<S, N> CouponBoardQuery for CouponBoardService<S, N>
where
    S: UsageStore + ?Sized,
    N: UsageNotifier + ?Sized,
{
    async fn load_board(&self) -> Result<BoardSnapshot, Error> {
        let state = self.reload().await?;
        Ok(self.snapshot(&state))
    }
}

#[async_trait]
impl<S, N> CouponRedemptionCommand for CouponBoardService<S, N>
where
    S: UsageStore + ?Sized,
    N: UsageNotifier + ?Sized,
{
    async fn select(&self, coupon_id: CouponId) -> Result<RedemptionState, Error> {
        self.ensure_loaded().await?;
        let transition = self.apply(BoardEvent::Selected(coupon_id));
        match transition.rejection {
            Some(rejection) => Err(map_rejection(rejection)),
            None => Ok(transition.state.flow),
        }
    }

    async fn cancel(&self) -> Result<RedemptionState, Error> {
        let transition = self.apply(BoardEvent::Cancelled);
        match transition.rejection {
            Some(rejection) => Err(map_rejection(rejection)),
            None => Ok(transition.state.flow),
        }
    }

    async fn confirm(&self) -> Result<RedemptionReceipt, Error> {
        self.ensure_loaded().await?;
        let transition = self.apply(BoardEvent::Confirmed);
        if let Some(rejection) = transition.rejection {
            return Err(map_rejection(rejection));
        }
        let Some(BoardCommand::SubmitUsage {
            coupon_id,
            increment,
        }) = transition.command
        else {
            return Err(Error::internal("confirm produced no usage submission"));
        };

        let coupon = self
            .catalog
            .get(coupon_id)
            .cloned()
            .ok_or_else(|| Error::internal(format!("coupon {coupon_id} left the catalog")))?;
        let redeemed_at = self.clock.utc();
        let upsert = UsageUpsert {
            coupon_id,
            used_count: increment.used_count,
            fully_used: increment.fully_used,
            updated_at: redeemed_at,
        };

        if let Err(error) = self.store.upsert(&upsert).await {
            warn!(%coupon_id, %error, "usage write failed; redemption aborted");
            self.apply(BoardEvent::UsageRejected { coupon_id });
            return Err(map_store_error(error));
        }
        self.apply(BoardEvent::UsageCommitted {
            coupon_id,
            increment,
        });
        info!(
            %coupon_id,
            used_count = increment.used_count,
            fully_used = increment.fully_used,
            "coupon redeemed"
        );

        let notification = self
            .notify(UsageNotice {
                coupon,
                used_count: increment.used_count,
                redeemed_at,
            })
            .await;
        self.apply(BoardEvent::NoticeSettled { coupon_id });

        Ok(RedemptionReceipt {
            coupon_id,
            used_count: increment.used_count,
            fully_used: increment.fully_used,
            notification,
        })
    }
}

#[cfg(test)]
#[path = "coupon_board_service_tests.rs"]
mod tests;

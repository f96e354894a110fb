//! Redemption flow as a pure reducer over the board state.
//!
//! ```text
//! Idle --Selected--> Confirming --Confirmed--> Submitting --Rejected--> Idle
//!                        |                         |
//!                        +--Cancelled--> Idle      +--Committed--> Submitting --NoticeSettled--> Idle
//! ```
//!
//! The reducer never performs I/O. Entering `Submitting` yields a
//! [`BoardCommand`] that the caller executes and reports back as
//! [`BoardEvent::UsageCommitted`] or [`BoardEvent::UsageRejected`]. A commit
//! keeps the flow in `Submitting` until the caller reports
//! [`BoardEvent::NoticeSettled`].

use serde::Serialize;

use super::{Coupon, CouponCatalog, CouponId, UsageIncrement, UsageState, next_usage};

/// Position in the redemption flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RedemptionState {
    /// Nothing selected.
    #[default]
    Idle,
    /// A coupon is selected and awaits confirm or cancel.
    Confirming {
        /// Selected coupon.
        coupon_id: CouponId,
    },
    /// The usage write for a confirmed coupon is in flight.
    Submitting {
        /// Coupon being redeemed.
        coupon_id: CouponId,
    },
}

/// Explicit store for everything the board shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    /// Projection of persisted usage.
    pub usage: UsageState,
    /// Current redemption flow position.
    pub flow: RedemptionState,
}

/// Inputs to the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// Fresh projection read from the usage store.
    Loaded(UsageState),
    /// User picked a coupon to redeem.
    Selected(CouponId),
    /// User backed out of the confirmation step.
    Cancelled,
    /// User confirmed the selected coupon.
    Confirmed,
    /// The usage store accepted the write; the notice is still pending.
    UsageCommitted {
        /// Redeemed coupon.
        coupon_id: CouponId,
        /// Persisted counter values.
        increment: UsageIncrement,
    },
    /// The usage store rejected the write.
    UsageRejected {
        /// Coupon whose write failed.
        coupon_id: CouponId,
    },
    /// The usage notice finished, whether or not it was delivered.
    NoticeSettled {
        /// Coupon the notice was about.
        coupon_id: CouponId,
    },
}

/// Side effect requested by the reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardCommand {
    /// Persist the new counter values for a coupon.
    SubmitUsage {
        /// Coupon being redeemed.
        coupon_id: CouponId,
        /// Counter values to persist.
        increment: UsageIncrement,
    },
}

/// Reason an event left the state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The catalog has no such coupon.
    #[error("coupon {0} does not exist")]
    UnknownCoupon(CouponId),
    /// The coupon has reached its limit.
    #[error("coupon {0} is already fully used")]
    AlreadyUsed(CouponId),
    /// The coupon waits on the other coupons.
    #[error("coupon {0} is locked until every other coupon is used")]
    StillLocked(CouponId),
    /// Confirm arrived with nothing selected.
    #[error("no coupon is selected")]
    NothingSelected,
    /// A submission is already running; the event is ignored.
    #[error("a redemption is already being submitted")]
    SubmissionInFlight,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the event.
    pub state: BoardState,
    /// Side effect to run, if any.
    pub command: Option<BoardCommand>,
    /// Why the event was refused, if it was.
    pub rejection: Option<Rejection>,
}

impl Transition {
    fn to(state: BoardState) -> Self {
        Self {
            state,
            command: None,
            rejection: None,
        }
    }

    fn refuse(state: BoardState, rejection: Rejection) -> Self {
        Self {
            state,
            command: None,
            rejection: Some(rejection),
        }
    }
}

fn check_selectable<'a>(
    catalog: &'a CouponCatalog,
    usage: &UsageState,
    coupon_id: CouponId,
) -> Result<&'a Coupon, Rejection> {
    let coupon = catalog
        .get(coupon_id)
        .ok_or(Rejection::UnknownCoupon(coupon_id))?;
    if usage.is_fully_used(coupon) {
        return Err(Rejection::AlreadyUsed(coupon_id));
    }
    if !usage.is_eligible(catalog, coupon) {
        return Err(Rejection::StillLocked(coupon_id));
    }
    Ok(coupon)
}

/// Apply `event` to `state`.
///
/// # Examples
/// ```
/// use coupon_board::domain::{
///     BoardCommand, BoardEvent, BoardState, CouponCatalog, CouponId, RedemptionState, reduce,
/// };
///
/// let catalog = CouponCatalog::anniversary().expect("catalog");
/// let id = CouponId::new(1).expect("id");
///
/// let selected = reduce(&catalog, BoardState::default(), BoardEvent::Selected(id));
/// assert_eq!(selected.state.flow, RedemptionState::Confirming { coupon_id: id });
///
/// let confirmed = reduce(&catalog, selected.state, BoardEvent::Confirmed);
/// assert!(matches!(confirmed.command, Some(BoardCommand::SubmitUsage { .. })));
///
/// let duplicate = reduce(&catalog, confirmed.state, BoardEvent::Confirmed);
/// assert!(duplicate.command.is_none());
/// ```
#[must_use]
pub fn reduce(catalog: &CouponCatalog, state: BoardState, event: BoardEvent) -> Transition {
    let BoardState { usage, flow } = state;
    match (flow, event) {
        (flow, BoardEvent::Loaded(mut fresh)) => {
            fresh.absorb(&usage);
            Transition::to(BoardState { usage: fresh, flow })
        }

        (flow @ RedemptionState::Submitting { .. }, BoardEvent::Selected(_))
        | (flow @ RedemptionState::Submitting { .. }, BoardEvent::Cancelled)
        | (flow @ RedemptionState::Submitting { .. }, BoardEvent::Confirmed) => {
            Transition::refuse(BoardState { usage, flow }, Rejection::SubmissionInFlight)
        }

        (flow, BoardEvent::Selected(coupon_id)) => {
            match check_selectable(catalog, &usage, coupon_id) {
                Ok(_) => Transition::to(BoardState {
                    usage,
                    flow: RedemptionState::Confirming { coupon_id },
                }),
                Err(rejection) => Transition::refuse(BoardState { usage, flow }, rejection),
            }
        }

        (_, BoardEvent::Cancelled) => Transition::to(BoardState {
            usage,
            flow: RedemptionState::Idle,
        }),

        (RedemptionState::Idle, BoardEvent::Confirmed) => Transition::refuse(
            BoardState {
                usage,
                flow: RedemptionState::Idle,
            },
            Rejection::NothingSelected,
        ),

        (RedemptionState::Confirming { coupon_id }, BoardEvent::Confirmed) => {
            let coupon = match check_selectable(catalog, &usage, coupon_id) {
                Ok(coupon) => coupon,
                Err(rejection) => {
                    return Transition::refuse(
                        BoardState {
                            usage,
                            flow: RedemptionState::Idle,
                        },
                        rejection,
                    );
                }
            };
            let increment = next_usage(coupon, usage.used_count(coupon_id));
            Transition {
                state: BoardState {
                    usage,
                    flow: RedemptionState::Submitting { coupon_id },
                },
                command: Some(BoardCommand::SubmitUsage {
                    coupon_id,
                    increment,
                }),
                rejection: None,
            }
        }

        (
            flow,
            BoardEvent::UsageCommitted {
                coupon_id,
                increment,
            },
        ) => {
            let mut usage = usage;
            usage.record_increment(coupon_id, increment);
            Transition::to(BoardState { usage, flow })
        }

        (flow, BoardEvent::UsageRejected { coupon_id })
        | (flow, BoardEvent::NoticeSettled { coupon_id }) => Transition::to(BoardState {
            usage,
            flow: settle(flow, coupon_id),
        }),
    }
}

fn settle(flow: RedemptionState, coupon_id: CouponId) -> RedemptionState {
    match flow {
        RedemptionState::Submitting { coupon_id: current } if current == coupon_id => {
            RedemptionState::Idle
        }
        other => other,
    }
}

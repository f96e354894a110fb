//! Domain primitives, the redemption reducer, and the board service.
//!
//! Public surface:
//! - `Coupon`, `CouponId`, `CouponCatalog`: the fixed gift catalog.
//! - `UsageRecord`, `UsageState`, `compute_usage_state`: usage projection.
//! - `BoardState`, `BoardEvent`, `reduce`: redemption flow.
//! - `CouponBoardService`: implements the driving ports in `ports`.
//! - `Error`, `ErrorCode`: API error payload.

pub mod coupon;
pub mod coupon_board_service;
pub mod error;
pub mod ports;
pub mod redemption;
pub mod trace_id;
pub mod usage;

pub use self::coupon::{Coupon, CouponCatalog, CouponId, CouponValidationError};
pub use self::coupon_board_service::{CouponBoardService, NOTIFICATION_FAILED_MESSAGE};
pub use self::error::{Error, ErrorCode};
pub use self::redemption::{
    BoardCommand, BoardEvent, BoardState, RedemptionState, Rejection, Transition, reduce,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::usage::{
    CouponStatus, UsageIncrement, UsageRecord, UsageState, compute_usage_state, next_usage,
};

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;

//! Redemption flow HTTP handlers.
//!
//! ```text
//! POST   /api/v1/redemption/selection      {"couponId": 3}
//! DELETE /api/v1/redemption/selection
//! POST   /api/v1/redemption/confirmation
//! ```

use actix_web::{delete, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{NotificationOutcome, RedemptionReceipt};
use crate::domain::{CouponId, Error, RedemptionState};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Request body for selecting a coupon.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectCouponRequestBody {
    /// Catalog id of the coupon to redeem.
    #[schema(minimum = 1, example = 3)]
    pub coupon_id: u32,
}

/// Flow step names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStepBody {
    Idle,
    Confirming,
    Submitting,
}

/// Current redemption flow position.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionStateBody {
    pub state: RedemptionStepBody,
    /// Selected or submitting coupon; absent while idle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_id: Option<u32>,
}

impl From<RedemptionState> for RedemptionStateBody {
    fn from(value: RedemptionState) -> Self {
        match value {
            RedemptionState::Idle => Self {
                state: RedemptionStepBody::Idle,
                coupon_id: None,
            },
            RedemptionState::Confirming { coupon_id } => Self {
                state: RedemptionStepBody::Confirming,
                coupon_id: Some(coupon_id.get()),
            },
            RedemptionState::Submitting { coupon_id } => Self {
                state: RedemptionStepBody::Submitting,
                coupon_id: Some(coupon_id.get()),
            },
        }
    }
}

/// Whether the usage notice went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatusBody {
    Sent,
    Failed,
}

/// Notification outcome attached to a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct NotificationBody {
    pub status: NotificationStatusBody,
    /// Warning shown to the user when the notice failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Receipt for a committed redemption.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionReceiptBody {
    /// Redeemed coupon.
    pub coupon_id: u32,
    /// Persisted count after this redemption.
    pub used_count: u32,
    /// Whether the coupon has reached its limit.
    pub fully_used: bool,
    pub notification: NotificationBody,
}

impl From<RedemptionReceipt> for RedemptionReceiptBody {
    fn from(value: RedemptionReceipt) -> Self {
        let notification = match value.notification {
            NotificationOutcome::Sent => NotificationBody {
                status: NotificationStatusBody::Sent,
                message: None,
            },
            NotificationOutcome::Failed { message } => NotificationBody {
                status: NotificationStatusBody::Failed,
                message: Some(message),
            },
        };
        Self {
            coupon_id: value.coupon_id.get(),
            used_count: value.used_count,
            fully_used: value.fully_used,
            notification,
        }
    }
}

fn parse_coupon_id(raw: u32) -> Result<CouponId, Error> {
    CouponId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "couponId",
            "value": raw,
            "code": "invalid_coupon_id",
        }))
    })
}

/// Select a coupon and open the confirmation step.
#[utoipa::path(
    post,
    path = "/api/v1/redemption/selection",
    request_body = SelectCouponRequestBody,
    responses(
        (status = 200, description = "Coupon selected", body = RedemptionStateBody),
        (status = 400, description = "Invalid coupon id", body = ErrorSchema),
        (status = 404, description = "Unknown coupon", body = ErrorSchema),
        (status = 409, description = "Coupon used, locked, or a submission is in flight", body = ErrorSchema)
    ),
    tags = ["redemption"],
    operation_id = "selectCoupon"
)]
#[post("/redemption/selection")]
pub async fn select_coupon(
    state: web::Data<HttpState>,
    payload: web::Json<SelectCouponRequestBody>,
) -> ApiResult<web::Json<RedemptionStateBody>> {
    let coupon_id = parse_coupon_id(payload.coupon_id)?;
    let flow = state.redemption.select(coupon_id).await?;
    Ok(web::Json(flow.into()))
}

/// Leave the confirmation step without redeeming.
#[utoipa::path(
    delete,
    path = "/api/v1/redemption/selection",
    responses(
        (status = 200, description = "Selection cleared", body = RedemptionStateBody),
        (status = 409, description = "A submission is in flight", body = ErrorSchema)
    ),
    tags = ["redemption"],
    operation_id = "cancelSelection"
)]
#[delete("/redemption/selection")]
pub async fn cancel_selection(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<RedemptionStateBody>> {
    let flow = state.redemption.cancel().await?;
    Ok(web::Json(flow.into()))
}

/// Redeem the selected coupon.
///
/// Usage is persisted before the notice is sent. A failed notice still
/// returns 200 with `notification.status = "failed"`.
#[utoipa::path(
    post,
    path = "/api/v1/redemption/confirmation",
    responses(
        (status = 200, description = "Redemption committed", body = RedemptionReceiptBody),
        (status = 400, description = "Nothing selected", body = ErrorSchema),
        (status = 409, description = "Coupon no longer redeemable or already submitting", body = ErrorSchema),
        (status = 500, description = "Usage write failed", body = ErrorSchema),
        (status = 503, description = "Usage store unavailable", body = ErrorSchema)
    ),
    tags = ["redemption"],
    operation_id = "confirmRedemption"
)]
#[post("/redemption/confirmation")]
pub async fn confirm_redemption(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<RedemptionReceiptBody>> {
    let receipt = state.redemption.confirm().await?;
    Ok(web::Json(receipt.into()))
}

#[cfg(test)]
#[path = "redemption_tests.rs"]
mod tests;

//! Coupon board HTTP handler.
//!
//! ```text
//! GET /api/v1/coupons
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::CouponStatus;
use crate::domain::ports::{BoardSnapshot, CouponView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::redemption::RedemptionStateBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Display state of a coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CouponStatusBody {
    Available,
    InProgress,
    Used,
    Locked,
}

impl From<CouponStatus> for CouponStatusBody {
    fn from(value: CouponStatus) -> Self {
        match value {
            CouponStatus::Available => Self::Available,
            CouponStatus::InProgress { .. } => Self::InProgress,
            CouponStatus::Used => Self::Used,
            CouponStatus::Locked => Self::Locked,
        }
    }
}

/// One coupon on the board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponBody {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub icon: String,
    /// Redemption limit; absent for single-use coupons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    pub is_locked: bool,
    pub used_count: u32,
    pub status: CouponStatusBody,
    /// Whether the coupon can be selected right now.
    pub eligible: bool,
}

impl From<CouponView> for CouponBody {
    fn from(value: CouponView) -> Self {
        let CouponView {
            coupon,
            used_count,
            status,
            eligible,
        } = value;
        Self {
            id: coupon.id().get(),
            title: coupon.title().to_owned(),
            description: coupon.description().to_owned(),
            icon: coupon.icon().to_owned(),
            usage_limit: coupon.usage_limit().map(|limit| limit.get()),
            is_locked: coupon.is_locked(),
            used_count,
            status: status.into(),
            eligible,
        }
    }
}

/// Full board response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponseBody {
    pub coupons: Vec<CouponBody>,
    pub redemption: RedemptionStateBody,
}

impl From<BoardSnapshot> for BoardResponseBody {
    fn from(value: BoardSnapshot) -> Self {
        Self {
            coupons: value.coupons.into_iter().map(CouponBody::from).collect(),
            redemption: value.flow.into(),
        }
    }
}

/// Reload usage and return every coupon with its status.
#[utoipa::path(
    get,
    path = "/api/v1/coupons",
    responses(
        (status = 200, description = "Coupon board", body = BoardResponseBody),
        (status = 500, description = "Usage read failed", body = ErrorSchema),
        (status = 503, description = "Usage store unavailable", body = ErrorSchema)
    ),
    tags = ["coupons"],
    operation_id = "listCoupons"
)]
#[get("/coupons")]
pub async fn list_coupons(state: web::Data<HttpState>) -> ApiResult<web::Json<BoardResponseBody>> {
    let snapshot = state.board.load_board().await?;
    Ok(web::Json(snapshot.into()))
}

//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every coupon board endpoint together with the error
//! schema wrappers from the inbound layer. The document backs Swagger UI in
//! debug builds and is exported via `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::inbound::http::coupons::{BoardResponseBody, CouponBody, CouponStatusBody};
use crate::inbound::http::redemption::{
    NotificationBody, NotificationStatusBody, RedemptionReceiptBody, RedemptionStateBody,
    RedemptionStepBody, SelectCouponRequestBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Coupon board API",
        description = "Gift coupon board: usage tracking, redemption, and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::coupons::list_coupons,
        crate::inbound::http::redemption::select_coupon,
        crate::inbound::http::redemption::cancel_selection,
        crate::inbound::http::redemption::confirm_redemption,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        BoardResponseBody,
        CouponBody,
        CouponStatusBody,
        RedemptionStateBody,
        RedemptionStepBody,
        SelectCouponRequestBody,
        RedemptionReceiptBody,
        NotificationBody,
        NotificationStatusBody,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "coupons", description = "Coupon catalog with usage status"),
        (name = "redemption", description = "Select, cancel, and confirm a redemption"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

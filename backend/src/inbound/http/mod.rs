//! HTTP inbound adapter exposing the coupon board REST endpoints.
//!
//! ```text
//! GET    /api/v1/coupons
//! POST   /api/v1/redemption/selection
//! DELETE /api/v1/redemption/selection
//! POST   /api/v1/redemption/confirmation
//! GET    /health/ready
//! GET    /health/live
//! ```

pub mod coupons;
pub mod error;
pub mod health;
pub mod redemption;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;

pub use error::ApiResult;

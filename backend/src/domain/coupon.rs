//! Coupon definitions and the fixed catalog.
//!
//! Coupons are static: the catalog is built once at startup and never
//! mutated. Usage lives in [`crate::domain::usage`].

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Positive coupon identifier.
///
/// # Examples
/// ```
/// use coupon_board::domain::CouponId;
///
/// let id = CouponId::new(3).expect("positive id");
/// assert_eq!(id.get(), 3);
/// assert!(CouponId::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct CouponId(NonZeroU32);

/// Validation errors raised while building coupons and the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponValidationError {
    /// Coupon identifiers must be positive.
    #[error("coupon id must be a positive integer")]
    ZeroId,
    /// Display fields must not be blank.
    #[error("coupon {id} has a blank {field}")]
    BlankField {
        /// Offending coupon.
        id: u32,
        /// Name of the blank field.
        field: &'static str,
    },
    /// Two catalog entries share an identifier.
    #[error("coupon id {id} appears more than once in the catalog")]
    DuplicateId {
        /// Repeated identifier.
        id: u32,
    },
}

impl CouponId {
    /// Validate and wrap a raw identifier.
    ///
    /// # Errors
    /// Returns [`CouponValidationError::ZeroId`] for zero.
    pub fn new(raw: u32) -> Result<Self, CouponValidationError> {
        NonZeroU32::new(raw)
            .map(Self)
            .ok_or(CouponValidationError::ZeroId)
    }

    /// Raw integer value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for CouponId {
    type Error = CouponValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CouponId> for u32 {
    fn from(value: CouponId) -> Self {
        value.get()
    }
}

impl fmt::Display for CouponId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A redeemable voucher definition.
///
/// ## Invariants
/// - `title`, `description` and `icon` are non-blank.
/// - A missing usage limit means the coupon is single use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    id: CouponId,
    title: String,
    description: String,
    icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage_limit: Option<NonZeroU32>,
    is_locked: bool,
}

impl Coupon {
    /// Build a single-use, unlocked coupon.
    ///
    /// # Errors
    /// Returns [`CouponValidationError::BlankField`] when a display string is blank.
    pub fn new(
        id: CouponId,
        title: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
    ) -> Result<Self, CouponValidationError> {
        let coupon = Self {
            id,
            title: title.into(),
            description: description.into(),
            icon: icon.into(),
            usage_limit: None,
            is_locked: false,
        };
        for (field, value) in [
            ("title", &coupon.title),
            ("description", &coupon.description),
            ("icon", &coupon.icon),
        ] {
            if value.trim().is_empty() {
                return Err(CouponValidationError::BlankField {
                    id: id.get(),
                    field,
                });
            }
        }
        Ok(coupon)
    }

    /// Allow the coupon to be redeemed `limit` times.
    #[must_use]
    pub fn with_usage_limit(mut self, limit: NonZeroU32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Gate the coupon behind every other coupon being fully used.
    #[must_use]
    pub fn locked(mut self) -> Self {
        self.is_locked = true;
        self
    }

    /// Coupon identifier.
    #[must_use]
    pub fn id(&self) -> CouponId {
        self.id
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Display icon (an emoji).
    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Configured usage limit, if any.
    #[must_use]
    pub fn usage_limit(&self) -> Option<NonZeroU32> {
        self.usage_limit
    }

    /// Whether the coupon waits on every other coupon.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    /// Number of redemptions after which the coupon is fully used.
    #[must_use]
    pub fn effective_limit(&self) -> u32 {
        self.usage_limit.map_or(1, NonZeroU32::get)
    }
}

/// Fixed list of coupons offered on the board, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponCatalog {
    coupons: Vec<Coupon>,
}

impl CouponCatalog {
    /// Build a catalog, rejecting duplicate identifiers.
    ///
    /// # Errors
    /// Returns [`CouponValidationError::DuplicateId`] when two coupons share an id.
    pub fn new(coupons: Vec<Coupon>) -> Result<Self, CouponValidationError> {
        let mut seen = std::collections::BTreeSet::new();
        for coupon in &coupons {
            if !seen.insert(coupon.id()) {
                return Err(CouponValidationError::DuplicateId {
                    id: coupon.id().get(),
                });
            }
        }
        Ok(Self { coupons })
    }

    /// The anniversary gift catalog served by default.
    ///
    /// # Errors
    /// Only fails if the built-in definitions are edited into an invalid shape.
    pub fn anniversary() -> Result<Self, CouponValidationError> {
        let five = NonZeroU32::new(5).ok_or(CouponValidationError::ZeroId)?;
        Self::new(vec![
            Coupon::new(
                CouponId::new(1)?,
                "ค่าช้อปปิ้ง 2,000 บาท",
                "ใช้ได้ภายในวันที่ 1 July - 31 Dec 2025",
                "🛍️",
            )?,
            Coupon::new(
                CouponId::new(2)?,
                "ฟรีค่าที่พักทริปค้างคืน",
                "ฟรีค่าที่พักทริปค้างคืน 1 คืน",
                "🏨",
            )?,
            Coupon::new(
                CouponId::new(3)?,
                "ยอมแล้ววว",
                "ยอมอะไรก็ได้ 1 รอบ (ใช้ได้ 5 ครั้ง)",
                "🙏",
            )?
            .with_usage_limit(five),
            Coupon::new(
                CouponId::new(4)?,
                "ความลับสุดยอดดดด",
                "จะใช้ได้ก็ต่อเมื่อใช้คูปองอื่นๆครบแล้วเท่านั้น",
                "🎁",
            )?
            .locked(),
        ])
    }

    /// Look up a coupon by identifier.
    #[must_use]
    pub fn get(&self, id: CouponId) -> Option<&Coupon> {
        self.coupons.iter().find(|coupon| coupon.id() == id)
    }

    /// Whether the catalog defines `id`.
    #[must_use]
    pub fn contains(&self, id: CouponId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate coupons in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Coupon> {
        self.coupons.iter()
    }

    /// Iterate coupons that are not lock-gated.
    pub fn unlocked(&self) -> impl Iterator<Item = &Coupon> {
        self.coupons.iter().filter(|coupon| !coupon.is_locked())
    }

    /// Number of coupons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

//! # Domain Types
//!
//! Shared value types used by the catalog, the state machine and the price
//! function.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  BillingCycle   │   │  PricingPolicy  │   │     Coupon      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Monthly        │   │  semiannual bps │   │  code           │       │
//! │  │  Semiannual     │   │  annual bps     │   │  kind + value   │       │
//! │  │  Annual         │   │  biennial bps   │   │  valid window   │       │
//! │  │  Biennial       │   └─────────────────┘   │  bundle limit   │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{DiscountRate, Money};

// =============================================================================
// Billing Cycle
// =============================================================================

/// Payment cadence.
///
/// The configurator pages offer monthly and annual; the checkout service also
/// accepts semiannual and biennial terms, each with its own catalog discount.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BillingCycle {
    #[default]
    Monthly,
    Semiannual,
    Annual,
    Biennial,
}

impl BillingCycle {
    /// Every cycle, shortest first.
    pub const ALL: [BillingCycle; 4] = [
        BillingCycle::Monthly,
        BillingCycle::Semiannual,
        BillingCycle::Annual,
        BillingCycle::Biennial,
    ];

    /// Length of one billing term in months.
    pub const fn months(&self) -> u32 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Semiannual => 6,
            BillingCycle::Annual => 12,
            BillingCycle::Biennial => 24,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Semiannual => "semiannual",
            BillingCycle::Annual => "annual",
            BillingCycle::Biennial => "biennial",
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingCycle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(BillingCycle::Monthly),
            "semiannual" => Ok(BillingCycle::Semiannual),
            "annual" | "yearly" => Ok(BillingCycle::Annual),
            "biennial" => Ok(BillingCycle::Biennial),
            _ => Err(ValidationError::NotAllowed {
                field: "billing_cycle".to_string(),
                allowed: BillingCycle::ALL
                    .iter()
                    .map(|c| c.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Pricing Policy
// =============================================================================

/// Discounts granted for paying for more than one month at a time.
///
/// ## Product Configuration
/// These percentages are data, confirmed against current product pricing, and
/// are read from the catalog feed. Monthly billing never carries a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingPolicy {
    #[serde(default)]
    pub semiannual_discount: DiscountRate,

    #[serde(default)]
    pub annual_discount: DiscountRate,

    #[serde(default)]
    pub biennial_discount: DiscountRate,
}

impl PricingPolicy {
    /// Returns the discount applied for the given cycle.
    pub fn discount_for(&self, cycle: BillingCycle) -> DiscountRate {
        match cycle {
            BillingCycle::Monthly => DiscountRate::zero(),
            BillingCycle::Semiannual => self.semiannual_discount,
            BillingCycle::Annual => self.annual_discount,
            BillingCycle::Biennial => self.biennial_discount,
        }
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// How a coupon's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CouponKind {
    /// `value` is in basis points of the remaining amount.
    Percent,
    /// `value` is in cents, capped at the remaining amount.
    Fixed,
}

/// A code-activated discount.
///
/// ## Lifecycle
/// ```text
/// Buyer types "launch50"
///      │
///      ▼
/// normalize → "LAUNCH50" ──► directory lookup ──► window check ──► bundle check
///      │                                                               │
///      ▼                                                               ▼
/// Configuration.coupon_code = "LAUNCH50"              redemption counter (if capped)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Coupon {
    /// Canonical (upper-case) code.
    pub code: String,

    pub kind: CouponKind,

    /// Basis points for `Percent`, cents for `Fixed`.
    pub value: i64,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,

    #[serde(default)]
    pub max_redemptions: Option<u32>,

    /// Restricts the coupon to configurations on this bundle.
    #[serde(default)]
    pub applies_to_bundle_code: Option<String>,
}

impl Coupon {
    /// A percentage coupon with no window or limits.
    pub fn percent(code: impl Into<String>, rate: DiscountRate) -> Self {
        Coupon {
            code: code.into(),
            kind: CouponKind::Percent,
            value: rate.bps() as i64,
            valid_from: None,
            valid_until: None,
            max_redemptions: None,
            applies_to_bundle_code: None,
        }
    }

    /// A fixed-amount coupon with no window or limits.
    pub fn fixed(code: impl Into<String>, amount: Money) -> Self {
        Coupon {
            code: code.into(),
            kind: CouponKind::Fixed,
            value: amount.cents(),
            valid_from: None,
            valid_until: None,
            max_redemptions: None,
            applies_to_bundle_code: None,
        }
    }

    /// Computes the discount this coupon grants on `remainder`.
    ///
    /// Fixed coupons never take more than the remainder, so they cannot drive a
    /// price negative on their own.
    pub fn discount_on(&self, remainder: Money) -> Money {
        if !remainder.is_positive() {
            return Money::zero();
        }

        match self.kind {
            CouponKind::Percent => {
                remainder.percentage(DiscountRate::from_bps(self.value.max(0) as u32))
            }
            CouponKind::Fixed => Money::from_cents(self.value.max(0)).min(remainder),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

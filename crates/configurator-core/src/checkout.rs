//! # Checkout Hand-off
//!
//! The immutable snapshot handed to the checkout service, and the structured
//! price announcement handed to the UI.
//!
//! ## Flow
//! ```text
//! Configuration ──► CheckoutSnapshot::capture(now)
//!                       │
//!                       ├── no modules ─────────────► CoreError::EmptyConfiguration
//!                       ├── coupon re-validated ────► CoreError::CouponNoLongerValid
//!                       ▼
//!                   CheckoutSnapshot { id, configuration, breakdown, billedAmount }
//!                       │
//!                       ▼
//!                   CheckoutRequest (checkout service body, snake_case)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::{Catalog, CouponDirectory};
use crate::coupon::{self, RedemptionCounter};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{compute_price, PriceBreakdown};
use crate::state::Configuration;
use crate::types::BillingCycle;
use crate::MAX_CODE_LENGTH;

/// Plan code sent to checkout when no bundle is selected.
pub const CUSTOM_PLAN_CODE: &str = "custom";

// =============================================================================
// Checkout Snapshot
// =============================================================================

/// An immutable copy of a configuration and its price at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutSnapshot {
    #[ts(as = "String")]
    pub id: Uuid,
    pub configuration: Configuration,
    pub breakdown: PriceBreakdown,

    /// Final monthly price multiplied by the billing cycle's months.
    pub billed_amount: Money,

    #[ts(as = "String")]
    pub captured_at: DateTime<Utc>,

    pub referral_code: Option<String>,
}

impl CheckoutSnapshot {
    /// Captures a snapshot, re-validating the applied coupon at `now`.
    ///
    /// A coupon that was valid when applied may have expired or run out of
    /// redemptions since; checkout must not proceed silently with it.
    pub fn capture<D, R>(
        configuration: &Configuration,
        catalog: &Catalog,
        coupons: &D,
        redemptions: &R,
        now: DateTime<Utc>,
        referral_code: Option<&str>,
    ) -> CoreResult<CheckoutSnapshot>
    where
        D: CouponDirectory + ?Sized,
        R: RedemptionCounter + ?Sized,
    {
        if configuration.selected_module_codes().is_empty() {
            return Err(CoreError::EmptyConfiguration);
        }

        if let Some(code) = configuration.coupon_code() {
            coupon::validate(code, now, configuration, coupons, redemptions)
                .map_err(CoreError::CouponNoLongerValid)?;
        }

        let referral_code = normalize_referral_code(referral_code)?;
        let breakdown = compute_price(configuration, catalog, coupons);
        let billed_amount = breakdown.final_price * configuration.billing_cycle().months();

        Ok(CheckoutSnapshot {
            id: Uuid::new_v4(),
            configuration: configuration.clone(),
            breakdown,
            billed_amount,
            captured_at: now,
            referral_code,
        })
    }

    /// Builds the checkout service's request body.
    pub fn to_request(&self) -> CheckoutRequest {
        CheckoutRequest::from(self)
    }
}

fn normalize_referral_code(code: Option<&str>) -> CoreResult<Option<String>> {
    let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    if code.len() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "referral_code".to_string(),
            max: MAX_CODE_LENGTH,
        }
        .into());
    }

    Ok(Some(code.to_string()))
}

// =============================================================================
// Checkout Request
// =============================================================================

/// Request body accepted by the checkout service.
///
/// Field names are snake_case on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    pub plan_code: String,
    pub billing_cycle: BillingCycle,
    pub modules: Vec<String>,
    pub addons: Vec<String>,
    pub coupon: Option<String>,
    pub referral_code: Option<String>,
}

impl CheckoutRequest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&CheckoutSnapshot> for CheckoutRequest {
    fn from(snapshot: &CheckoutSnapshot) -> Self {
        let cfg = &snapshot.configuration;
        CheckoutRequest {
            plan_code: cfg
                .selected_bundle_code()
                .unwrap_or(CUSTOM_PLAN_CODE)
                .to_string(),
            billing_cycle: cfg.billing_cycle(),
            modules: cfg.selected_module_codes().iter().cloned().collect(),
            addons: cfg.selected_addon_codes().iter().cloned().collect(),
            coupon: cfg.coupon_code().map(str::to_string),
            referral_code: snapshot.referral_code.clone(),
        }
    }
}

// =============================================================================
// Price Announcement
// =============================================================================

/// Structured numbers for an accessible "price changed" announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PriceAnnouncement {
    pub final_price: Money,
    pub total_savings: Money,
    pub billing_cycle: BillingCycle,
    pub currency: String,
    pub previous_final_price: Option<Money>,
}

impl PriceAnnouncement {
    /// Returns an announcement when the final price, total savings or billing
    /// cycle changed.
    ///
    /// `previous` is the last announced breakdown and its cycle. With none
    /// (first render) an announcement is always produced.
    pub fn between(
        previous: Option<(&PriceBreakdown, BillingCycle)>,
        next: &PriceBreakdown,
        billing_cycle: BillingCycle,
    ) -> Option<PriceAnnouncement> {
        if let Some((prev, prev_cycle)) = previous {
            if prev.final_price == next.final_price
                && prev.total_savings == next.total_savings
                && prev_cycle == billing_cycle
            {
                return None;
            }
        }

        Some(PriceAnnouncement {
            final_price: next.final_price,
            total_savings: next.total_savings,
            billing_cycle,
            currency: next.currency.clone(),
            previous_final_price: previous.map(|(p, _)| p.final_price),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

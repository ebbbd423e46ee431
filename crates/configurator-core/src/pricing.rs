//! # Price Composition
//!
//! Deterministic price computation for a Configuration.
//!
//! ## Discount Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  modules  Σ basePrice ─────┐                                            │
//! │                            ├──► base                                    │
//! │  add-ons  Σ price ─────────┘     │                                      │
//! │                                  ▼                                      │
//! │  bundle discount    = Σ bundled modules × bundle %   (add-ons excluded) │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │  billing discount   = (base − bundle) × cycle %                         │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │  coupon discount    = on the remainder (percent or fixed, clamped)      │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │  finalPrice         = max(0, base − bundle − billing − coupon)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every step works in integer minor units and rounds half up. Amounts are per
//! month; the billed amount for a whole cycle is produced at checkout.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::{Catalog, CouponDirectory};
use crate::coupon::matches_configuration;
use crate::money::Money;
use crate::state::Configuration;

// =============================================================================
// Breakdown Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum LineKind {
    Module,
    AddOn,
}

/// One priced item in the breakdown, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PriceLine {
    pub kind: LineKind,
    pub code: String,
    pub name: String,
    pub amount: Money,
}

/// The itemized price of a Configuration.
///
/// Recomputed from scratch on every change; never cached between transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PriceBreakdown {
    pub lines: Vec<PriceLine>,
    pub module_subtotal: Money,
    pub addon_subtotal: Money,
    pub base: Money,
    pub bundle_discount: Money,
    pub billing_discount: Money,
    pub coupon_discount: Money,
    pub total_savings: Money,
    pub final_price: Money,
    pub currency: String,
}

impl PriceBreakdown {
    /// Amount left after bundle and billing discounts, before the coupon.
    pub fn pre_coupon(&self) -> Money {
        self.base - self.bundle_discount - self.billing_discount
    }
}

// =============================================================================
// Composition
// =============================================================================

/// Computes the price breakdown for a configuration.
///
/// ## Edge Cases
/// - Empty module set: everything is zero
/// - Codes the catalog does not know contribute nothing
/// - A coupon missing from the directory, or restricted to a bundle the
///   configuration is not on, contributes nothing
pub fn compute_price<D>(
    configuration: &Configuration,
    catalog: &Catalog,
    coupons: &D,
) -> PriceBreakdown
where
    D: CouponDirectory + ?Sized,
{
    let mut lines = Vec::new();

    let mut module_subtotal = Money::zero();
    for module in catalog
        .modules
        .iter()
        .filter(|m| configuration.has_module(&m.code))
    {
        module_subtotal += module.base_price;
        lines.push(PriceLine {
            kind: LineKind::Module,
            code: module.code.clone(),
            name: module.name.clone(),
            amount: module.base_price,
        });
    }

    let mut addon_subtotal = Money::zero();
    for addon in catalog
        .addons
        .iter()
        .filter(|a| configuration.has_addon(&a.code))
    {
        addon_subtotal += addon.price;
        lines.push(PriceLine {
            kind: LineKind::AddOn,
            code: addon.code.clone(),
            name: addon.name.clone(),
            amount: addon.price,
        });
    }

    let base = module_subtotal + addon_subtotal;

    let bundle_discount = configuration
        .selected_bundle_code()
        .and_then(|code| catalog.bundle(code))
        .map(|bundle| {
            let bundled = bundle
                .module_codes
                .iter()
                .filter(|code| configuration.has_module(code));
            catalog.module_subtotal(bundled).percentage(bundle.discount)
        })
        .unwrap_or_default();

    let after_bundle = base - bundle_discount;
    let billing_discount =
        after_bundle.percentage(catalog.billing_discount(configuration.billing_cycle()));

    let remainder = after_bundle - billing_discount;
    let coupon_discount = configuration
        .coupon_code()
        .and_then(|code| coupons.find(code))
        .filter(|coupon| matches_configuration(coupon, configuration))
        .map(|coupon| coupon.discount_on(remainder))
        .unwrap_or_default();

    let final_price = (remainder - coupon_discount).floor_at_zero();

    PriceBreakdown {
        lines,
        module_subtotal,
        addon_subtotal,
        base,
        bundle_discount,
        billing_discount,
        coupon_discount,
        total_savings: bundle_discount + billing_discount + coupon_discount,
        final_price,
        currency: catalog.currency.code.clone(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{fixtures, CouponTable};
    use crate::coupon::Unlimited;
    use crate::money::DiscountRate;
    use crate::types::{BillingCycle, Coupon};
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
    }

    fn coupons() -> CouponTable {
        let mut growth_only = Coupon::percent("GROWTH10", DiscountRate::from_percent(10));
        growth_only.applies_to_bundle_code = Some("growth".to_string());
        [
            Coupon::percent("HALF", DiscountRate::from_percent(50)),
            Coupon::fixed("BIGFIXED", Money::from_cents(100_000)),
            growth_only,
        ]
        .into_iter()
        .collect()
    }

    /// Growth bundle (crm + invoicing) on annual billing.
    fn growth_annual(catalog: &Catalog) -> Configuration {
        Configuration::new(catalog)
            .select_bundle(catalog, Some("growth"))
            .configuration
            .set_billing_cycle(BillingCycle::Annual)
    }

    #[test]
    fn test_single_module_monthly() {
        let catalog = fixtures::catalog_without_required();
        let cfg = Configuration::new(&catalog)
            .toggle_module(&catalog, "crm")
            .configuration;

        let price = compute_price(&cfg, &catalog, &coupons());
        assert_eq!(price.base.cents(), 19900);
        assert_eq!(price.bundle_discount.cents(), 0);
        assert_eq!(price.billing_discount.cents(), 0);
        assert_eq!(price.coupon_discount.cents(), 0);
        assert_eq!(price.final_price.cents(), 19900);
        assert_eq!(price.currency, "EUR");
    }

    #[test]
    fn test_bundle_then_billing() {
        let catalog = fixtures::catalog_without_required();
        let price = compute_price(&growth_annual(&catalog), &catalog, &coupons());

        assert_eq!(price.module_subtotal.cents(), 34800);
        assert_eq!(price.bundle_discount.cents(), 8700);
        assert_eq!(price.pre_coupon().cents(), 20880);
        assert_eq!(price.billing_discount.cents(), 5220);
        assert_eq!(price.final_price.cents(), 20880);
    }

    #[test]
    fn test_percent_coupon_on_remainder() {
        let catalog = fixtures::catalog_without_required();
        let cfg = growth_annual(&catalog)
            .apply_coupon("HALF", now(), &coupons(), &Unlimited)
            .configuration;

        let price = compute_price(&cfg, &catalog, &coupons());
        assert_eq!(price.coupon_discount.cents(), 10440);
        assert_eq!(price.final_price.cents(), 10440);
    }

    #[test]
    fn test_fixed_coupon_clamped_to_remainder() {
        let catalog = fixtures::catalog_without_required();
        let cfg = growth_annual(&catalog)
            .apply_coupon("BIGFIXED", now(), &coupons(), &Unlimited)
            .configuration;

        let price = compute_price(&cfg, &catalog, &coupons());
        assert_eq!(price.coupon_discount.cents(), 20880);
        assert_eq!(price.final_price.cents(), 0);
        assert_eq!(price.total_savings.cents(), 8700 + 5220 + 20880);
    }

    #[test]
    fn test_addons_are_not_bundle_discounted() {
        let catalog = fixtures::catalog_without_required();
        let cfg = Configuration::new(&catalog)
            .select_bundle(&catalog, Some("growth"))
            .configuration
            .toggle_addon(&catalog, "priority-support")
            .configuration;

        let price = compute_price(&cfg, &catalog, &coupons());
        assert_eq!(price.addon_subtotal.cents(), 4900);
        assert_eq!(price.bundle_discount.cents(), 8700);
        assert_eq!(price.final_price.cents(), 34800 + 4900 - 8700);
    }

    #[test]
    fn test_required_module_outside_bundle_is_not_discounted() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .select_bundle(&catalog, Some("growth"))
            .configuration;

        let price = compute_price(&cfg, &catalog, &coupons());
        assert_eq!(price.module_subtotal.cents(), 19900 + 34800);
        assert_eq!(price.bundle_discount.cents(), 8700);
        assert_eq!(price.final_price.cents(), 19900 + 34800 - 8700);
    }

    #[test]
    fn test_required_module_outside_bundle_annual() {
        let catalog = fixtures::catalog();
        let price = compute_price(&growth_annual(&catalog), &catalog, &coupons());

        assert_eq!(price.bundle_discount.cents(), 8700);
        assert_eq!(price.billing_discount.cents(), 9200);
        assert_eq!(price.final_price.cents(), 36800);
        assert_eq!(price.total_savings.cents(), 8700 + 9200);
    }

    #[test]
    fn test_lines_in_catalog_order() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .toggle_module(&catalog, "crm")
            .configuration
            .toggle_addon(&catalog, "crm-ai")
            .configuration;

        let price = compute_price(&cfg, &catalog, &coupons());
        let codes: Vec<&str> = price.lines.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["core", "crm", "crm-ai"]);
        assert_eq!(price.lines[2].kind, LineKind::AddOn);
    }

    #[test]
    fn test_empty_configuration_is_zero() {
        let catalog = fixtures::catalog_without_required();
        let cfg = Configuration::new(&catalog).set_billing_cycle(BillingCycle::Biennial);
        let price = compute_price(&cfg, &catalog, &coupons());
        assert!(price.lines.is_empty());
        assert!(price.base.is_zero());
        assert!(price.total_savings.is_zero());
        assert!(price.final_price.is_zero());
    }

    #[test]
    fn test_coupon_missing_from_directory_contributes_nothing() {
        let catalog = fixtures::catalog_without_required();
        let cfg = growth_annual(&catalog)
            .apply_coupon("HALF", now(), &coupons(), &Unlimited)
            .configuration;

        let price = compute_price(&cfg, &catalog, &CouponTable::new());
        assert!(price.coupon_discount.is_zero());
        assert_eq!(price.final_price.cents(), 20880);
    }

    #[test]
    fn test_deterministic() {
        let catalog = fixtures::catalog();
        let cfg = growth_annual(&catalog)
            .apply_coupon("GROWTH10", now(), &coupons(), &Unlimited)
            .configuration;
        let first = compute_price(&cfg, &catalog, &coupons());
        let second = compute_price(&cfg, &catalog, &coupons());
        assert_eq!(first, second);
    }

    #[test]
    fn test_breakdown_serializes_camel_case() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog);
        let json = serde_json::to_value(compute_price(&cfg, &catalog, &coupons())).unwrap();
        assert_eq!(json["finalPrice"], 19900);
        assert_eq!(json["lines"][0]["kind"], "module");
    }
}

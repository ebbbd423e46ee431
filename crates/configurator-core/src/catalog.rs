//! # Catalog
//!
//! The purchasable modules, add-ons and bundles, the industries that recommend
//! them, and the coupon directory.
//!
//! ## Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Industry ──recommends──► Module ◄──includes── Bundle (discount %)     │
//! │                              │                                          │
//! │                              │ owns (module_code)                       │
//! │                              ▼                                          │
//! │                            AddOn   (no owner = globally selectable)     │
//! │                                                                         │
//! │   CouponDirectory: code (case-insensitive) ──► Coupon                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog is supplied once per session by the catalog feed and is
//! read-only from the engine's point of view.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use ts_rs::TS;

use crate::money::{Currency, DiscountRate, Money};
use crate::types::{BillingCycle, Coupon, PricingPolicy};

// =============================================================================
// Module
// =============================================================================

/// A purchasable product module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Module {
    pub code: String,
    pub name: String,
    pub category: String,
    pub base_price: Money,

    /// Add-ons that ride along whenever this module is selected.
    #[serde(default)]
    pub required_addon_codes: Vec<String>,

    /// Add-ons the UI offers while this module is selected.
    #[serde(default)]
    pub allowed_addon_codes: Vec<String>,

    /// Required modules are always part of every configuration.
    #[serde(default)]
    pub required: bool,
}

// =============================================================================
// Add-On
// =============================================================================

/// An optional extra, either tied to a module or globally selectable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AddOn {
    pub code: String,
    pub name: String,
    pub price: Money,

    /// Owning module; `None` means globally selectable.
    #[serde(default)]
    pub module_code: Option<String>,
}

// =============================================================================
// Bundle
// =============================================================================

/// A pre-set module selection sold at a built-in discount.
///
/// The discount applies to the base prices of the bundle's own modules only;
/// required modules outside the bundle and add-ons are never discounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Bundle {
    pub code: String,
    pub name: String,
    pub module_codes: Vec<String>,
    pub discount: DiscountRate,
}

// =============================================================================
// Industry
// =============================================================================

/// An industry the buyer can start from, with its recommended modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Industry {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub recommended_module_codes: Vec<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// The static set of purchasable items and the pricing policy.
///
/// ## Lookup
/// Catalogs hold a few dozen entries at most, so lookups scan the lists in
/// catalog order. Order is preserved for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Catalog {
    pub currency: Currency,
    pub pricing: PricingPolicy,
    #[serde(default)]
    pub industries: Vec<Industry>,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub addons: Vec<AddOn>,
    #[serde(default)]
    pub bundles: Vec<Bundle>,
}

impl Catalog {
    pub fn module(&self, code: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.code == code)
    }

    pub fn addon(&self, code: &str) -> Option<&AddOn> {
        self.addons.iter().find(|a| a.code == code)
    }

    pub fn bundle(&self, code: &str) -> Option<&Bundle> {
        self.bundles.iter().find(|b| b.code == code)
    }

    pub fn industry(&self, code: &str) -> Option<&Industry> {
        self.industries.iter().find(|i| i.code == code)
    }

    /// Codes of every module flagged `required`.
    pub fn required_module_codes(&self) -> BTreeSet<String> {
        self.modules
            .iter()
            .filter(|m| m.required)
            .map(|m| m.code.clone())
            .collect()
    }

    /// Add-ons the UI may offer for the given module selection.
    ///
    /// Global add-ons are always offered; module add-ons only while their
    /// owning module is selected.
    pub fn available_addons<'a>(
        &'a self,
        selected_modules: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = &'a AddOn> + 'a {
        self.addons.iter().filter(move |a| match &a.module_code {
            Some(owner) => selected_modules.contains(owner),
            None => true,
        })
    }

    /// Discount rate for the given billing cycle.
    pub fn billing_discount(&self, cycle: BillingCycle) -> DiscountRate {
        self.pricing.discount_for(cycle)
    }

    /// Sum of base prices for a set of module codes; unknown codes add nothing.
    pub fn module_subtotal<'a, I>(&self, codes: I) -> Money
    where
        I: IntoIterator<Item = &'a String>,
    {
        codes
            .into_iter()
            .filter_map(|code| self.module(code))
            .map(|m| m.base_price)
            .sum()
    }
}

// =============================================================================
// Coupon Directory
// =============================================================================

/// Read interface to the coupon feed.
///
/// ## Implementations
/// - [`CouponTable`]: in-memory table loaded with the catalog
/// - Caller-provided adapters over a remote coupon store
///
/// Lookups are case-insensitive; implementations receive the code as typed
/// and must normalize it themselves (see [`crate::validation::normalize_coupon_code`]).
pub trait CouponDirectory {
    fn find(&self, code: &str) -> Option<&Coupon>;
}

/// In-memory coupon directory keyed by upper-case code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CouponTable {
    coupons: BTreeMap<String, Coupon>,
}

impl CouponTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a coupon, replacing any coupon with the same code.
    ///
    /// The stored coupon's code is upper-cased so that what lands in a
    /// Configuration is always the canonical form.
    pub fn insert(&mut self, mut coupon: Coupon) {
        let key = coupon.code.trim().to_uppercase();
        coupon.code = key.clone();
        self.coupons.insert(key, coupon);
    }

    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coupon> {
        self.coupons.values()
    }
}

impl FromIterator<Coupon> for CouponTable {
    fn from_iter<T: IntoIterator<Item = Coupon>>(iter: T) -> Self {
        let mut table = CouponTable::new();
        for coupon in iter {
            table.insert(coupon);
        }
        table
    }
}

impl CouponDirectory for CouponTable {
    fn find(&self, code: &str) -> Option<&Coupon> {
        self.coupons.get(&code.trim().to_uppercase())
    }
}

impl<D: CouponDirectory + ?Sized> CouponDirectory for &D {
    fn find(&self, code: &str) -> Option<&Coupon> {
        (**self).find(code)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        let catalog = fixtures::catalog();
        assert!(catalog.module("crm").is_some());
        assert!(catalog.module("CRM").is_none());
        assert!(catalog.addon("crm-ai").is_some());
        assert!(catalog.bundle("growth").is_some());
        assert!(catalog.industry("retail").is_some());
    }

    #[test]
    fn test_required_module_codes() {
        let catalog = fixtures::catalog();
        let required = catalog.required_module_codes();
        assert_eq!(required.len(), 1);
        assert!(required.contains("core"));
    }

    #[test]
    fn test_available_addons_follow_selection() {
        let catalog = fixtures::catalog();
        let selected: BTreeSet<String> = ["core".to_string()].into_iter().collect();
        let offered: Vec<&str> = catalog
            .available_addons(&selected)
            .map(|a| a.code.as_str())
            .collect();
        assert_eq!(offered, vec!["priority-support"]);

        let selected: BTreeSet<String> =
            ["core".to_string(), "crm".to_string()].into_iter().collect();
        assert_eq!(catalog.available_addons(&selected).count(), 2);
    }

    #[test]
    fn test_module_subtotal_ignores_unknown_codes() {
        let catalog = fixtures::catalog();
        let codes = vec!["crm".to_string(), "ghost".to_string()];
        assert_eq!(catalog.module_subtotal(&codes).cents(), 19900);
    }

    #[test]
    fn test_coupon_table_is_case_insensitive() {
        let table: CouponTable = [Coupon::percent("launch50", DiscountRate::from_percent(50))]
            .into_iter()
            .collect();

        let found = table.find("  Launch50 ").unwrap();
        assert_eq!(found.code, "LAUNCH50");
        assert!(table.find("LAUNCH5").is_none());
        assert_eq!(table.len(), 1);
    }
}

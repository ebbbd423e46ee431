//! # Configuration State Machine
//!
//! The buyer's current selections and the transitions that change them.
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Configuration Transitions                              │
//! │                                                                         │
//! │  UI Event              Transition              Configuration Change     │
//! │  ────────              ──────────              ────────────────────     │
//! │                                                                         │
//! │  Pick industry ───────► select_industry() ───► seed modules (once)      │
//! │                                                                         │
//! │  Tick module ─────────► toggle_module() ─────► modules ±1, bundle off   │
//! │                                                                         │
//! │  Tick add-on ─────────► toggle_addon() ──────► add-ons ±1               │
//! │                                                                         │
//! │  Pick bundle ─────────► select_bundle() ─────► modules = bundle ∪ req   │
//! │                                                                         │
//! │  Monthly/annual ──────► set_billing_cycle() ─► cycle only               │
//! │                                                                         │
//! │  Enter code ──────────► apply_coupon() ──────► coupon (replaces)        │
//! │                                                                         │
//! │  NOTE: every transition takes &self and returns a new Configuration.    │
//! │        Nothing is mutated in place, so recomputing is always safe.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants (hold after every transition)
//! 1. Every required module is selected.
//! 2. With a bundle selected, modules = bundle modules ∪ required modules.
//! 3. An owned add-on is only present while its module is selected.
//! 4. The coupon was active when it was applied.
//! 5. At most one coupon.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;

use crate::catalog::{Catalog, CouponDirectory};
use crate::coupon::{self, RedemptionCounter};
use crate::error::Rejection;
use crate::types::BillingCycle;
use crate::validation::normalize_coupon_code;

// =============================================================================
// Configuration
// =============================================================================

/// The complete, invariant-satisfying record of a buyer's selections.
///
/// ## Lifecycle
/// ```text
/// configurator mounts ──► Configuration::new()            (defaults)
/// pricing-page link  ──► Configuration::from_deep_link()  (seeded)
///        │
///        ▼
/// transitions only (select_*, toggle_*, apply_coupon, ...)
///        │
///        ▼
/// CheckoutSnapshot::capture() ──► discarded
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Configuration {
    selected_industry_code: Option<String>,
    selected_module_codes: BTreeSet<String>,
    selected_addon_codes: BTreeSet<String>,
    selected_bundle_code: Option<String>,
    billing_cycle: BillingCycle,
    coupon_code: Option<String>,

    /// Set once the buyer toggles a module or picks a bundle.
    modules_customized: bool,

    /// Bundle the applied coupon is restricted to, if any.
    #[serde(skip)]
    #[ts(skip)]
    coupon_bundle: Option<String>,
}

/// Result of a transition.
///
/// A rejected transition always carries the prior Configuration unchanged.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub configuration: Configuration,
    pub rejection: Option<Rejection>,
}

impl Transition {
    fn accepted(configuration: Configuration) -> Self {
        Transition {
            configuration,
            rejection: None,
        }
    }

    fn rejected(prior: &Configuration, rejection: Rejection) -> Self {
        Transition {
            configuration: prior.clone(),
            rejection: Some(rejection),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.rejection.is_none()
    }

    pub fn into_parts(self) -> (Configuration, Option<Rejection>) {
        (self.configuration, self.rejection)
    }
}

/// Selections carried in from a pricing page link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeepLink {
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub bundle: Option<String>,
    #[serde(default)]
    pub billing_cycle: Option<BillingCycle>,
    #[serde(default)]
    pub coupon: Option<String>,
}

impl Configuration {
    /// Creates the default configuration: required modules (with their
    /// required add-ons), monthly billing, nothing else.
    pub fn new(catalog: &Catalog) -> Self {
        Configuration {
            selected_industry_code: None,
            selected_module_codes: BTreeSet::new(),
            selected_addon_codes: BTreeSet::new(),
            selected_bundle_code: None,
            billing_cycle: BillingCycle::Monthly,
            coupon_code: None,
            modules_customized: false,
            coupon_bundle: None,
        }
        .with_modules(catalog, BTreeSet::new())
    }

    /// Seeds a configuration from a deep link.
    ///
    /// ## Order
    /// industry → bundle → billing cycle → coupon. The coupon goes last so a
    /// bundle-restricted coupon sees the linked bundle.
    ///
    /// ## Returns
    /// The seeded configuration and every rejection met on the way. An invalid
    /// part of the link is dropped; it never prevents the configurator from
    /// opening.
    pub fn from_deep_link<D, R>(
        catalog: &Catalog,
        directory: &D,
        link: &DeepLink,
        now: DateTime<Utc>,
        redemptions: &R,
    ) -> (Configuration, Vec<Rejection>)
    where
        D: CouponDirectory + ?Sized,
        R: RedemptionCounter + ?Sized,
    {
        let mut configuration = Configuration::new(catalog);
        let mut rejections = Vec::new();

        let mut step = |transition: Transition| {
            let (next, rejection) = transition.into_parts();
            rejections.extend(rejection);
            next
        };

        if let Some(industry) = &link.industry {
            configuration = step(configuration.select_industry(catalog, industry));
        }
        if let Some(bundle) = &link.bundle {
            configuration = step(configuration.select_bundle(catalog, Some(bundle)));
        }
        if let Some(cycle) = link.billing_cycle {
            configuration = configuration.set_billing_cycle(cycle);
        }
        if let Some(code) = &link.coupon {
            configuration = step(configuration.apply_coupon(code, now, directory, redemptions));
        }

        (configuration, rejections)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn selected_industry_code(&self) -> Option<&str> {
        self.selected_industry_code.as_deref()
    }

    pub fn selected_module_codes(&self) -> &BTreeSet<String> {
        &self.selected_module_codes
    }

    pub fn selected_addon_codes(&self) -> &BTreeSet<String> {
        &self.selected_addon_codes
    }

    pub fn selected_bundle_code(&self) -> Option<&str> {
        self.selected_bundle_code.as_deref()
    }

    pub fn billing_cycle(&self) -> BillingCycle {
        self.billing_cycle
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    /// True once the buyer has edited modules directly.
    pub fn modules_customized(&self) -> bool {
        self.modules_customized
    }

    pub fn has_module(&self, code: &str) -> bool {
        self.selected_module_codes.contains(code)
    }

    pub fn has_addon(&self, code: &str) -> bool {
        self.selected_addon_codes.contains(code)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Selects an industry.
    ///
    /// ## Seeding Rule
    /// The industry's recommended modules become the selection only while the
    /// buyer has neither toggled a module nor picked a bundle. After a
    /// manual edit, re-selecting an industry never overwrites their picks.
    pub fn select_industry(&self, catalog: &Catalog, industry_code: &str) -> Transition {
        let Some(industry) = catalog.industry(industry_code) else {
            return Transition::rejected(
                self,
                Rejection::UnknownIndustry {
                    code: industry_code.to_string(),
                },
            );
        };

        let mut next = self.clone();
        next.selected_industry_code = Some(industry.code.clone());

        if !self.modules_customized && self.selected_bundle_code.is_none() {
            let recommended = industry
                .recommended_module_codes
                .iter()
                .filter(|code| catalog.module(code).is_some())
                .cloned()
                .collect();
            next = next.with_modules(catalog, recommended);
        }

        Transition::accepted(next)
    }

    /// Adds or removes a module.
    ///
    /// ## Behavior
    /// - Required modules: rejected, configuration unchanged
    /// - Any change clears the bundle (manual editing supersedes it)
    /// - Removing a module drops the add-ons it owns
    /// - Adding a module brings its required add-ons
    pub fn toggle_module(&self, catalog: &Catalog, module_code: &str) -> Transition {
        let Some(module) = catalog.module(module_code) else {
            return Transition::rejected(
                self,
                Rejection::UnknownModule {
                    code: module_code.to_string(),
                },
            );
        };

        if module.required {
            return Transition::rejected(
                self,
                Rejection::RequiredModule {
                    code: module.code.clone(),
                },
            );
        }

        let mut modules = self.selected_module_codes.clone();
        if !modules.remove(&module.code) {
            modules.insert(module.code.clone());
        }

        let mut next = self.clone();
        next.modules_customized = true;
        next.selected_bundle_code = None;
        let next = next.with_modules(catalog, modules).drop_mismatched_coupon();

        Transition::accepted(next)
    }

    /// Adds or removes an add-on.
    ///
    /// An add-on whose owning module is not selected is rejected with the
    /// configuration unchanged; the UI only offers visible add-ons, so this is
    /// a validation outcome rather than an error.
    pub fn toggle_addon(&self, catalog: &Catalog, addon_code: &str) -> Transition {
        let Some(addon) = catalog.addon(addon_code) else {
            return Transition::rejected(
                self,
                Rejection::UnknownAddon {
                    code: addon_code.to_string(),
                },
            );
        };

        if let Some(owner) = &addon.module_code {
            if !self.selected_module_codes.contains(owner) {
                return Transition::rejected(
                    self,
                    Rejection::AddonModuleNotSelected {
                        code: addon.code.clone(),
                        module_code: owner.clone(),
                    },
                );
            }
        }

        let mut next = self.clone();
        if next.selected_addon_codes.contains(&addon.code) {
            if let Some(requiring) = self.module_requiring_addon(catalog, &addon.code) {
                return Transition::rejected(
                    self,
                    Rejection::RequiredAddon {
                        code: addon.code.clone(),
                        module_code: requiring.to_string(),
                    },
                );
            }
            next.selected_addon_codes.remove(&addon.code);
        } else {
            next.selected_addon_codes.insert(addon.code.clone());
        }

        Transition::accepted(next)
    }

    /// Selects a bundle, or deselects it with `None`.
    ///
    /// ## Behavior
    /// - `Some(code)`: modules become the bundle's modules ∪ required modules;
    ///   add-ons left without their module are dropped. Counts as a module
    ///   choice, so later industry picks no longer reseed
    /// - `None`: the bundle is cleared and the module set is kept as it is
    pub fn select_bundle(&self, catalog: &Catalog, bundle_code: Option<&str>) -> Transition {
        let Some(code) = bundle_code else {
            let mut next = self.clone();
            next.selected_bundle_code = None;
            return Transition::accepted(next.drop_mismatched_coupon());
        };

        let Some(bundle) = catalog.bundle(code) else {
            return Transition::rejected(
                self,
                Rejection::UnknownBundle {
                    code: code.to_string(),
                },
            );
        };

        let mut next = self.clone();
        next.selected_bundle_code = Some(bundle.code.clone());
        next.modules_customized = true;
        let next = next
            .with_modules(catalog, bundle.module_codes.iter().cloned().collect())
            .drop_mismatched_coupon();

        Transition::accepted(next)
    }

    /// Sets the billing cycle. Touches nothing else.
    pub fn set_billing_cycle(&self, cycle: BillingCycle) -> Configuration {
        let mut next = self.clone();
        next.billing_cycle = cycle;
        next
    }

    /// Applies a coupon code, replacing any coupon already applied.
    ///
    /// ## Returns
    /// - Accepted: `coupon_code` holds the coupon's canonical code
    /// - Rejected: configuration unchanged (including the previous coupon),
    ///   with [`Rejection::MalformedCouponCode`] or [`Rejection::Coupon`]
    pub fn apply_coupon<D, R>(
        &self,
        code: &str,
        now: DateTime<Utc>,
        directory: &D,
        redemptions: &R,
    ) -> Transition
    where
        D: CouponDirectory + ?Sized,
        R: RedemptionCounter + ?Sized,
    {
        let normalized = match normalize_coupon_code(code) {
            Ok(normalized) => normalized,
            Err(err) => {
                return Transition::rejected(
                    self,
                    Rejection::MalformedCouponCode {
                        reason: err.to_string(),
                    },
                )
            }
        };

        match coupon::validate(&normalized, now, self, directory, redemptions) {
            Ok(coupon) => {
                let mut next = self.clone();
                next.coupon_code = Some(coupon.code);
                next.coupon_bundle = coupon.applies_to_bundle_code;
                Transition::accepted(next)
            }
            Err(rejection) => Transition::rejected(self, Rejection::Coupon(rejection)),
        }
    }

    /// Clears the coupon.
    pub fn remove_coupon(&self) -> Configuration {
        let mut next = self.clone();
        next.coupon_code = None;
        next.coupon_bundle = None;
        next
    }

    // =========================================================================
    // Invariant Helpers
    // =========================================================================

    /// Replaces the module set, restoring invariants 1 and 3.
    ///
    /// Required modules are unioned in, required add-ons of selected modules
    /// are added, and add-ons whose owning module is gone are dropped.
    fn with_modules(mut self, catalog: &Catalog, mut modules: BTreeSet<String>) -> Self {
        modules.extend(catalog.required_module_codes());

        for code in &modules {
            if let Some(module) = catalog.module(code) {
                self.selected_addon_codes
                    .extend(module.required_addon_codes.iter().cloned());
            }
        }

        self.selected_addon_codes
            .retain(|code| match catalog.addon(code) {
                Some(addon) => addon
                    .module_code
                    .as_ref()
                    .map_or(true, |owner| modules.contains(owner)),
                None => false,
            });

        self.selected_module_codes = modules;
        self
    }

    /// Drops a coupon restricted to a bundle the configuration no longer has.
    fn drop_mismatched_coupon(mut self) -> Self {
        if let Some(required) = &self.coupon_bundle {
            if self.selected_bundle_code.as_ref() != Some(required) {
                self.coupon_code = None;
                self.coupon_bundle = None;
            }
        }
        self
    }

    fn module_requiring_addon<'a>(&self, catalog: &'a Catalog, addon_code: &str) -> Option<&'a str> {
        self.selected_module_codes
            .iter()
            .filter_map(|code| catalog.module(code))
            .find(|m| m.required_addon_codes.iter().any(|a| a == addon_code))
            .map(|m| m.code.as_str())
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
    use crate::error::CouponRejection;
    use crate::money::{DiscountRate, Money};
    use crate::types::Coupon;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
    }

    fn coupons() -> CouponTable {
        let mut growth_only = Coupon::percent("GROWTH10", DiscountRate::from_percent(10));
        growth_only.applies_to_bundle_code = Some("growth".to_string());
        [
            Coupon::percent("HALF", DiscountRate::from_percent(50)),
            Coupon::fixed("TENOFF", Money::from_cents(1000)),
            growth_only,
        ]
        .into_iter()
        .collect()
    }

    fn codes(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let cfg = Configuration::new(&fixtures::catalog());
        assert_eq!(cfg.selected_module_codes(), &codes(&["core"]));
        assert!(cfg.selected_addon_codes().is_empty());
        assert_eq!(cfg.billing_cycle(), BillingCycle::Monthly);
        assert!(cfg.selected_industry_code().is_none());
        assert!(cfg.coupon_code().is_none());
        assert!(!cfg.modules_customized());
    }

    #[test]
    fn test_select_industry_seeds_modules() {
        let catalog = fixtures::catalog();
        let t = Configuration::new(&catalog).select_industry(&catalog, "logistics");
        assert!(t.is_accepted());
        assert_eq!(
            t.configuration.selected_module_codes(),
            &codes(&["analytics", "core", "crm"])
        );
        assert_eq!(t.configuration.selected_industry_code(), Some("logistics"));
    }

    #[test]
    fn test_reselect_industry_before_edits_reseeds() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .select_industry(&catalog, "logistics")
            .configuration
            .select_industry(&catalog, "retail")
            .configuration;
        assert_eq!(cfg.selected_module_codes(), &codes(&["core", "invoicing"]));
        // Required add-on of invoicing came along.
        assert!(cfg.has_addon("einvoice"));
    }

    #[test]
    fn test_select_industry_after_manual_edit_keeps_modules() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .select_industry(&catalog, "logistics")
            .configuration
            .toggle_module(&catalog, "analytics")
            .configuration;
        assert!(cfg.modules_customized());

        let t = cfg.select_industry(&catalog, "retail");
        assert!(t.is_accepted());
        assert_eq!(t.configuration.selected_industry_code(), Some("retail"));
        assert_eq!(t.configuration.selected_module_codes(), &codes(&["core", "crm"]));
    }

    #[test]
    fn test_unknown_industry_rejected() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog);
        let t = cfg.select_industry(&catalog, "mining");
        assert_eq!(t.configuration, cfg);
        assert!(matches!(t.rejection, Some(Rejection::UnknownIndustry { .. })));
    }

    #[test]
    fn test_toggle_required_module_is_noop() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog);
        let t = cfg.toggle_module(&catalog, "core");
        assert_eq!(t.configuration, cfg);
        assert!(matches!(t.rejection, Some(Rejection::RequiredModule { .. })));
    }

    #[test]
    fn test_toggle_module_clears_bundle() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .select_bundle(&catalog, Some("growth"))
            .configuration;
        assert_eq!(cfg.selected_bundle_code(), Some("growth"));

        let cfg = cfg.toggle_module(&catalog, "analytics").configuration;
        assert!(cfg.selected_bundle_code().is_none());
        assert_eq!(
            cfg.selected_module_codes(),
            &codes(&["analytics", "core", "crm", "invoicing"])
        );
    }

    #[test]
    fn test_removing_module_drops_owned_addons() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .toggle_module(&catalog, "crm")
            .configuration
            .toggle_addon(&catalog, "crm-ai")
            .configuration
            .toggle_addon(&catalog, "priority-support")
            .configuration;
        assert!(cfg.has_addon("crm-ai"));

        let cfg = cfg.toggle_module(&catalog, "crm").configuration;
        assert!(!cfg.has_addon("crm-ai"));
        assert!(cfg.has_addon("priority-support"));
    }

    #[test]
    fn test_toggle_addon_without_module_is_rejected() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog);
        let t = cfg.toggle_addon(&catalog, "crm-ai");
        assert_eq!(t.configuration, cfg);
        assert_eq!(
            t.rejection,
            Some(Rejection::AddonModuleNotSelected {
                code: "crm-ai".to_string(),
                module_code: "crm".to_string(),
            })
        );
    }

    #[test]
    fn test_required_addon_cannot_be_removed() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .toggle_module(&catalog, "invoicing")
            .configuration;
        assert!(cfg.has_addon("einvoice"));

        let t = cfg.toggle_addon(&catalog, "einvoice");
        assert!(matches!(t.rejection, Some(Rejection::RequiredAddon { .. })));
        assert!(t.configuration.has_addon("einvoice"));
    }

    #[test]
    fn test_global_addon_toggles() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog);
        let on = cfg.toggle_addon(&catalog, "priority-support").configuration;
        assert!(on.has_addon("priority-support"));
        let off = on.toggle_addon(&catalog, "priority-support").configuration;
        assert!(!off.has_addon("priority-support"));
    }

    #[test]
    fn test_select_bundle_overwrites_modules() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .toggle_module(&catalog, "analytics")
            .configuration
            .select_bundle(&catalog, Some("growth"))
            .configuration;
        assert_eq!(
            cfg.selected_module_codes(),
            &codes(&["core", "crm", "invoicing"])
        );
        assert!(cfg.has_addon("einvoice"));
    }

    #[test]
    fn test_deselect_bundle_keeps_modules() {
        let catalog = fixtures::catalog();
        let on = Configuration::new(&catalog)
            .select_bundle(&catalog, Some("growth"))
            .configuration;
        let off = on.select_bundle(&catalog, None).configuration;
        assert!(off.selected_bundle_code().is_none());
        assert_eq!(off.selected_module_codes(), on.selected_module_codes());
    }

    #[test]
    fn test_industry_after_deselected_bundle_keeps_modules() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .select_bundle(&catalog, Some("growth"))
            .configuration
            .select_bundle(&catalog, None)
            .configuration;
        assert!(cfg.modules_customized());

        let t = cfg.select_industry(&catalog, "logistics");
        assert!(t.is_accepted());
        assert_eq!(t.configuration.selected_industry_code(), Some("logistics"));
        assert_eq!(
            t.configuration.selected_module_codes(),
            &codes(&["core", "crm", "invoicing"])
        );
    }

    #[test]
    fn test_unknown_bundle_rejected() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog);
        let t = cfg.select_bundle(&catalog, Some("enterprise"));
        assert_eq!(t.configuration, cfg);
        assert!(matches!(t.rejection, Some(Rejection::UnknownBundle { .. })));
    }

    #[test]
    fn test_bundle_without_required_modules_in_catalog() {
        let catalog = fixtures::catalog_without_required();
        let cfg = Configuration::new(&catalog);
        assert!(cfg.selected_module_codes().is_empty());
        let cfg = cfg.select_bundle(&catalog, Some("growth")).configuration;
        assert_eq!(cfg.selected_module_codes(), &codes(&["crm", "invoicing"]));
    }

    #[test]
    fn test_set_billing_cycle_touches_nothing_else() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .select_bundle(&catalog, Some("growth"))
            .configuration
            .apply_coupon("half", now(), &coupons(), &Unlimited)
            .configuration;
        let annual = cfg.set_billing_cycle(BillingCycle::Annual);
        assert_eq!(annual.billing_cycle(), BillingCycle::Annual);
        assert_eq!(annual.set_billing_cycle(BillingCycle::Monthly), cfg);
    }

    #[test]
    fn test_apply_coupon_replaces_previous() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .apply_coupon("half", now(), &coupons(), &Unlimited)
            .configuration;
        assert_eq!(cfg.coupon_code(), Some("HALF"));

        let cfg = cfg
            .apply_coupon("TenOff", now(), &coupons(), &Unlimited)
            .configuration;
        assert_eq!(cfg.coupon_code(), Some("TENOFF"));
    }

    #[test]
    fn test_unknown_coupon_keeps_previous() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .apply_coupon("HALF", now(), &coupons(), &Unlimited)
            .configuration;

        let t = cfg.apply_coupon("BOGUS", now(), &coupons(), &Unlimited);
        assert_eq!(t.configuration.coupon_code(), Some("HALF"));
        assert_eq!(
            t.rejection,
            Some(Rejection::Coupon(CouponRejection::NotFound {
                code: "BOGUS".to_string()
            }))
        );
    }

    #[test]
    fn test_malformed_coupon_code() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog);
        let t = cfg.apply_coupon("  ", now(), &coupons(), &Unlimited);
        assert_eq!(t.configuration, cfg);
        assert!(matches!(
            t.rejection,
            Some(Rejection::MalformedCouponCode { .. })
        ));
    }

    #[test]
    fn test_remove_coupon() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .apply_coupon("HALF", now(), &coupons(), &Unlimited)
            .configuration
            .remove_coupon();
        assert!(cfg.coupon_code().is_none());
    }

    #[test]
    fn test_leaving_bundle_drops_restricted_coupon() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog)
            .select_bundle(&catalog, Some("growth"))
            .configuration
            .apply_coupon("growth10", now(), &coupons(), &Unlimited)
            .configuration;
        assert_eq!(cfg.coupon_code(), Some("GROWTH10"));

        let edited = cfg.toggle_module(&catalog, "analytics").configuration;
        assert!(edited.coupon_code().is_none());

        let cleared = cfg.select_bundle(&catalog, None).configuration;
        assert!(cleared.coupon_code().is_none());

        // Unrestricted coupons survive bundle changes.
        let half = cfg
            .apply_coupon("HALF", now(), &coupons(), &Unlimited)
            .configuration
            .select_bundle(&catalog, None)
            .configuration;
        assert_eq!(half.coupon_code(), Some("HALF"));
    }

    #[test]
    fn test_from_deep_link() {
        let catalog = fixtures::catalog();
        let link = DeepLink {
            industry: Some("retail".to_string()),
            bundle: Some("growth".to_string()),
            billing_cycle: Some(BillingCycle::Annual),
            coupon: Some("growth10".to_string()),
        };
        let (cfg, rejections) =
            Configuration::from_deep_link(&catalog, &coupons(), &link, now(), &Unlimited);

        assert!(rejections.is_empty());
        assert_eq!(cfg.selected_industry_code(), Some("retail"));
        assert_eq!(cfg.selected_bundle_code(), Some("growth"));
        assert_eq!(cfg.billing_cycle(), BillingCycle::Annual);
        assert_eq!(cfg.coupon_code(), Some("GROWTH10"));
        assert_eq!(
            cfg.selected_module_codes(),
            &codes(&["core", "crm", "invoicing"])
        );
    }

    #[test]
    fn test_from_deep_link_drops_invalid_parts() {
        let catalog = fixtures::catalog();
        let link = DeepLink {
            industry: None,
            bundle: Some("legacy".to_string()),
            billing_cycle: None,
            coupon: Some("EXPIRED1".to_string()),
        };
        let (cfg, rejections) =
            Configuration::from_deep_link(&catalog, &coupons(), &link, now(), &Unlimited);

        assert_eq!(cfg, Configuration::new(&catalog));
        assert_eq!(rejections.len(), 2);
    }

    #[test]
    fn test_deep_link_deserializes_camel_case() {
        let link: DeepLink =
            serde_json::from_str(r#"{"bundle":"growth","billingCycle":"annual"}"#).unwrap();
        assert_eq!(link.bundle.as_deref(), Some("growth"));
        assert_eq!(link.billing_cycle, Some(BillingCycle::Annual));
        assert!(link.coupon.is_none());
    }

    #[test]
    fn test_configuration_serializes_without_internal_fields() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog);
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["billingCycle"], "monthly");
        assert_eq!(json["selectedModuleCodes"], serde_json::json!(["core"]));
        assert!(json.get("couponBundle").is_none());
    }
}

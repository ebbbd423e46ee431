//! # Configurator Session
//!
//! Holds one buyer's Configuration and its latest price while the
//! configurator is open.
//!
//! ## Session Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Operations                                   │
//! │                                                                         │
//! │  Page Action              Session Method            State Change        │
//! │  ───────────              ──────────────            ────────────        │
//! │                                                                         │
//! │  Pick industry ─────────► select_industry() ──────► transition + price  │
//! │                                                                         │
//! │  Tick module/add-on ────► toggle_module/addon() ──► transition + price  │
//! │                                                                         │
//! │  Pick bundle ───────────► select_bundle() ────────► transition + price  │
//! │                                                                         │
//! │  Enter coupon ──────────► apply_coupon_with() ────► await count, then   │
//! │                                                      transition (latest │
//! │                                                      submission only)   │
//! │                                                                         │
//! │  Continue ──────────────► checkout() ─────────────► CheckoutSnapshot    │
//! │                                                                         │
//! │  NOTE: the lock is held only while a transition runs, never across an   │
//! │        await.                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use configurator_catalog::LoadedCatalog;
use configurator_core::validation::normalize_coupon_code;
use configurator_core::{
    compute_price, AddOn, BillingCycle, Catalog, CheckoutSnapshot, Configuration, CouponDirectory,
    CouponTable, DeepLink, Money, PriceAnnouncement, PriceBreakdown, RedemptionCounter, Rejection,
    Transition,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::announce::announcement_text;
use crate::error::ApiError;
use crate::redemption::{fetch_count, FetchedCount, RedemptionService};

// =============================================================================
// Session Update
// =============================================================================

/// What the page receives after every session operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionUpdate {
    pub configuration: Configuration,
    pub breakdown: PriceBreakdown,

    /// Why the operation left the configuration unchanged, if it did.
    pub rejection: Option<Rejection>,

    /// Present only when the final price, savings or billing cycle changed.
    pub announcement: Option<PriceAnnouncement>,
}

impl SessionUpdate {
    pub fn is_accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

#[derive(Debug, Clone)]
struct SessionState {
    configuration: Configuration,
    breakdown: PriceBreakdown,
}

// =============================================================================
// Configurator Session
// =============================================================================

/// Caller-side holder of a Configuration.
///
/// ## Thread Safety
/// Uses `Arc<Mutex<_>>` so clones of the session can be handed to concurrent
/// tasks; each transition runs under the lock. Coupon submissions carry a
/// generation number and only the latest one is committed.
#[derive(Debug, Clone)]
pub struct ConfiguratorSession {
    catalog: Arc<LoadedCatalog>,
    state: Arc<Mutex<SessionState>>,
    coupon_generation: Arc<AtomicU64>,
}

impl ConfiguratorSession {
    /// Opens a session on the default configuration.
    pub fn new(loaded: LoadedCatalog) -> Self {
        let configuration = Configuration::new(&loaded.catalog);
        Self::with_configuration(loaded, configuration)
    }

    /// Opens a session seeded from a pricing page link.
    ///
    /// Invalid parts of the link are dropped and reported; the session always
    /// opens.
    pub fn from_deep_link<R>(
        loaded: LoadedCatalog,
        link: &DeepLink,
        now: DateTime<Utc>,
        redemptions: &R,
    ) -> (Self, Vec<Rejection>)
    where
        R: RedemptionCounter + ?Sized,
    {
        let (configuration, rejections) = Configuration::from_deep_link(
            &loaded.catalog,
            &loaded.coupons,
            link,
            now,
            redemptions,
        );

        for rejection in &rejections {
            warn!(%rejection, "Deep link selection dropped");
        }

        (Self::with_configuration(loaded, configuration), rejections)
    }

    fn with_configuration(loaded: LoadedCatalog, configuration: Configuration) -> Self {
        let breakdown = compute_price(&configuration, &loaded.catalog, &loaded.coupons);
        info!(
            source = %loaded.source,
            modules = configuration.selected_module_codes().len(),
            final_price = breakdown.final_price.cents(),
            "Configurator session opened"
        );

        ConfiguratorSession {
            catalog: Arc::new(loaded),
            state: Arc::new(Mutex::new(SessionState {
                configuration,
                breakdown,
            })),
            coupon_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog.catalog
    }

    pub fn coupons(&self) -> &CouponTable {
        &self.catalog.coupons
    }

    pub fn configuration(&self) -> Configuration {
        self.with_state(|s| s.configuration.clone())
    }

    pub fn breakdown(&self) -> PriceBreakdown {
        self.with_state(|s| s.breakdown.clone())
    }

    /// Add-ons the page should offer for the current module selection.
    pub fn available_addons(&self) -> Vec<AddOn> {
        self.with_state(|s| {
            self.catalog()
                .available_addons(s.configuration.selected_module_codes())
                .cloned()
                .collect()
        })
    }

    /// Formats an amount in the catalog's currency.
    pub fn format_price(&self, amount: Money) -> String {
        self.catalog().currency.format(amount)
    }

    /// English text for an announcement, in the catalog's currency.
    pub fn announcement_text(&self, announcement: &PriceAnnouncement) -> String {
        announcement_text(announcement, &self.catalog().currency)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    pub fn select_industry(&self, industry_code: &str) -> SessionUpdate {
        self.transition("select_industry", |cfg, catalog| {
            cfg.select_industry(catalog, industry_code)
        })
    }

    pub fn toggle_module(&self, module_code: &str) -> SessionUpdate {
        self.transition("toggle_module", |cfg, catalog| {
            cfg.toggle_module(catalog, module_code)
        })
    }

    pub fn toggle_addon(&self, addon_code: &str) -> SessionUpdate {
        self.transition("toggle_addon", |cfg, catalog| {
            cfg.toggle_addon(catalog, addon_code)
        })
    }

    pub fn select_bundle(&self, bundle_code: Option<&str>) -> SessionUpdate {
        self.transition("select_bundle", |cfg, catalog| {
            cfg.select_bundle(catalog, bundle_code)
        })
    }

    pub fn set_billing_cycle(&self, cycle: BillingCycle) -> SessionUpdate {
        self.transition("set_billing_cycle", |cfg, _| Transition {
            configuration: cfg.set_billing_cycle(cycle),
            rejection: None,
        })
    }

    /// Applies a coupon with a redemption count the caller already has.
    ///
    /// Supersedes any coupon submission still waiting on the service.
    pub fn apply_coupon<R>(&self, code: &str, now: DateTime<Utc>, redemptions: &R) -> SessionUpdate
    where
        R: RedemptionCounter + ?Sized,
    {
        self.coupon_generation.fetch_add(1, Ordering::SeqCst);
        self.transition("apply_coupon", |cfg, _| {
            cfg.apply_coupon(code, now, &self.catalog.coupons, redemptions)
        })
    }

    /// Applies a coupon, asking the redemption service for its count first.
    ///
    /// ## Last Call Wins
    /// ```text
    /// t0  apply_coupon_with("LAUNCH50")  ── awaiting service ...
    /// t1  apply_coupon_with("WELCOME10") ── uncapped, committed
    /// t2  ... service answers for LAUNCH50 ──► superseded, returns None
    /// ```
    ///
    /// ## Returns
    /// - `Some(update)` when this submission was committed
    /// - `None` when a newer coupon submission arrived while waiting
    pub async fn apply_coupon_with<S>(
        &self,
        code: &str,
        now: DateTime<Utc>,
        service: &S,
    ) -> Option<SessionUpdate>
    where
        S: RedemptionService + ?Sized,
    {
        let generation = self.coupon_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let count = self.fetch_count_for(code, service).await;

        let mut state = self.state.lock().expect("Session mutex poisoned");
        if self.coupon_generation.load(Ordering::SeqCst) != generation {
            debug!(coupon = %code, "Coupon submission superseded");
            return None;
        }

        let transition = state.configuration.apply_coupon(code, now, &self.catalog.coupons, &count);
        Some(self.commit(&mut state, "apply_coupon", transition))
    }

    pub fn remove_coupon(&self) -> SessionUpdate {
        self.coupon_generation.fetch_add(1, Ordering::SeqCst);
        self.transition("remove_coupon", |cfg, _| Transition {
            configuration: cfg.remove_coupon(),
            rejection: None,
        })
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Captures the checkout snapshot, re-validating the coupon at `now`.
    pub fn checkout<R>(
        &self,
        now: DateTime<Utc>,
        referral_code: Option<&str>,
        redemptions: &R,
    ) -> Result<CheckoutSnapshot, ApiError>
    where
        R: RedemptionCounter + ?Sized,
    {
        let configuration = self.configuration();
        let snapshot = CheckoutSnapshot::capture(
            &configuration,
            self.catalog(),
            self.coupons(),
            redemptions,
            now,
            referral_code,
        )
        .map_err(|e| {
            warn!(error = %e, "Checkout capture failed");
            ApiError::from(e)
        })?;

        info!(
            snapshot_id = %snapshot.id,
            billing_cycle = %configuration.billing_cycle(),
            final_price = snapshot.breakdown.final_price.cents(),
            billed_amount = snapshot.billed_amount.cents(),
            "Checkout snapshot captured"
        );
        Ok(snapshot)
    }

    /// [`ConfiguratorSession::checkout`] with the redemption count fetched
    /// from the service.
    pub async fn checkout_with<S>(
        &self,
        now: DateTime<Utc>,
        referral_code: Option<&str>,
        service: &S,
    ) -> Result<CheckoutSnapshot, ApiError>
    where
        S: RedemptionService + ?Sized,
    {
        let count = match self.configuration().coupon_code() {
            Some(code) => self.fetch_count_for(code, service).await,
            None => FetchedCount::Uncapped,
        };
        self.checkout(now, referral_code, &count)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn with_state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&SessionState) -> T,
    {
        let state = self.state.lock().expect("Session mutex poisoned");
        f(&state)
    }

    fn transition<F>(&self, action: &'static str, f: F) -> SessionUpdate
    where
        F: FnOnce(&Configuration, &Catalog) -> Transition,
    {
        let mut state = self.state.lock().expect("Session mutex poisoned");
        let transition = f(&state.configuration, self.catalog());
        self.commit(&mut state, action, transition)
    }

    /// Prices the transition's configuration and stores it as current.
    fn commit(&self, state: &mut SessionState, action: &str, transition: Transition) -> SessionUpdate {
        let (configuration, rejection) = transition.into_parts();
        let breakdown = compute_price(&configuration, self.catalog(), self.coupons());
        let announcement = PriceAnnouncement::between(
            Some((&state.breakdown, state.configuration.billing_cycle())),
            &breakdown,
            configuration.billing_cycle(),
        );

        match &rejection {
            Some(Rejection::Coupon(coupon)) => {
                warn!(action, coupon = %coupon.code(), reason = %coupon, "Coupon rejected");
            }
            Some(other) => debug!(action, rejection = %other, "Transition rejected"),
            None => debug!(
                action,
                final_price = breakdown.final_price.cents(),
                total_savings = breakdown.total_savings.cents(),
                "Transition applied"
            ),
        }

        state.configuration = configuration.clone();
        state.breakdown = breakdown.clone();

        SessionUpdate {
            configuration,
            breakdown,
            rejection,
            announcement,
        }
    }

    /// Resolves the redemption count a coupon code needs.
    ///
    /// Only capped coupons hit the service; unknown codes skip it and are
    /// rejected as not found during validation.
    async fn fetch_count_for<S>(&self, code: &str, service: &S) -> FetchedCount
    where
        S: RedemptionService + ?Sized,
    {
        let capped = normalize_coupon_code(code)
            .ok()
            .and_then(|normalized| self.coupons().find(&normalized))
            .filter(|coupon| coupon.max_redemptions.is_some())
            .map(|coupon| coupon.code.clone());

        match capped {
            Some(canonical) => fetch_count(service, &canonical).await,
            None => FetchedCount::Uncapped,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Coupon Validator
//!
//! Pure predicates and lookup deciding whether a coupon code may enter a
//! Configuration.
//!
//! ## Check Order
//! ```text
//! code ──► directory.find ──► NotFound
//!              │
//!              ▼
//!          valid_from > now ──► NotYetValid
//!              │
//!              ▼
//!          valid_until < now ──► Expired
//!              │
//!              ▼
//!          bundle restriction ≠ selected bundle ──► WrongBundle
//!              │
//!              ▼
//!          max_redemptions? ──► counter.redemptions_used()
//!              │                    ├── None ──► Unavailable
//!              │                    └── used ≥ max ──► RedemptionsExhausted
//!              ▼
//!          Ok(Coupon)
//! ```
//!
//! Redemption counts live in an external service. The validator only queries
//! an injected [`RedemptionCounter`]; it never keeps counts itself.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::catalog::CouponDirectory;
use crate::error::CouponRejection;
use crate::state::Configuration;
use crate::types::Coupon;

// =============================================================================
// Redemption Counter
// =============================================================================

/// Capability answering "how many times has this coupon been redeemed?".
///
/// Returning `None` means the counter could not answer (service unreachable);
/// the validator reports that as [`CouponRejection::Unavailable`].
pub trait RedemptionCounter {
    fn redemptions_used(&self, coupon_code: &str) -> Option<u32>;
}

/// Counter for callers that never cap redemptions: always zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl RedemptionCounter for Unlimited {
    fn redemptions_used(&self, _coupon_code: &str) -> Option<u32> {
        Some(0)
    }
}

/// Counts fetched ahead of time by the caller, keyed by upper-case code.
///
/// Codes missing from the map have not been redeemed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchedRedemptions {
    counts: BTreeMap<String, u32>,
}

impl PrefetchedRedemptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(mut self, coupon_code: &str, used: u32) -> Self {
        self.counts.insert(coupon_code.trim().to_uppercase(), used);
        self
    }
}

impl RedemptionCounter for PrefetchedRedemptions {
    fn redemptions_used(&self, coupon_code: &str) -> Option<u32> {
        Some(
            self.counts
                .get(&coupon_code.trim().to_uppercase())
                .copied()
                .unwrap_or(0),
        )
    }
}

/// A counter whose service could not be reached.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unreachable;

impl RedemptionCounter for Unreachable {
    fn redemptions_used(&self, _coupon_code: &str) -> Option<u32> {
        None
    }
}

impl<C: RedemptionCounter + ?Sized> RedemptionCounter for &C {
    fn redemptions_used(&self, coupon_code: &str) -> Option<u32> {
        (**self).redemptions_used(coupon_code)
    }
}

// =============================================================================
// Predicates
// =============================================================================

/// Returns true if `now` falls inside the coupon's validity window.
///
/// Both bounds are inclusive; a missing bound is unbounded.
pub fn is_active(coupon: &Coupon, now: DateTime<Utc>) -> bool {
    coupon.valid_from.map_or(true, |from| now >= from)
        && coupon.valid_until.map_or(true, |until| now <= until)
}

/// Returns true if the coupon's bundle restriction (if any) matches the
/// configuration's selected bundle.
pub fn matches_configuration(coupon: &Coupon, configuration: &Configuration) -> bool {
    match &coupon.applies_to_bundle_code {
        None => true,
        Some(bundle) => configuration.selected_bundle_code() == Some(bundle.as_str()),
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Resolves a coupon code to a coupon usable on `configuration` at `now`.
///
/// ## Returns
/// - `Ok(Coupon)` with the directory's canonical record
/// - `Err(CouponRejection)` with the first failing check (see module docs)
pub fn validate<D, R>(
    code: &str,
    now: DateTime<Utc>,
    configuration: &Configuration,
    directory: &D,
    redemptions: &R,
) -> Result<Coupon, CouponRejection>
where
    D: CouponDirectory + ?Sized,
    R: RedemptionCounter + ?Sized,
{
    let lookup_code = code.trim().to_uppercase();

    let coupon = directory
        .find(&lookup_code)
        .ok_or_else(|| CouponRejection::NotFound {
            code: lookup_code.clone(),
        })?;

    if coupon.valid_from.is_some_and(|from| now < from) {
        return Err(CouponRejection::NotYetValid {
            code: coupon.code.clone(),
        });
    }

    if coupon.valid_until.is_some_and(|until| now > until) {
        return Err(CouponRejection::Expired {
            code: coupon.code.clone(),
        });
    }

    if !matches_configuration(coupon, configuration) {
        return Err(CouponRejection::WrongBundle {
            code: coupon.code.clone(),
            required_bundle: coupon.applies_to_bundle_code.clone().unwrap_or_default(),
        });
    }

    if let Some(max) = coupon.max_redemptions {
        let used = redemptions
            .redemptions_used(&coupon.code)
            .ok_or_else(|| CouponRejection::Unavailable {
                code: coupon.code.clone(),
            })?;
        if used >= max {
            return Err(CouponRejection::RedemptionsExhausted {
                code: coupon.code.clone(),
            });
        }
    }

    Ok(coupon.clone())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{fixtures, CouponTable};
    use crate::money::{DiscountRate, Money};
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, day, 12, 0, 0).unwrap()
    }

    fn windowed() -> Coupon {
        let mut coupon = Coupon::percent("SUMMER", DiscountRate::from_percent(15));
        coupon.valid_from = Some(at(10));
        coupon.valid_until = Some(at(20));
        coupon
    }

    fn directory() -> CouponTable {
        let mut growth_only = Coupon::fixed("GROWTH100", Money::from_cents(10_000));
        growth_only.applies_to_bundle_code = Some("growth".to_string());

        let mut capped = Coupon::percent("FIRST10", DiscountRate::from_percent(10));
        capped.max_redemptions = Some(10);

        [windowed(), growth_only, capped].into_iter().collect()
    }

    #[test]
    fn test_is_active_window_bounds_inclusive() {
        let coupon = windowed();
        assert!(!is_active(&coupon, at(9)));
        assert!(is_active(&coupon, at(10)));
        assert!(is_active(&coupon, at(20)));
        assert!(!is_active(&coupon, at(21)));
    }

    #[test]
    fn test_is_active_open_bounds() {
        let coupon = Coupon::percent("ALWAYS", DiscountRate::from_percent(5));
        assert!(is_active(&coupon, at(1)));
    }

    #[test]
    fn test_validate_not_found() {
        let cfg = Configuration::new(&fixtures::catalog());
        let result = validate("nope", at(15), &cfg, &directory(), &Unlimited);
        assert_eq!(
            result,
            Err(CouponRejection::NotFound {
                code: "NOPE".to_string()
            })
        );
    }

    #[test]
    fn test_validate_window() {
        let cfg = Configuration::new(&fixtures::catalog());
        let dir = directory();

        assert!(matches!(
            validate("summer", at(5), &cfg, &dir, &Unlimited),
            Err(CouponRejection::NotYetValid { .. })
        ));
        assert!(matches!(
            validate("summer", at(25), &cfg, &dir, &Unlimited),
            Err(CouponRejection::Expired { .. })
        ));
        let coupon = validate("Summer", at(15), &cfg, &dir, &Unlimited).unwrap();
        assert_eq!(coupon.code, "SUMMER");
    }

    #[test]
    fn test_validate_bundle_restriction() {
        let catalog = fixtures::catalog();
        let cfg = Configuration::new(&catalog);
        let dir = directory();

        assert!(matches!(
            validate("GROWTH100", at(15), &cfg, &dir, &Unlimited),
            Err(CouponRejection::WrongBundle { .. })
        ));

        let on_growth = cfg.select_bundle(&catalog, Some("growth")).configuration;
        assert!(validate("GROWTH100", at(15), &on_growth, &dir, &Unlimited).is_ok());
    }

    #[test]
    fn test_validate_redemptions() {
        let cfg = Configuration::new(&fixtures::catalog());
        let dir = directory();

        let nine = PrefetchedRedemptions::new().with_count("first10", 9);
        assert!(validate("FIRST10", at(15), &cfg, &dir, &nine).is_ok());

        let ten = PrefetchedRedemptions::new().with_count("FIRST10", 10);
        assert!(matches!(
            validate("FIRST10", at(15), &cfg, &dir, &ten),
            Err(CouponRejection::RedemptionsExhausted { .. })
        ));

        assert!(matches!(
            validate("FIRST10", at(15), &cfg, &dir, &Unreachable),
            Err(CouponRejection::Unavailable { .. })
        ));
    }

    #[test]
    fn test_uncapped_coupon_never_queries_counter() {
        let cfg = Configuration::new(&fixtures::catalog());
        // Unreachable would reject a capped coupon; SUMMER has no cap.
        assert!(validate("SUMMER", at(15), &cfg, &directory(), &Unreachable).is_ok());
    }
}

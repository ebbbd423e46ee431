//! # Validation Module
//!
//! Input validation for catalog data and buyer-typed codes.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Catalog load (configurator-catalog)                           │
//! │  └── validate_catalog(): codes, prices, rates, references, windows      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Transitions (state module)                                    │
//! │  ├── normalize_coupon_code(): what the buyer typed                      │
//! │  └── Invariants 1-5 on every Configuration                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Checkout capture                                              │
//! │  └── Coupon re-validated at hand-off time                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use configurator_core::validation::{normalize_coupon_code, validate_code};
//!
//! assert!(validate_code("module", "crm-sync").is_ok());
//! assert_eq!(normalize_coupon_code(" launch50 ").unwrap(), "LAUNCH50");
//! ```

use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::error::ValidationError;
use crate::money::{DiscountRate, Money};
use crate::types::{Coupon, CouponKind};
use crate::{MAX_CODE_LENGTH, MAX_COUPON_CODE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a catalog code (module, add-on, bundle, industry).
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Letters, numbers, hyphens and underscores only
pub fn validate_code(field: &str, code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if code.len() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Normalizes a coupon code as typed by the buyer.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Case-insensitive: returned upper-case
/// - At most 32 characters of `A-Z`, `0-9`, `-`, `_`
///
/// ## Returns
/// The canonical code used for directory lookups.
pub fn normalize_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "coupon code".to_string(),
        });
    }

    if code.len() > MAX_COUPON_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "coupon code".to_string(),
            max: MAX_COUPON_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "coupon code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_uppercase())
}

/// Validates a display name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price. Zero is allowed (included add-ons).
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount rate: 0% to 100%.
pub fn validate_discount_rate(field: &str, rate: DiscountRate) -> ValidationResult<()> {
    if rate > DiscountRate::FULL {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: DiscountRate::FULL.bps() as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Coupon Validator
// =============================================================================

/// Validates a coupon record from the coupon feed.
///
/// ## Rules
/// - Code is a well-formed coupon code
/// - Percent coupons: 0 to 10000 bps; fixed coupons: non-negative cents
/// - `valid_until` is not before `valid_from`
/// - A redemption cap, when present, is at least 1
pub fn validate_coupon(coupon: &Coupon) -> ValidationResult<()> {
    normalize_coupon_code(&coupon.code)?;

    match coupon.kind {
        CouponKind::Percent => {
            if coupon.value < 0 || coupon.value > DiscountRate::FULL.bps() as i64 {
                return Err(ValidationError::OutOfRange {
                    field: format!("coupon {} value", coupon.code),
                    min: 0,
                    max: DiscountRate::FULL.bps() as i64,
                });
            }
        }
        CouponKind::Fixed => {
            validate_price(&format!("coupon {} value", coupon.code), Money::from_cents(coupon.value))?
        }
    }

    if let (Some(from), Some(until)) = (coupon.valid_from, coupon.valid_until) {
        if until < from {
            return Err(ValidationError::InvalidFormat {
                field: format!("coupon {} validity", coupon.code),
                reason: "valid_until must not be before valid_from".to_string(),
            });
        }
    }

    if coupon.max_redemptions == Some(0) {
        return Err(ValidationError::OutOfRange {
            field: format!("coupon {} max_redemptions", coupon.code),
            min: 1,
            max: u32::MAX as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Catalog Validator
// =============================================================================

/// Validates the internal consistency of a catalog feed.
///
/// The engine itself only relies on its own invariants at transition time;
/// this check runs once when the catalog is loaded so that broken feeds are
/// caught before a buyer sees them.
///
/// ## Rules
/// - Every code is well-formed and unique within its kind
/// - Prices are non-negative, discount rates within 0-100%
/// - Bundle and industry module references exist
/// - An owned add-on's module exists and lists it as allowed
/// - A module's required add-ons exist and are owned by it or global
pub fn validate_catalog(catalog: &Catalog) -> ValidationResult<()> {
    let mut module_codes = BTreeSet::new();
    for module in &catalog.modules {
        validate_code("module code", &module.code)?;
        validate_name("module name", &module.name)?;
        validate_price(&format!("module {} base_price", module.code), module.base_price)?;
        if !module_codes.insert(module.code.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "module code".to_string(),
                value: module.code.clone(),
            });
        }
    }

    let mut addon_codes = BTreeSet::new();
    for addon in &catalog.addons {
        validate_code("add-on code", &addon.code)?;
        validate_name("add-on name", &addon.name)?;
        validate_price(&format!("add-on {} price", addon.code), addon.price)?;
        if !addon_codes.insert(addon.code.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "add-on code".to_string(),
                value: addon.code.clone(),
            });
        }

        if let Some(owner) = &addon.module_code {
            let module = catalog
                .module(owner)
                .ok_or_else(|| ValidationError::UnknownReference {
                    field: format!("add-on {} module_code", addon.code),
                    value: owner.clone(),
                })?;
            if !module.allowed_addon_codes.contains(&addon.code) {
                return Err(ValidationError::InvalidFormat {
                    field: format!("module {} allowed_addon_codes", module.code),
                    reason: format!("must list owned add-on '{}'", addon.code),
                });
            }
        }
    }

    for module in &catalog.modules {
        for code in module
            .allowed_addon_codes
            .iter()
            .chain(module.required_addon_codes.iter())
        {
            let addon = catalog
                .addon(code)
                .ok_or_else(|| ValidationError::UnknownReference {
                    field: format!("module {} add-ons", module.code),
                    value: code.clone(),
                })?;
            if addon
                .module_code
                .as_deref()
                .is_some_and(|owner| owner != module.code)
            {
                return Err(ValidationError::InvalidFormat {
                    field: format!("module {} add-ons", module.code),
                    reason: format!("add-on '{}' belongs to another module", code),
                });
            }
        }
    }

    let mut bundle_codes = BTreeSet::new();
    for bundle in &catalog.bundles {
        validate_code("bundle code", &bundle.code)?;
        validate_name("bundle name", &bundle.name)?;
        validate_discount_rate(&format!("bundle {} discount", bundle.code), bundle.discount)?;
        if !bundle_codes.insert(bundle.code.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "bundle code".to_string(),
                value: bundle.code.clone(),
            });
        }
        if bundle.module_codes.is_empty() {
            return Err(ValidationError::Required {
                field: format!("bundle {} module_codes", bundle.code),
            });
        }
        check_module_refs(catalog, &format!("bundle {}", bundle.code), &bundle.module_codes)?;
    }

    let mut industry_codes = BTreeSet::new();
    for industry in &catalog.industries {
        validate_code("industry code", &industry.code)?;
        validate_name("industry name", &industry.name)?;
        if !industry_codes.insert(industry.code.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "industry code".to_string(),
                value: industry.code.clone(),
            });
        }
        check_module_refs(
            catalog,
            &format!("industry {}", industry.code),
            &industry.recommended_module_codes,
        )?;
    }

    validate_discount_rate("semiannual discount", catalog.pricing.semiannual_discount)?;
    validate_discount_rate("annual discount", catalog.pricing.annual_discount)?;
    validate_discount_rate("biennial discount", catalog.pricing.biennial_discount)?;

    Ok(())
}

fn check_module_refs(catalog: &Catalog, owner: &str, codes: &[String]) -> ValidationResult<()> {
    match codes.iter().find(|code| catalog.module(code).is_none()) {
        Some(missing) => Err(ValidationError::UnknownReference {
            field: format!("{} module_codes", owner),
            value: missing.clone(),
        }),
        None => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Catalog File Format
//!
//! The TOML shape of a catalog file and its conversion into engine types.
//!
//! ## File Format
//! ```toml
//! [currency]
//! code = "EUR"
//! symbol = "€"
//! decimals = 2
//!
//! [billing]
//! annual_discount_percent = 20.0
//!
//! [[modules]]
//! code = "crm"
//! name = "CRM & Sales Pipeline"
//! base_price_cents = 19900
//! allowed_addons = ["crm-ai"]
//!
//! [[addons]]
//! code = "crm-ai"
//! name = "AI Lead Scoring"
//! price_cents = 4900
//! module = "crm"          # omit for a global add-on
//!
//! [[bundles]]
//! code = "growth"
//! name = "Growth"
//! modules = ["crm", "invoicing"]
//! discount_percent = 25.0
//!
//! [[coupons]]
//! code = "LAUNCH50"
//! percent = 50.0          # or: amount_cents = 10000
//! valid_until = "2026-12-31T23:59:59Z"
//! max_redemptions = 500
//! bundle = "growth"       # optional restriction
//! ```
//!
//! Money is written in minor units and discounts as percentages; the
//! conversion below turns them into `Money` and basis-point `DiscountRate`s.

use chrono::{DateTime, Utc};
use configurator_core::validation::{validate_catalog, validate_coupon, ValidationResult};
use configurator_core::{
    AddOn, Bundle, Catalog, Coupon, CouponDirectory, CouponKind, CouponTable, Currency,
    DiscountRate, Industry, Module, Money, PricingPolicy, ValidationError,
};
use serde::Deserialize;
use std::path::Path;

use crate::error::{CatalogError, CatalogResult};

/// The catalog that ships with the crate.
pub const BUILTIN_CATALOG: &str = include_str!("../data/default_catalog.toml");

// =============================================================================
// Sections
// =============================================================================

/// `[currency]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrencySection {
    #[serde(default = "default_currency_code")]
    pub code: String,
    #[serde(default = "default_currency_symbol")]
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_currency_code() -> String {
    "EUR".to_string()
}

fn default_currency_symbol() -> String {
    "€".to_string()
}

fn default_decimals() -> u8 {
    2
}

impl Default for CurrencySection {
    fn default() -> Self {
        CurrencySection {
            code: default_currency_code(),
            symbol: default_currency_symbol(),
            decimals: default_decimals(),
        }
    }
}

/// `[billing]` section. Missing cycles get no discount.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BillingSection {
    #[serde(default)]
    pub semiannual_discount_percent: f64,
    #[serde(default)]
    pub annual_discount_percent: f64,
    #[serde(default)]
    pub biennial_discount_percent: f64,
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndustryRecord {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub recommended_modules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleRecord {
    pub code: String,
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub base_price_cents: i64,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub required_addons: Vec<String>,
    #[serde(default)]
    pub allowed_addons: Vec<String>,
}

fn default_category() -> String {
    "general".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddOnRecord {
    pub code: String,
    pub name: String,
    pub price_cents: i64,
    #[serde(default)]
    pub module: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BundleRecord {
    pub code: String,
    pub name: String,
    pub modules: Vec<String>,
    pub discount_percent: f64,
}

/// A coupon entry. Exactly one of `percent` and `amount_cents` must be set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CouponRecord {
    pub code: String,
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub amount_cents: Option<i64>,

    /// RFC 3339 timestamp.
    #[serde(default)]
    pub valid_from: Option<String>,

    /// RFC 3339 timestamp.
    #[serde(default)]
    pub valid_until: Option<String>,

    #[serde(default)]
    pub max_redemptions: Option<u32>,
    #[serde(default)]
    pub bundle: Option<String>,
}

// =============================================================================
// Catalog File
// =============================================================================

/// A whole catalog file as written on disk.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub currency: CurrencySection,
    #[serde(default)]
    pub billing: BillingSection,
    #[serde(default)]
    pub industries: Vec<IndustryRecord>,
    #[serde(default)]
    pub modules: Vec<ModuleRecord>,
    #[serde(default)]
    pub addons: Vec<AddOnRecord>,
    #[serde(default)]
    pub bundles: Vec<BundleRecord>,
    #[serde(default)]
    pub coupons: Vec<CouponRecord>,
}

impl CatalogFile {
    /// Parses a catalog from TOML text.
    pub fn from_toml_str(contents: &str) -> CatalogResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Parses the built-in example catalog.
    pub fn builtin() -> CatalogResult<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Reads and parses a catalog file.
    pub fn read(path: &Path) -> CatalogResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Converts and validates the file into the engine's catalog and coupon
    /// directory.
    pub fn build(&self) -> CatalogResult<(Catalog, CouponTable)> {
        let catalog = self.to_catalog()?;
        validate_catalog(&catalog)?;
        let coupons = self.to_coupons(&catalog)?;
        Ok((catalog, coupons))
    }

    fn to_catalog(&self) -> ValidationResult<Catalog> {
        let currency = Currency::new(
            self.currency.code.clone(),
            self.currency.symbol.clone(),
            self.currency.decimals,
        );

        let pricing = PricingPolicy {
            semiannual_discount: percent_to_rate(
                "billing semiannual_discount_percent",
                self.billing.semiannual_discount_percent,
            )?,
            annual_discount: percent_to_rate(
                "billing annual_discount_percent",
                self.billing.annual_discount_percent,
            )?,
            biennial_discount: percent_to_rate(
                "billing biennial_discount_percent",
                self.billing.biennial_discount_percent,
            )?,
        };

        let industries = self
            .industries
            .iter()
            .map(|r| Industry {
                code: r.code.clone(),
                name: r.name.clone(),
                recommended_module_codes: r.recommended_modules.clone(),
            })
            .collect();

        let modules = self
            .modules
            .iter()
            .map(|r| Module {
                code: r.code.clone(),
                name: r.name.clone(),
                category: r.category.clone(),
                base_price: Money::from_cents(r.base_price_cents),
                required_addon_codes: r.required_addons.clone(),
                allowed_addon_codes: r.allowed_addons.clone(),
                required: r.required,
            })
            .collect();

        let addons = self
            .addons
            .iter()
            .map(|r| AddOn {
                code: r.code.clone(),
                name: r.name.clone(),
                price: Money::from_cents(r.price_cents),
                module_code: r.module.clone(),
            })
            .collect();

        let bundles = self
            .bundles
            .iter()
            .map(|r| {
                Ok(Bundle {
                    code: r.code.clone(),
                    name: r.name.clone(),
                    module_codes: r.modules.clone(),
                    discount: percent_to_rate(
                        &format!("bundle {} discount_percent", r.code),
                        r.discount_percent,
                    )?,
                })
            })
            .collect::<ValidationResult<Vec<_>>>()?;

        Ok(Catalog {
            currency,
            pricing,
            industries,
            modules,
            addons,
            bundles,
        })
    }

    fn to_coupons(&self, catalog: &Catalog) -> ValidationResult<CouponTable> {
        let mut table = CouponTable::new();

        for record in &self.coupons {
            let coupon = record.to_coupon()?;
            validate_coupon(&coupon)?;

            if let Some(bundle) = &coupon.applies_to_bundle_code {
                if catalog.bundle(bundle).is_none() {
                    return Err(ValidationError::UnknownReference {
                        field: format!("coupon {} bundle", coupon.code),
                        value: bundle.clone(),
                    });
                }
            }

            if table.find(&coupon.code).is_some() {
                return Err(ValidationError::Duplicate {
                    field: "coupon code".to_string(),
                    value: coupon.code.to_uppercase(),
                });
            }
            table.insert(coupon);
        }

        Ok(table)
    }
}

impl CouponRecord {
    fn to_coupon(&self) -> ValidationResult<Coupon> {
        let (kind, value) = match (self.percent, self.amount_cents) {
            (Some(percent), None) => (
                CouponKind::Percent,
                percent_to_rate(&format!("coupon {} percent", self.code), percent)?.bps() as i64,
            ),
            (None, Some(cents)) => (CouponKind::Fixed, cents),
            _ => {
                return Err(ValidationError::InvalidFormat {
                    field: format!("coupon {}", self.code),
                    reason: "set exactly one of percent or amount_cents".to_string(),
                })
            }
        };

        Ok(Coupon {
            code: self.code.clone(),
            kind,
            value,
            valid_from: parse_timestamp(&self.code, "valid_from", self.valid_from.as_deref())?,
            valid_until: parse_timestamp(&self.code, "valid_until", self.valid_until.as_deref())?,
            max_redemptions: self.max_redemptions,
            applies_to_bundle_code: self.bundle.clone(),
        })
    }
}

// =============================================================================
// Conversions
// =============================================================================

/// Converts a percentage (0-100, up to two decimals) into a discount rate.
pub fn percent_to_rate(field: &str, percent: f64) -> ValidationResult<DiscountRate> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(DiscountRate::from_bps((percent * 100.0).round() as u32))
}

fn parse_timestamp(
    code: &str,
    field: &str,
    value: Option<&str>,
) -> ValidationResult<Option<DateTime<Utc>>> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| ValidationError::InvalidFormat {
                    field: format!("coupon {} {}", code, field),
                    reason: e.to_string(),
                })
        })
        .transpose()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use configurator_core::BillingCycle;

    const SMALL: &str = r#"
[billing]
annual_discount_percent = 20.0

[[modules]]
code = "crm"
name = "CRM"
base_price_cents = 19900
allowed_addons = ["crm-ai"]

[[addons]]
code = "crm-ai"
name = "AI"
price_cents = 2900
module = "crm"

[[bundles]]
code = "solo"
name = "Solo"
modules = ["crm"]
discount_percent = 12.5

[[coupons]]
code = "spring"
percent = 15.0
valid_from = "2026-03-01T00:00:00Z"
valid_until = "2026-05-31T23:59:59+02:00"

[[coupons]]
code = "SOLO5"
amount_cents = 500
bundle = "solo"
max_redemptions = 3
"#;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let (catalog, coupons) = CatalogFile::builtin().unwrap().build().unwrap();
        assert_eq!(catalog.currency.code, "EUR");
        assert!(catalog.module("core-platform").unwrap().required);
        assert_eq!(
            catalog.billing_discount(BillingCycle::Annual),
            DiscountRate::from_percent(20)
        );
        assert!(coupons.find("welcome10").is_some());
    }

    #[test]
    fn test_parse_small_catalog() {
        let (catalog, coupons) = CatalogFile::from_toml_str(SMALL).unwrap().build().unwrap();

        assert_eq!(catalog.currency, Currency::default());
        assert_eq!(catalog.module("crm").unwrap().category, "general");
        assert_eq!(catalog.bundle("solo").unwrap().discount.bps(), 1250);
        assert!(catalog.billing_discount(BillingCycle::Biennial).is_zero());

        let spring = coupons.find("SPRING").unwrap();
        assert_eq!(spring.code, "SPRING");
        assert_eq!(spring.kind, CouponKind::Percent);
        assert_eq!(spring.value, 1500);
        assert_eq!(
            spring.valid_until,
            Some(Utc.with_ymd_and_hms(2026, 5, 31, 21, 59, 59).unwrap())
        );

        let solo = coupons.find("solo5").unwrap();
        assert_eq!(solo.kind, CouponKind::Fixed);
        assert_eq!(solo.applies_to_bundle_code.as_deref(), Some("solo"));
        assert_eq!(solo.max_redemptions, Some(3));
    }

    #[test]
    fn test_malformed_toml() {
        let err = CatalogFile::from_toml_str("[[modules]\ncode = ").unwrap_err();
        assert!(matches!(err, CatalogError::ParseFailed(_)));
    }

    #[test]
    fn test_coupon_needs_exactly_one_value() {
        let mut file = CatalogFile::from_toml_str(SMALL).unwrap();
        file.coupons[0].amount_cents = Some(100);
        assert!(matches!(
            file.build(),
            Err(CatalogError::Invalid(ValidationError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn test_coupon_bad_timestamp() {
        let mut file = CatalogFile::from_toml_str(SMALL).unwrap();
        file.coupons[0].valid_from = Some("next tuesday".to_string());
        assert!(file.build().is_err());
    }

    #[test]
    fn test_coupon_unknown_bundle() {
        let mut file = CatalogFile::from_toml_str(SMALL).unwrap();
        file.coupons[1].bundle = Some("enterprise".to_string());
        assert!(matches!(
            file.build(),
            Err(CatalogError::Invalid(ValidationError::UnknownReference { .. }))
        ));
    }

    #[test]
    fn test_duplicate_coupon_codes_differ_only_in_case() {
        let mut file = CatalogFile::from_toml_str(SMALL).unwrap();
        let mut dup = file.coupons[0].clone();
        dup.code = "Spring".to_string();
        file.coupons.push(dup);
        assert!(matches!(
            file.build(),
            Err(CatalogError::Invalid(ValidationError::Duplicate { .. }))
        ));
    }

    #[test]
    fn test_out_of_range_percent() {
        assert!(percent_to_rate("x", 100.5).is_err());
        assert!(percent_to_rate("x", -1.0).is_err());
        assert!(percent_to_rate("x", f64::NAN).is_err());
        assert_eq!(percent_to_rate("x", 33.33).unwrap().bps(), 3333);
    }

    #[test]
    fn test_invalid_catalog_reference_is_rejected() {
        let mut file = CatalogFile::from_toml_str(SMALL).unwrap();
        file.bundles[0].modules.push("ghost".to_string());
        assert!(matches!(
            file.build(),
            Err(CatalogError::Invalid(ValidationError::UnknownReference { .. }))
        ));
    }

    #[test]
    fn test_read_from_disk() {
        let dir = std::env::temp_dir().join(format!("configurator-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.toml");
        std::fs::write(&path, SMALL).unwrap();

        let file = CatalogFile::read(&path).unwrap();
        assert_eq!(file, CatalogFile::from_toml_str(SMALL).unwrap());

        let missing = CatalogFile::read(&dir.join("missing.toml"));
        assert!(matches!(missing, Err(CatalogError::LoadFailed(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }
}

//! # Catalog Loading
//!
//! Resolves, reads, overrides and validates the catalog a session runs on.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     CONFIGURATOR_CURRENCY=USD                                           │
//! │     CONFIGURATOR_ANNUAL_DISCOUNT=15                                     │
//! │                                                                         │
//! │  2. TOML Catalog File                                                   │
//! │     CONFIGURATOR_CATALOG_PATH, or                                       │
//! │     ~/.config/configurator/catalog.toml (Linux)                         │
//! │     ~/Library/Application Support/com.configurator.configurator/...     │
//! │                                                                         │
//! │  3. Built-in Example Catalog (lowest priority)                          │
//! │     data/default_catalog.toml                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A file replaces the built-in catalog wholesale; environment variables then
//! adjust individual settings. Validation runs last, on the final result.

use configurator_core::{Catalog, CouponTable};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::file::{percent_to_rate, CatalogFile};

/// Overrides the catalog file location.
pub const CATALOG_PATH_VAR: &str = "CONFIGURATOR_CATALOG_PATH";

/// Overrides the currency (ISO 4217 code).
pub const CURRENCY_VAR: &str = "CONFIGURATOR_CURRENCY";

/// Overrides the annual billing discount (percent).
pub const ANNUAL_DISCOUNT_VAR: &str = "CONFIGURATOR_ANNUAL_DISCOUNT";

// =============================================================================
// Catalog Source
// =============================================================================

/// Where a loaded catalog came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    BuiltIn,
    File(PathBuf),
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSource::BuiltIn => write!(f, "built-in"),
            CatalogSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// =============================================================================
// Loaded Catalog
// =============================================================================

/// A validated catalog and coupon directory, ready for a session.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub coupons: CouponTable,
    pub source: CatalogSource,
}

impl LoadedCatalog {
    /// Loads the catalog from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Built-in catalog
    /// 2. Catalog file (explicit path, `CONFIGURATOR_CATALOG_PATH`, or platform default)
    /// 3. Environment variables
    pub fn load(catalog_path: Option<PathBuf>) -> CatalogResult<Self> {
        Self::load_with_env(catalog_path, |key| std::env::var(key).ok())
    }

    /// [`LoadedCatalog::load`] with an injected environment lookup.
    pub fn load_with_env<F>(catalog_path: Option<PathBuf>, env: F) -> CatalogResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = catalog_path
            .or_else(|| env(CATALOG_PATH_VAR).map(PathBuf::from))
            .or_else(default_catalog_path);

        let (mut file, source) = match path {
            Some(path) if path.exists() => {
                info!(?path, "Loading catalog from file");
                (CatalogFile::read(&path)?, CatalogSource::File(path))
            }
            Some(path) => {
                debug!(?path, "Catalog file not found, using built-in catalog");
                (CatalogFile::builtin()?, CatalogSource::BuiltIn)
            }
            None => (CatalogFile::builtin()?, CatalogSource::BuiltIn),
        };

        apply_env_overrides(&mut file, &env)?;

        let (catalog, coupons) = file.build()?;
        info!(
            source = %source,
            currency = %catalog.currency.code,
            modules = catalog.modules.len(),
            bundles = catalog.bundles.len(),
            coupons = coupons.len(),
            "Catalog loaded"
        );

        Ok(LoadedCatalog {
            catalog,
            coupons,
            source,
        })
    }

    /// Loads the catalog or falls back to the built-in one if loading fails.
    pub fn load_or_default(catalog_path: Option<PathBuf>) -> Self {
        Self::load(catalog_path).unwrap_or_else(|e| {
            warn!("Failed to load catalog: {}. Using built-in catalog.", e);
            Self::builtin().unwrap_or_else(|e| {
                warn!("Built-in catalog is invalid: {}. Using an empty catalog.", e);
                LoadedCatalog {
                    catalog: Catalog::default(),
                    coupons: CouponTable::new(),
                    source: CatalogSource::BuiltIn,
                }
            })
        })
    }

    /// The built-in example catalog, without environment overrides.
    pub fn builtin() -> CatalogResult<Self> {
        let (catalog, coupons) = CatalogFile::builtin()?.build()?;
        Ok(LoadedCatalog {
            catalog,
            coupons,
            source: CatalogSource::BuiltIn,
        })
    }
}

/// Returns the default catalog file path.
pub fn default_catalog_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "configurator", "configurator")
        .map(|dirs| dirs.config_dir().join("catalog.toml"))
}

// =============================================================================
// Environment Overrides
// =============================================================================

/// Applies `CONFIGURATOR_*` overrides to a parsed catalog file.
fn apply_env_overrides<F>(file: &mut CatalogFile, env: &F) -> CatalogResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(code) = env(CURRENCY_VAR) {
        let code = code.trim().to_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CatalogError::InvalidOverride {
                var: CURRENCY_VAR.to_string(),
                value: code,
                reason: "expected a three-letter ISO 4217 code".to_string(),
            });
        }

        let (symbol, decimals) = currency_display(&code);
        debug!(currency = %code, "Overriding currency from environment");
        file.currency.symbol = symbol;
        file.currency.decimals = decimals;
        file.currency.code = code;
    }

    if let Some(raw) = env(ANNUAL_DISCOUNT_VAR) {
        let percent = raw
            .trim()
            .parse::<f64>()
            .map_err(|e| CatalogError::InvalidOverride {
                var: ANNUAL_DISCOUNT_VAR.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            })?;

        percent_to_rate(ANNUAL_DISCOUNT_VAR, percent).map_err(|e| {
            CatalogError::InvalidOverride {
                var: ANNUAL_DISCOUNT_VAR.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }
        })?;

        debug!(percent, "Overriding annual discount from environment");
        file.billing.annual_discount_percent = percent;
    }

    Ok(())
}

/// Display symbol and minor-unit digits for well-known currencies.
fn currency_display(code: &str) -> (String, u8) {
    match code {
        "EUR" => ("€".to_string(), 2),
        "USD" => ("$".to_string(), 2),
        "GBP" => ("£".to_string(), 2),
        "JPY" => ("¥".to_string(), 0),
        "CHF" => ("CHF ".to_string(), 2),
        other => (format!("{} ", other), 2),
    }
}

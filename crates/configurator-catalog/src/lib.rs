//! # configurator-catalog: Catalog & Coupon Feed Loading
//!
//! Reads the catalog a configurator session runs on and hands it to the
//! engine as a validated [`Catalog`](configurator_core::Catalog) and
//! [`CouponTable`](configurator_core::CouponTable).
//!
//! ## Load Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  built-in catalog ──► catalog.toml ──► CONFIGURATOR_* ──► validate      │
//! │     (defaults)          (file)          (env overrides)     │           │
//! │                                                             ▼           │
//! │                                              LoadedCatalog {            │
//! │                                                catalog, coupons, source │
//! │                                              }                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Path resolution, environment overrides, `LoadedCatalog`
//! - [`file`] - TOML file format and conversion into engine types
//! - [`error`] - Catalog error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use configurator_catalog::LoadedCatalog;
//!
//! let loaded = LoadedCatalog::load_or_default(None);
//! println!("{} modules from {}", loaded.catalog.modules.len(), loaded.source);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod file;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{default_catalog_path, CatalogSource, LoadedCatalog};
pub use error::{CatalogError, CatalogResult};
pub use file::CatalogFile;

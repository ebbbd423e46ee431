//! # configurator-core: Pure Configuration & Pricing Logic
//!
//! This crate is the **heart** of the product configurator. It turns a buyer's
//! selections into a consistent [`Configuration`] and a deterministic
//! [`PriceBreakdown`], as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Configurator Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Page components                              │   │
//! │  │   Industry step ──► Modules step ──► Summary ──► Checkout       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              configurator-session (caller layer)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ configurator-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐           │   │
//! │  │   │ catalog │  │  state  │  │ pricing │  │ coupon  │           │   │
//! │  │   │ Module  │  │ Config  │  │ Price   │  │ validate│           │   │
//! │  │   │ Bundle  │  │ toggles │  │Breakdown│  │ active? │           │   │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └─────────┘           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO LOGGING SINK • NO NETWORK • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                ▲                                        │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │           configurator-catalog (TOML catalog feed)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money, discount rates and currency formatting (integer cents)
//! - [`types`] - Billing cycles, pricing policy, coupons
//! - [`catalog`] - Modules, add-ons, bundles, industries and the coupon directory
//! - [`state`] - The configuration record and its transitions
//! - [`coupon`] - Coupon validation and redemption counters
//! - [`pricing`] - The price composition function
//! - [`checkout`] - Checkout snapshot and announcement payloads
//! - [`validation`] - Field and catalog validation rules
//! - [`error`] - Rejections and domain errors
//!
//! ## Example Usage
//!
//! ```rust
//! use configurator_core::money::{DiscountRate, Money};
//!
//! let subtotal = Money::from_cents(34800);
//! let bundle_discount = subtotal.percentage(DiscountRate::from_percent(25));
//! assert_eq!(bundle_discount.cents(), 8700);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod checkout;
pub mod coupon;
pub mod error;
pub mod money;
pub mod pricing;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{AddOn, Bundle, Catalog, CouponDirectory, CouponTable, Industry, Module};
pub use checkout::{CheckoutRequest, CheckoutSnapshot, PriceAnnouncement};
pub use coupon::{PrefetchedRedemptions, RedemptionCounter, Unlimited, Unreachable};
pub use error::{CoreError, CoreResult, CouponRejection, Rejection, ValidationError};
pub use money::{Currency, DiscountRate, Money};
pub use pricing::{compute_price, LineKind, PriceBreakdown, PriceLine};
pub use state::{Configuration, DeepLink, Transition};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a catalog code (module, add-on, bundle, industry).
pub const MAX_CODE_LENGTH: usize = 64;

/// Maximum length of a coupon code as typed by the buyer.
///
/// ## Business Reason
/// Printed and emailed coupon codes are short; anything longer is a paste
/// accident and is rejected before it reaches the coupon feed.
pub const MAX_COUPON_CODE_LENGTH: usize = 32;

//! # Error Types
//!
//! Rejections and domain errors for configurator-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  configurator-core (this file)                                          │
//! │  ├── Rejection        - A transition left the Configuration unchanged   │
//! │  │   └── CouponRejection - Why a coupon code was not accepted           │
//! │  ├── ValidationError  - Field-level input / catalog validation          │
//! │  └── CoreError        - Checkout capture failures                       │
//! │                                                                         │
//! │  configurator-catalog (separate crate)                                  │
//! │  └── CatalogError     - Catalog file / environment failures             │
//! │                                                                         │
//! │  configurator-session (caller layer)                                    │
//! │  └── ApiError         - What the page components see (serialized)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rejections Are Values
//! A rejected transition is not a failure of the engine. Every transition is
//! total: it returns either a new Configuration or the prior one paired with a
//! [`Rejection`]. The UI decides whether to show feedback.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Coupon Rejection
// =============================================================================

/// Why a coupon code was not accepted.
///
/// Always user-facing and never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[serde(tag = "reason", rename_all = "snake_case")]
#[ts(export)]
pub enum CouponRejection {
    /// No coupon with this code exists.
    #[error("Coupon {code} does not exist")]
    NotFound { code: String },

    /// The coupon's validity window has ended.
    #[error("Coupon {code} has expired")]
    Expired { code: String },

    /// The coupon's validity window has not started yet.
    #[error("Coupon {code} is not valid yet")]
    NotYetValid { code: String },

    /// The coupon is restricted to a bundle the configuration is not on.
    #[error("Coupon {code} only applies to bundle {required_bundle}")]
    WrongBundle {
        code: String,
        required_bundle: String,
    },

    /// The coupon's redemption limit has been reached.
    #[error("Coupon {code} has been fully redeemed")]
    RedemptionsExhausted { code: String },

    /// The coupon feed or redemption counter could not answer.
    ///
    /// ## UI Contract
    /// Shown exactly like `NotFound`; never a crash.
    #[error("Coupon {code} could not be checked right now")]
    Unavailable { code: String },
}

impl CouponRejection {
    /// Returns the code the rejection refers to.
    pub fn code(&self) -> &str {
        match self {
            CouponRejection::NotFound { code }
            | CouponRejection::Expired { code }
            | CouponRejection::NotYetValid { code }
            | CouponRejection::WrongBundle { code, .. }
            | CouponRejection::RedemptionsExhausted { code }
            | CouponRejection::Unavailable { code } => code,
        }
    }

    /// Returns true when the UI should present this as "unknown code".
    pub fn is_not_found_like(&self) -> bool {
        matches!(
            self,
            CouponRejection::NotFound { .. } | CouponRejection::Unavailable { .. }
        )
    }
}

// =============================================================================
// Rejection
// =============================================================================

/// Why a transition returned the Configuration unchanged.
///
/// ## User Workflow
/// ```text
/// Buyer clicks "Remove" on a required module
///      │
///      ▼
/// toggle_module("core-platform")
///      │
///      ▼
/// Transition { configuration: <unchanged>, rejection: RequiredModule }
///      │
///      ▼
/// UI keeps the checkbox ticked (optionally shows a hint)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Rejection {
    #[error("Unknown industry: {code}")]
    UnknownIndustry { code: String },

    #[error("Unknown module: {code}")]
    UnknownModule { code: String },

    #[error("Unknown add-on: {code}")]
    UnknownAddon { code: String },

    #[error("Unknown bundle: {code}")]
    UnknownBundle { code: String },

    /// Required modules can never be removed.
    #[error("Module {code} is required and cannot be removed")]
    RequiredModule { code: String },

    /// Required add-ons stay while their module is selected.
    #[error("Add-on {code} is required by module {module_code}")]
    RequiredAddon { code: String, module_code: String },

    /// The add-on's owning module is not selected.
    #[error("Add-on {code} needs module {module_code} to be selected")]
    AddonModuleNotSelected { code: String, module_code: String },

    /// The coupon code could not even be looked up.
    #[error("Coupon code is malformed: {reason}")]
    MalformedCouponCode { reason: String },

    #[error("{0}")]
    Coupon(CouponRejection),
}

impl From<CouponRejection> for Rejection {
    fn from(rejection: CouponRejection) -> Self {
        Rejection::Coupon(rejection)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when catalog data or user input doesn't meet
/// requirements. Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid code characters, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., two modules with one code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A reference to another catalog entry that does not exist.
    #[error("{field} references unknown code '{value}'")]
    UnknownReference { field: String, value: String },
}

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised when the configuration is handed to checkout.
///
/// Transitions never produce these; only the checkout hand-off can fail.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The applied coupon stopped being valid between application and checkout.
    #[error("Coupon is no longer valid: {0}")]
    CouponNoLongerValid(CouponRejection),

    /// Nothing billable is selected.
    #[error("Configuration has no modules selected")]
    EmptyConfiguration,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

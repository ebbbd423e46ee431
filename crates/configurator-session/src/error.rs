//! # API Error Type
//!
//! Unified error type returned to the configurator pages.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Configurator                       │
//! │                                                                         │
//! │  Page                        Rust Session                               │
//! │  ────                        ────────────                               │
//! │                                                                         │
//! │  session.checkout()                                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Session Method                                                  │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Stale coupon? ─── CoreError::CouponNoLongerValid ──┐            │  │
//! │  │         │                                           │            │  │
//! │  │         ▼                                           ▼            │  │
//! │  │  Catalog broken? ─── CatalogError::Invalid ──── ApiError ───────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  e.code = "COUPON_INVALID"                                              │
//! │  e.message = "Coupon is no longer valid: Coupon SPRING has expired"     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rejected transitions are not errors; they travel inside a
//! [`SessionUpdate`](crate::SessionUpdate). `From<Rejection>` exists for
//! callers that want to surface one as an error anyway.

use configurator_catalog::CatalogError;
use configurator_core::{CoreError, CouponRejection, Rejection};
use serde::Serialize;
use ts_rs::TS;

/// API error returned from session methods.
///
/// ## Serialization
/// ```json
/// {
///   "code": "COUPON_INVALID",
///   "message": "Coupon SPRING has expired"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Unknown industry, module, add-on or bundle code
    NotFound,

    /// Input validation failed
    ValidationError,

    /// A selection rule was violated
    SelectionRejected,

    /// Coupon does not exist, expired, or does not apply
    CouponInvalid,

    /// Coupon service could not answer
    CouponUnavailable,

    /// Nothing billable selected at checkout
    EmptyConfiguration,

    /// Catalog file could not be loaded
    CatalogError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, code: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, code))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

/// Converts coupon rejections to API errors.
///
/// `Unavailable` is reported with its own code but the same wording as
/// `NotFound`, so pages can show one "unknown code" message for both.
impl From<CouponRejection> for ApiError {
    fn from(rejection: CouponRejection) -> Self {
        match rejection {
            CouponRejection::Unavailable { code } => ApiError::new(
                ErrorCode::CouponUnavailable,
                format!("Coupon {} does not exist", code),
            ),
            other => ApiError::new(ErrorCode::CouponInvalid, other.to_string()),
        }
    }
}

/// Converts transition rejections to API errors.
impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::UnknownIndustry { code } => ApiError::not_found("Industry", &code),
            Rejection::UnknownModule { code } => ApiError::not_found("Module", &code),
            Rejection::UnknownAddon { code } => ApiError::not_found("Add-on", &code),
            Rejection::UnknownBundle { code } => ApiError::not_found("Bundle", &code),
            Rejection::MalformedCouponCode { reason } => ApiError::validation(reason),
            Rejection::Coupon(coupon) => coupon.into(),
            other @ (Rejection::RequiredModule { .. }
            | Rejection::RequiredAddon { .. }
            | Rejection::AddonModuleNotSelected { .. }) => {
                ApiError::new(ErrorCode::SelectionRejected, other.to_string())
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CouponNoLongerValid(rejection) => {
                let code = match rejection {
                    CouponRejection::Unavailable { .. } => ErrorCode::CouponUnavailable,
                    _ => ErrorCode::CouponInvalid,
                };
                ApiError::new(code, format!("Coupon is no longer valid: {}", rejection))
            }
            err @ CoreError::EmptyConfiguration => {
                ApiError::new(ErrorCode::EmptyConfiguration, err.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts catalog errors to API errors.
impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        if err.is_content_error() {
            ApiError::new(ErrorCode::CatalogError, err.to_string())
        } else {
            // Log the actual error but return a generic message
            tracing::error!("Catalog could not be read: {}", err);
            ApiError::new(ErrorCode::CatalogError, "Catalog could not be read")
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

//! # Catalog Error Types
//!
//! Error types for loading and validating catalog files.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │      File       │  │     Format      │  │       Content           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  LoadFailed     │  │  ParseFailed    │  │  Invalid                │ │
//! │  │                 │  │                 │  │  InvalidOverride        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use configurator_core::ValidationError;
use thiserror::Error;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog error type covering file, format and content failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    // =========================================================================
    // File Errors
    // =========================================================================
    /// Failed to read the catalog file.
    #[error("Failed to load catalog: {0}")]
    LoadFailed(String),

    // =========================================================================
    // Format Errors
    // =========================================================================
    /// The catalog file is not valid TOML or has the wrong shape.
    #[error("Failed to parse catalog: {0}")]
    ParseFailed(String),

    // =========================================================================
    // Content Errors
    // =========================================================================
    /// The catalog parsed but breaks a catalog rule.
    #[error("Invalid catalog: {0}")]
    Invalid(#[from] ValidationError),

    /// An environment override could not be applied.
    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidOverride {
        var: String,
        value: String,
        reason: String,
    },
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(err: toml::de::Error) -> Self {
        CatalogError::ParseFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl CatalogError {
    /// Returns true if the catalog content (not the file) is at fault.
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            CatalogError::ParseFailed(_)
                | CatalogError::Invalid(_)
                | CatalogError::InvalidOverride { .. }
        )
    }
}

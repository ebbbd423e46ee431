//! # Redemption Service
//!
//! The async seam to the external service that counts coupon redemptions.
//!
//! The core validator only understands a synchronous
//! [`RedemptionCounter`]; this module awaits the service once and turns the
//! answer into one.
//!
//! ```text
//! apply_coupon_with("LAUNCH50")
//!        │
//!        ▼
//!  coupon capped? ── no ──► Unlimited
//!        │ yes
//!        ▼
//!  service.redemption_count().await
//!        ├── Ok(n)  ──► FetchedCount::Known(n)
//!        └── Err(_) ──► FetchedCount::Unavailable  (coupon shows as unknown)
//! ```

use async_trait::async_trait;
use configurator_core::RedemptionCounter;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use tracing::warn;

/// Failures of the redemption-count service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedemptionError {
    #[error("Redemption service unreachable: {0}")]
    Unreachable(String),

    #[error("Redemption service timed out")]
    Timeout,
}

/// External service answering "how often has this coupon been redeemed?".
#[async_trait]
pub trait RedemptionService: Send + Sync {
    async fn redemption_count(&self, coupon_code: &str) -> Result<u32, RedemptionError>;
}

// =============================================================================
// In-Memory Service
// =============================================================================

/// In-memory redemption service for local runs and tests.
#[derive(Debug, Default)]
pub struct MemoryRedemptionService {
    counts: Mutex<HashMap<String, u32>>,
}

impl MemoryRedemptionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the redemption count for a coupon code.
    pub fn set_count(&self, coupon_code: &str, used: u32) {
        let mut counts = self.counts.lock().expect("Redemption mutex poisoned");
        counts.insert(coupon_code.trim().to_uppercase(), used);
    }
}

#[async_trait]
impl RedemptionService for MemoryRedemptionService {
    async fn redemption_count(&self, coupon_code: &str) -> Result<u32, RedemptionError> {
        let counts = self.counts.lock().expect("Redemption mutex poisoned");
        Ok(counts
            .get(&coupon_code.trim().to_uppercase())
            .copied()
            .unwrap_or(0))
    }
}

// =============================================================================
// Fetched Count
// =============================================================================

/// A redemption count resolved ahead of validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchedCount {
    /// The coupon has no cap; the service was not asked.
    Uncapped,
    Known(u32),
    Unavailable,
}

impl RedemptionCounter for FetchedCount {
    fn redemptions_used(&self, _coupon_code: &str) -> Option<u32> {
        match self {
            FetchedCount::Uncapped => Some(0),
            FetchedCount::Known(used) => Some(*used),
            FetchedCount::Unavailable => None,
        }
    }
}

/// Asks the service for a coupon's redemption count.
pub async fn fetch_count<S>(service: &S, coupon_code: &str) -> FetchedCount
where
    S: RedemptionService + ?Sized,
{
    match service.redemption_count(coupon_code).await {
        Ok(used) => FetchedCount::Known(used),
        Err(err) => {
            warn!(coupon = %coupon_code, error = %err, "Redemption count unavailable");
            FetchedCount::Unavailable
        }
    }
}

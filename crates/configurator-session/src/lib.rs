//! # configurator-session: Caller-side Session State
//!
//! The layer the configurator pages talk to. A [`ConfiguratorSession`] owns
//! the loaded catalog and the buyer's current Configuration, re-prices after
//! every transition and hands back a [`SessionUpdate`].
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Page ──► ConfiguratorSession::toggle_module("crm")                     │
//! │                │                                                        │
//! │                ├── Configuration::toggle_module   (configurator-core)   │
//! │                ├── compute_price                  (configurator-core)   │
//! │                ├── PriceAnnouncement::between     (configurator-core)   │
//! │                ▼                                                        │
//! │           SessionUpdate { configuration, breakdown, rejection,          │
//! │                           announcement }                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`] - The session and its transitions
//! - [`redemption`] - Async redemption-count service seam
//! - [`announce`] - English text for price announcements
//! - [`error`] - API error type for the pages

pub mod announce;
pub mod error;
pub mod redemption;
pub mod session;

pub use announce::announcement_text;
pub use error::{ApiError, ErrorCode};
pub use redemption::{
    fetch_count, FetchedCount, MemoryRedemptionService, RedemptionError, RedemptionService,
};
pub use session::{ConfiguratorSession, SessionUpdate};

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Verbose output for development
/// - `RUST_LOG=info` - Normal operation (default)
/// - `RUST_LOG=warn` - Only warnings and errors
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,configurator=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

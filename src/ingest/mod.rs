//! Upstream prayer-timings providers.
//!
//! Submodules:
//! - `aladhan` — blocking client for the AlAdhan timings API.

pub mod aladhan;

use crate::model::{PrayerError, ProviderDay, TimingsQuery};

/// Source of prayer timings for one date and location.
///
/// Implementations perform blocking I/O; async callers must run them on a
/// blocking thread.
pub trait TimingsProvider: Send + Sync {
    fn fetch_day(&self, query: &TimingsQuery) -> Result<ProviderDay, PrayerError>;
}
